use axum::routing::{get, post};
use axum::Router;
use http::HeaderName;

pub mod error;
pub mod health;
pub mod identity;
pub mod sample;
pub mod state;
pub mod status;
pub mod upload;

pub use error::RequestError;
pub use identity::Identity;
pub use sample::SampleRequest;
pub use state::{StateRequest, StateResponse};
pub use status::{StatusRequest, StatusResponse};
pub use upload::{UploadRequest, UploadResponse};

use crate::ServiceState;

/// Header carrying the caller's identity secret
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/upload", post(upload::handler))
        .route("/sample", get(sample::handler))
        .route("/state", get(state::handler))
        .route("/status", get(status::handler))
        .route("/health", get(health::handler))
        .with_state(state)
}
