use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Default)]
pub struct StatusRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub sessions: SessionCounts,
    pub limits: LimitsView,
    /// Seconds since the service started
    pub uptime: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCounts {
    pub current: usize,
    pub max: usize,
    pub available: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsView {
    pub max_sessions: usize,
    pub max_sample_size: usize,
    /// Milliseconds
    #[serde(rename = "maxSessionTTL")]
    pub max_session_ttl: u64,
}

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    let status = state.store().status();
    let body = StatusResponse {
        status: "healthy".to_string(),
        sessions: SessionCounts {
            current: status.live,
            max: status.limits.max_sessions,
            available: status.available(),
        },
        limits: LimitsView {
            max_sessions: status.limits.max_sessions,
            max_sample_size: status.limits.max_sample_size,
            max_session_ttl: status.limits.session_ttl.as_millis() as u64,
        },
        uptime: state.uptime().as_secs_f64(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

// Client implementation - builds request for this operation
impl ApiRequest for StatusRequest {
    type Response = StatusResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v1/status")?;
        Ok(client.get(full_url))
    }
}
