use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

/// A typed request against the relay API
///
/// Implemented next to each handler so the route and its client stay in sync.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
