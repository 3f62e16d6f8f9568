use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use url::Url;

use super::{Identity, RequestError};
use crate::http::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Consume the caller's payload; the response body is `null` when there is none
#[derive(Debug, Clone, Default)]
pub struct SampleRequest;

pub async fn handler(
    State(state): State<ServiceState>,
    Identity(key): Identity,
) -> Result<impl IntoResponse, RequestError> {
    let store = state.store().clone();
    let payload = tokio::task::spawn_blocking(move || store.retrieve(&key))
        .await
        .map_err(|e| RequestError::Internal(e.to_string()))??;

    if payload.is_none() {
        tracing::debug!("SAMPLE: no session data available");
    }

    Ok(Json(payload))
}

// Client implementation - builds request for this operation
impl ApiRequest for SampleRequest {
    type Response = Option<Value>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v1/sample")?;
        Ok(client.get(full_url))
    }
}
