use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{Identity, RequestError};
use crate::http::api::client::{ApiError, ApiRequest};
use crate::store::StateToken;
use crate::ServiceState;

const UPLOAD_MESSAGE: &str = "Sample data uploaded successfully";

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub state: StateToken,
    /// Abbreviated session digest, e.g. `ab12cd34...`
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Identity(key): Identity,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, RequestError> {
    let max = state.store().limits().max_sample_size;
    let Json(payload) = body.map_err(|rejection| RequestError::from_json_rejection(rejection, max))?;

    if state.config().dev_mode {
        let size = serde_json::to_vec(&payload).map(|b| b.len()).unwrap_or_default();
        tracing::info!(
            "UPLOAD: request body size {:.2}KB",
            size as f64 / 1024.0
        );
    }

    // key derivation and sealing are CPU bound
    let store = state.store().clone();
    let receipt = tokio::task::spawn_blocking(move || store.upload(&key, &payload))
        .await
        .map_err(|e| RequestError::Internal(e.to_string()))??;

    Ok(Json(UploadResponse {
        message: UPLOAD_MESSAGE.to_string(),
        state: receipt.state,
        session_id: receipt.session_id.short(),
    }))
}

// Client implementation - builds request for this operation
impl ApiRequest for UploadRequest {
    type Response = UploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v1/upload")?;
        Ok(client.post(full_url).json(&self.payload))
    }
}
