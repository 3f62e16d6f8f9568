use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;

use common::crypto::CryptoError;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Every failure an `/api/v1` route can report
///
/// This is the only place store, auth and crypto failures are mapped onto
/// HTTP statuses. Crypto failures never carry internal detail to the client.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),
    #[error("request body exceeds {max} bytes")]
    BodyTooLarge { max: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl RequestError {
    /// Classify a body extraction failure
    pub fn from_json_rejection(rejection: JsonRejection, max: usize) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::BodyTooLarge { max }
        } else {
            Self::InvalidJson(rejection.body_text())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::FORBIDDEN,
            Self::InvalidJson(_) | Self::Store(StoreError::InvalidPayload) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge { .. } | Self::Store(StoreError::PayloadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::Store(StoreError::ResourceExhausted { .. }) => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(StoreError::Crypto(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Auth(_) => json!({
                "code": "invalid_api_key",
                "error": "Invalid or missing X-API-Key header",
            }),
            Self::InvalidJson(details) => json!({
                "code": "invalid_json",
                "error": "Invalid JSON data",
                "details": details,
            }),
            Self::Store(StoreError::InvalidPayload) => json!({
                "code": "invalid_json",
                "error": "Invalid JSON data",
                "details": "The uploaded data must be a JSON object or array",
            }),
            Self::BodyTooLarge { max } => json!({
                "code": "payload_too_large",
                "error": "Sample data too large",
                "maxSize": max,
            }),
            Self::Store(StoreError::PayloadTooLarge { max, received }) => json!({
                "code": "payload_too_large",
                "error": "Sample data too large",
                "maxSize": max,
                "receivedSize": received,
            }),
            Self::Store(StoreError::ResourceExhausted { max, current }) => json!({
                "code": "capacity_reached",
                "error": "Maximum number of sessions reached. Please try again later.",
                "maxSessions": max,
                "currentSessions": current,
            }),
            Self::Store(StoreError::Crypto(CryptoError::Decrypt)) => json!({
                "code": "decryption_failed",
                "error": "Decryption failed",
                "details": "Failed to decrypt session data. The session may be corrupted or the API key may be incorrect.",
            }),
            Self::Store(StoreError::Crypto(CryptoError::Corrupt)) => json!({
                "code": "decryption_failed",
                "error": "Data corruption detected",
                "details": "The stored session data appears to be corrupted and cannot be parsed.",
            }),
            Self::Store(StoreError::Crypto(_)) => json!({
                "code": "encryption_failed",
                "error": "Encryption failed",
                "details": "Failed to encrypt session data. Please try again with a new API key.",
            }),
            Self::Internal(_) => json!({
                "code": "internal",
                "error": "Request processing failed",
                "details": "An unexpected error occurred. Please try again.",
            }),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}
