use std::net::SocketAddr;

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use http::request::Parts;
use http::HeaderName;

use common::api_key::ApiKey;

use super::{RequestError, API_KEY_HEADER};
use crate::auth::{authenticate, is_loopback};
use crate::ServiceState;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// The admitted caller's identity secret
///
/// Extraction rejects remote callers without a well-formed `X-API-Key` and
/// substitutes the shared loopback identity for local callers without one.
pub struct Identity(pub ApiKey);

#[async_trait]
impl FromRequestParts<ServiceState> for Identity {
    type Rejection = RequestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let forwarded_for = if state.config().trust_forwarded_for {
            parts
                .headers
                .get(X_FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
        } else {
            None
        };
        let loopback = is_loopback(peer, forwarded_for);

        let supplied = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        let key = authenticate(loopback, supplied).map_err(|e| {
            tracing::warn!(peer = ?peer, error = %e, "rejecting unauthenticated remote caller");
            e
        })?;
        if key.is_loopback_default() {
            tracing::debug!("loopback caller using default session identity");
        }

        Ok(Identity(key))
    }
}
