use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Identity, RequestError};
use crate::http::api::client::{ApiError, ApiRequest};
use crate::store::StateToken;
use crate::ServiceState;

#[derive(Debug, Clone, Default)]
pub struct StateRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    pub state: Option<StateToken>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Identity(key): Identity,
) -> Result<impl IntoResponse, RequestError> {
    Ok(Json(StateResponse {
        state: state.store().peek_state(&key),
    }))
}

// Client implementation - builds request for this operation
impl ApiRequest for StateRequest {
    type Response = StateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v1/state")?;
        Ok(client.get(full_url))
    }
}
