use reqwest::{header::HeaderMap, header::HeaderValue, Client};
use url::Url;

use common::api_key::ApiKey;

use super::error::ApiError;
use super::ApiRequest;
use crate::http::api::v1::API_KEY_HEADER;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    /// Build a client for `remote`, sending `api_key` (if any) with every request
    pub fn new(remote: &Url, api_key: Option<&ApiKey>) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(key.expose())
                .map_err(|_| common::api_key::ApiKeyError::InvalidCharacter)?;
            value.set_sensitive(true);
            default_headers.insert(API_KEY_HEADER, value);
        }
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Fetch the plain-text liveness body from `/api/v1/health`
    pub async fn health(&self) -> Result<String, ApiError> {
        let url = self.remote.join("/api/v1/health")?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::HttpStatus(status, body))
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }
}
