use clap::Args;

use service::http::api::client::ApiError;
use service::http::api::v1::SampleRequest;

/// Consume the payload waiting for this identity
#[derive(Args, Debug, Clone)]
pub struct Fetch;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Api(#[from] ApiError),
    #[error("cannot render payload: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Fetch {
    type Error = FetchError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        match ctx.client.call(SampleRequest).await? {
            Some(payload) => Ok(serde_json::to_string_pretty(&payload)?),
            None => Ok("null".to_string()),
        }
    }
}
