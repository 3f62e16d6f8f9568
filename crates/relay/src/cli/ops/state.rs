use clap::Args;

use service::http::api::client::ApiError;
use service::http::api::v1::StateRequest;

/// Show the current state token without consuming the payload
#[derive(Args, Debug, Clone)]
pub struct State;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state lookup failed: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for State {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(StateRequest).await?;
        Ok(response
            .state
            .map(|token| token.to_string())
            .unwrap_or_else(|| "null".to_string()))
    }
}
