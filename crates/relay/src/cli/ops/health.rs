use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let base = ctx.client.base_url();
        match ctx.client.health().await {
            Ok(body) => Ok(format!("Relay ({}): {}", base, body)),
            Err(e) => Err(HealthError::Failed(format!("{} not reachable: {}", base, e))),
        }
    }
}
