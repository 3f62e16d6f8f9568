use clap::Args;

use service::http::api::client::ApiError;
use service::http::api::v1::{StatusRequest, StatusResponse};

#[derive(Args, Debug, Clone)]
pub struct Status;

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("status request failed: {0}")]
    Api(#[from] ApiError),
}

fn render(status: &StatusResponse) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Relay: {}", status.status));
    lines.push(format!("  uptime:          {:.0}s", status.uptime));
    lines.push(format!(
        "  sessions:        {}/{} ({} available)",
        status.sessions.current, status.sessions.max, status.sessions.available
    ));
    lines.push(format!(
        "  max sample size: {:.2}MB",
        status.limits.max_sample_size as f64 / (1024.0 * 1024.0)
    ));
    lines.push(format!(
        "  session ttl:     {} minutes",
        status.limits.max_session_ttl / 60_000
    ));
    lines.join("\n")
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Status {
    type Error = StatusError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let status = ctx.client.call(StatusRequest).await?;
        Ok(render(&status))
    }
}
