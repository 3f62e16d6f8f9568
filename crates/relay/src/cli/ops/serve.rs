use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Args;

use service::{spawn_service, Config, ServiceError};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Address to bind the API server to
    #[arg(long, env = "LISTEN_ADDR", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub listen_addr: IpAddr,

    /// Port to bind the API server to
    #[arg(short, long, env = "LISTEN_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Verbose request logging
    #[arg(long, env = "DEV_MODE")]
    pub dev: bool,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Ignore X-Forwarded-For when deciding whether a caller is local
    #[arg(long)]
    pub no_trust_forwarded_for: bool,
}

impl Serve {
    /// Effective service configuration: flags on top of the environment's limits
    pub fn config(&self) -> Config {
        Config {
            listen_addr: SocketAddr::new(self.listen_addr, self.port),
            trust_forwarded_for: !self.no_trust_forwarded_for,
            log_level: if self.dev {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            },
            log_dir: self.log_dir.clone(),
            dev_mode: self.dev,
            ..Config::from_env()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("relay failed: {0}")]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        spawn_service(&self.config()).await?;
        Ok("relay stopped".to_string())
    }
}
