mod utils;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use futures::future::join_all;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::http;
use crate::reaper;
use crate::{Config, ServiceState};

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to install signal handlers: {0}")]
    Signals(std::io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

/// Handle for gracefully shutting down the relay.
pub struct ShutdownHandle {
    graceful_waiter: tokio::task::JoinHandle<()>,
    handles: Vec<tokio::task::JoinHandle<()>>,
    shutdown_tx: watch::Sender<()>,
    local_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Block until the service shuts down (via signal or explicit shutdown).
    pub async fn wait(self) {
        shutdown_and_join(self.graceful_waiter, self.handles).await;
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Address the API server actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

/// Initialize logging, panic handler, and build info reporting.
/// Returns guards that must be kept alive for the duration of the program.
pub fn init_logging(config: &Config) -> Vec<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::fmt::format::FmtSpan;

    let mut guards = Vec::new();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);

    let stdout_env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(stdout_env_filter);

    if let Some(log_dir) = &config.log_dir {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
        }

        let file_appender = tracing_appender::rolling::daily(log_dir, "relay.log");
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);

        let file_env_filter = EnvFilter::builder()
            .with_default_directive(config.log_level.into())
            .from_env_lossy();

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(file_env_filter);

        tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry().with(stdout_layer).init();
    }

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

/// Wait for shutdown and join all handles with timeout.
async fn shutdown_and_join(
    graceful_waiter: tokio::task::JoinHandle<()>,
    handles: Vec<tokio::task::JoinHandle<()>>,
) {
    let _ = graceful_waiter.await;

    if timeout(FINAL_SHUTDOWN_TIMEOUT, join_all(handles))
        .await
        .is_err()
    {
        tracing::error!(
            "Failed to shut down within {} seconds",
            FINAL_SHUTDOWN_TIMEOUT.as_secs()
        );
        std::process::exit(4);
    }
}

/// Addresses clients can reach a listener bound to `listen` on, preferred first.
///
/// A wildcard bind lists every external IPv4 interface followed by loopback;
/// any other bind is reachable only on its own address. Never empty.
fn reachable_hosts(listen: IpAddr, interfaces: &[(String, IpAddr)]) -> Vec<IpAddr> {
    if !listen.is_unspecified() {
        return vec![listen];
    }
    let mut hosts: Vec<IpAddr> = interfaces
        .iter()
        .map(|(_, ip)| *ip)
        .filter(|ip| ip.is_ipv4() && !ip.is_loopback())
        .collect();
    hosts.push(IpAddr::V4(Ipv4Addr::LOCALHOST));
    hosts
}

fn log_startup(config: &Config, local_addr: SocketAddr) {
    let limits = &config.limits;
    tracing::info!(
        max_sessions = limits.max_sessions,
        max_sample_size_mb = format!("{:.2}", limits.max_sample_size as f64 / (1024.0 * 1024.0)),
        session_ttl_min = limits.session_ttl.as_secs() / 60,
        sweep_interval_s = config.sweep_interval.as_secs(),
        capacity_policy = ?limits.capacity_policy,
        "session limits"
    );
    let interfaces = if local_addr.ip().is_unspecified() {
        local_ip_address::list_afinet_netifas().unwrap_or_else(|e| {
            tracing::warn!("could not list network interfaces: {}", e);
            Vec::new()
        })
    } else {
        Vec::new()
    };
    let hosts = reachable_hosts(local_addr.ip(), &interfaces);

    if local_addr.ip().is_unspecified() {
        tracing::info!("relay listening on all interfaces");
    }
    for host in &hosts {
        tracing::info!("  http://{}", SocketAddr::new(*host, local_addr.port()));
    }

    let api_base = format!(
        "http://{}/api/v1",
        SocketAddr::new(hosts[0], local_addr.port())
    );
    tracing::info!("API base URL: {}", api_base);
    tracing::info!("  upload: POST {}/upload", api_base);
    tracing::info!("  sample: GET  {}/sample", api_base);
    tracing::info!("  state:  GET  {}/state", api_base);
    tracing::info!("  status: GET  {}/status", api_base);
    tracing::info!("  health: GET  {}/health", api_base);
    if config.dev_mode {
        tracing::info!("development mode: verbose request logging enabled");
    }
}

/// Bind the API listener, then spawn the HTTP server and the reaper.
///
/// The returned `ShutdownHandle` must be kept alive; dropping it does not stop the service.
pub async fn start_service(config: &Config) -> Result<(ServiceState, ShutdownHandle), ServiceError> {
    let (graceful_waiter, shutdown_tx, shutdown_rx) =
        utils::graceful_shutdown_blocker().map_err(ServiceError::Signals)?;
    let state = ServiceState::from_config(config);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| ServiceError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ServiceError::Bind {
            addr: config.listen_addr,
            source,
        })?;

    let mut handles = Vec::new();

    let reaper_handle = reaper::spawn(
        state.store().clone(),
        config.sweep_interval,
        shutdown_rx.clone(),
    );
    handles.push(reaper_handle);

    let api_state = state.clone();
    let api_config = http::Config::new(local_addr, config.dev_mode);
    let api_rx = shutdown_rx.clone();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = http::run_api(listener, api_config, api_state, api_rx).await {
            tracing::error!("API server error: {}", e);
        }
    });
    handles.push(api_handle);

    log_startup(config, local_addr);

    let handle = ShutdownHandle {
        graceful_waiter,
        handles,
        shutdown_tx,
        local_addr,
    };

    Ok((state, handle))
}

/// Runs the relay: API server + reaper.
/// Blocks until a shutdown signal is received. Use for CLI binary usage.
pub async fn spawn_service(config: &Config) -> Result<(), ServiceError> {
    let _guards = init_logging(config);
    let (_, handle) = start_service(config).await?;
    handle.wait().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    fn interfaces() -> Vec<(String, IpAddr)> {
        vec![
            ("lo".to_string(), IpAddr::V4(Ipv4Addr::LOCALHOST)),
            ("lo".to_string(), IpAddr::V6(Ipv6Addr::LOCALHOST)),
            ("eth0".to_string(), "192.168.1.20".parse().unwrap()),
            ("eth0".to_string(), "fe80::1".parse().unwrap()),
            ("wlan0".to_string(), "10.0.0.7".parse().unwrap()),
        ]
    }

    #[test]
    fn test_wildcard_bind_lists_external_ipv4_first() {
        let hosts = reachable_hosts(IpAddr::V4(Ipv4Addr::UNSPECIFIED), &interfaces());
        assert_eq!(
            hosts,
            vec![
                "192.168.1.20".parse::<IpAddr>().unwrap(),
                "10.0.0.7".parse().unwrap(),
                IpAddr::V4(Ipv4Addr::LOCALHOST),
            ]
        );
    }

    #[test]
    fn test_wildcard_bind_without_interfaces_uses_loopback() {
        let hosts = reachable_hosts(IpAddr::V4(Ipv4Addr::UNSPECIFIED), &[]);
        assert_eq!(hosts, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
    }

    #[test]
    fn test_specific_bind_is_its_own_address() {
        let listen: IpAddr = "192.168.1.20".parse().unwrap();
        assert_eq!(reachable_hosts(listen, &interfaces()), vec![listen]);
    }
}
