use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // include request/response headers in traces
    pub dev_mode: bool,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, dev_mode: bool) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, dev_mode={}",
            listen_addr,
            dev_mode
        );
        let log_level = if dev_mode {
            tracing::Level::INFO
        } else {
            tracing::Level::DEBUG
        };
        Self {
            listen_addr,
            log_level,
            dev_mode,
        }
    }
}
