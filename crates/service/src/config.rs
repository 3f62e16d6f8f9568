use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default cap on live session records
pub const DEFAULT_MAX_SESSIONS: usize = 100;
/// Default cap on a serialized payload (1 MiB)
pub const DEFAULT_MAX_SAMPLE_SIZE: usize = 1024 * 1024;
/// Default record time-to-live (1 hour)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_millis(60 * 60 * 1000);
/// Default reaper period (5 minutes)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(5 * 60 * 1000);

/// Whether a saturated store may still accept an upload that would only
/// replace an identity's existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    /// Capacity is checked before the identity is resolved, so once the store
    /// is full every upload is rejected, overwrites included.
    #[default]
    Strict,
    /// Uploads replacing a live record are admitted even when the store is full.
    AllowReplace,
}

impl FromStr for CapacityPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "allow-replace" | "allow_replace" => Ok(Self::AllowReplace),
            other => Err(ConfigError::InvalidValue {
                name: "CAPACITY_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

/// Resource limits enforced by the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of live records
    pub max_sessions: usize,
    /// Maximum compact-serialized payload size in bytes
    pub max_sample_size: usize,
    /// Age at which a record expires
    pub session_ttl: Duration,
    pub capacity_policy: CapacityPolicy,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            max_sample_size: DEFAULT_MAX_SAMPLE_SIZE,
            session_ttl: DEFAULT_SESSION_TTL,
            capacity_policy: CapacityPolicy::default(),
        }
    }
}

impl Limits {
    /// Read `MAX_SESSIONS`, `MAX_SAMPLE_SIZE`, `MAX_SESSION_TTL` and
    /// `CAPACITY_POLICY` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build limits from an arbitrary variable lookup.
    ///
    /// Missing, unparsable or zero values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_sessions: positive_or(&lookup, "MAX_SESSIONS", defaults.max_sessions as u64)
                as usize,
            max_sample_size: positive_or(
                &lookup,
                "MAX_SAMPLE_SIZE",
                defaults.max_sample_size as u64,
            ) as usize,
            session_ttl: Duration::from_millis(positive_or(
                &lookup,
                "MAX_SESSION_TTL",
                defaults.session_ttl.as_millis() as u64,
            )),
            capacity_policy: match lookup("CAPACITY_POLICY") {
                Some(raw) => raw.parse().unwrap_or_else(|e| {
                    tracing::warn!("{}, using default", e);
                    defaults.capacity_policy
                }),
                None => defaults.capacity_policy,
            },
        }
    }
}

/// Reaper period from `SWEEP_INTERVAL` (milliseconds)
pub fn sweep_interval_from_env() -> Duration {
    Duration::from_millis(positive_or(
        &|name: &str| std::env::var(name).ok(),
        "SWEEP_INTERVAL",
        DEFAULT_SWEEP_INTERVAL.as_millis() as u64,
    ))
}

fn positive_or<F>(lookup: &F, name: &'static str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => default,
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => value,
            _ => {
                tracing::warn!(
                    variable = name,
                    value = %raw,
                    default,
                    "ignoring invalid configuration value"
                );
                default
            }
        },
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the API server to listen on
    pub listen_addr: SocketAddr,
    /// honour `X-Forwarded-For` from a loopback peer (a local reverse proxy)
    pub trust_forwarded_for: bool,

    // session store configuration
    pub limits: Limits,
    /// how often the reaper sweeps expired records
    pub sweep_interval: Duration,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
    /// verbose request logging
    pub dev_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            trust_forwarded_for: true,
            limits: Limits::default(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            log_level: tracing::Level::INFO,
            log_dir: None,
            dev_mode: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with the limits found in the environment
    pub fn from_env() -> Self {
        Self {
            limits: Limits::from_env(),
            sweep_interval: sweep_interval_from_env(),
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Invalid Socket Address: {0}")]
    ListenAddr(#[from] std::net::AddrParseError),
}
