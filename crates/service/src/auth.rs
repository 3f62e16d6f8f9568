//! Caller admission: turns "who is asking, with what key" into an identity secret
//!
//! Remote callers must present a well-formed key. Loopback callers may present
//! one (to run several independent sessions) and otherwise share the fixed
//! [`LOOPBACK_API_KEY`](common::api_key::LOOPBACK_API_KEY) session slot.

use std::net::IpAddr;

use common::api_key::{ApiKey, ApiKeyError};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing X-API-Key header")]
    Missing,
    #[error("invalid X-API-Key header: {0}")]
    Malformed(#[from] ApiKeyError),
}

/// Admit a caller, yielding the identity secret used for its session
pub fn authenticate(caller_is_loopback: bool, supplied: Option<&str>) -> Result<ApiKey, AuthError> {
    let parsed = match supplied {
        Some(raw) => ApiKey::parse(raw).map_err(AuthError::from),
        None => Err(AuthError::Missing),
    };

    match parsed {
        Ok(key) => Ok(key),
        Err(_) if caller_is_loopback => Ok(ApiKey::loopback_default()),
        Err(e) => Err(e),
    }
}

/// Decide whether a request originates from the local machine.
///
/// The TCP peer must itself be loopback. When it is, and `forwarded_for` is
/// given, the first forwarded entry decides instead, so a local reverse proxy
/// does not make every proxied caller local. A request with no known peer is
/// treated as remote.
pub fn is_loopback(peer: Option<IpAddr>, forwarded_for: Option<&str>) -> bool {
    if !peer.map(is_loopback_addr).unwrap_or(false) {
        return false;
    }

    let forwarded = forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|client| !client.is_empty());

    match forwarded {
        Some(client) => is_loopback_literal(client),
        None => true,
    }
}

fn is_loopback_literal(client: &str) -> bool {
    if client.eq_ignore_ascii_case("localhost") {
        return true;
    }
    // tolerate "[::1]" and "127.0.0.1:port" style entries
    let host = client
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']').map(|(host, _)| host))
        .unwrap_or(client);
    if let Ok(ip) = host.parse::<IpAddr>() {
        return is_loopback_addr(ip);
    }
    match host.rsplit_once(':') {
        Some((ip, _port)) => ip.parse::<IpAddr>().map(is_loopback_addr).unwrap_or(false),
        None => false,
    }
}

fn is_loopback_addr(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.to_ipv4_mapped().map(|v4| v4.is_loopback()).unwrap_or(false)
        }
    }
}
