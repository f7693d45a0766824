//! Configuration module - environment variable parsing

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Well-known UDP port for peer state broadcasts
pub const DEFAULT_PORT: u16 = 6000;
/// Minimum interval between outbound state broadcasts
pub const DEFAULT_SEND_INTERVAL_MS: u64 = 20;
/// Bounded wait on the receive socket so the listener can observe shutdown
pub const DEFAULT_RECV_TIMEOUT_MS: u64 = 1000;
/// Generously sized for one snapshot per datagram, no fragmentation
pub const DEFAULT_RECV_BUFFER_BYTES: usize = 4096;

/// Netplay configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Well-known UDP port the receive socket binds
    pub port: u16,
    /// Destination for outbound datagrams: the subnet broadcast address on
    /// the well-known port in production, a specific peer in tests
    pub broadcast_target: SocketAddr,
    /// Minimum interval between outbound broadcasts
    pub send_interval: Duration,
    /// Receive timeout for the listener loop
    pub recv_timeout: Duration,
    /// Receive buffer size in bytes
    pub recv_buffer_bytes: usize,
    /// Evict remote entries not refreshed within this window.
    /// `None` keeps entries for the whole session.
    pub peer_timeout: Option<Duration>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_var("NETPLAY_PORT", DEFAULT_PORT)?;
        let broadcast_ip: IpAddr =
            parse_var("NETPLAY_BROADCAST_ADDR", IpAddr::V4(Ipv4Addr::BROADCAST))?;

        let send_interval_ms: u64 =
            parse_var("NETPLAY_SEND_INTERVAL_MS", DEFAULT_SEND_INTERVAL_MS)?;
        if send_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "NETPLAY_SEND_INTERVAL_MS",
                "interval must be at least 1 ms".to_string(),
            ));
        }

        let recv_timeout_ms: u64 = parse_var("NETPLAY_RECV_TIMEOUT_MS", DEFAULT_RECV_TIMEOUT_MS)?;
        if recv_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "NETPLAY_RECV_TIMEOUT_MS",
                "timeout must be at least 1 ms".to_string(),
            ));
        }

        let recv_buffer_bytes: usize =
            parse_var("NETPLAY_RECV_BUFFER_BYTES", DEFAULT_RECV_BUFFER_BYTES)?;
        if recv_buffer_bytes == 0 {
            return Err(ConfigError::Invalid(
                "NETPLAY_RECV_BUFFER_BYTES",
                "buffer must be at least 1 byte".to_string(),
            ));
        }

        // 0 disables eviction; a silent peer then stays known forever
        let peer_timeout_ms: u64 = parse_var("NETPLAY_PEER_TIMEOUT_MS", 0)?;
        let peer_timeout = (peer_timeout_ms > 0).then(|| Duration::from_millis(peer_timeout_ms));

        Ok(Self {
            port,
            broadcast_target: SocketAddr::new(broadcast_ip, port),
            send_interval: Duration::from_millis(send_interval_ms),
            recv_timeout: Duration::from_millis(recv_timeout_ms),
            recv_buffer_bytes,
            peer_timeout,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Local bind address for the receive socket (all interfaces)
    pub fn recv_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Destination address for outbound broadcasts
    pub fn target_addr(&self) -> SocketAddr {
        self.broadcast_target
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            broadcast_target: SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), DEFAULT_PORT),
            send_interval: Duration::from_millis(DEFAULT_SEND_INTERVAL_MS),
            recv_timeout: Duration::from_millis(DEFAULT_RECV_TIMEOUT_MS),
            recv_buffer_bytes: DEFAULT_RECV_BUFFER_BYTES,
            peer_timeout: None,
            log_level: "info".to_string(),
        }
    }
}

/// Parse an environment variable, falling back to a default when unset
fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(var, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
