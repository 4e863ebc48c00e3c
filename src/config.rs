//! Connection configuration and address parsing
//!
//! Addresses are written `host[:port]`; IPv6 literals go in brackets
//! (`[::1]:8471`). Without a port the plain or TLS default is used.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::TlsConfig;

/// Default port of the database host server
pub const DEFAULT_PORT: u16 = 8471;

/// Default port of the database host server over TLS
pub const DEFAULT_SECURE_PORT: u16 = 9471;

/// Largest reply accepted by default (16 MiB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Default LOB segment size
pub const DEFAULT_LOB_SEGMENT_SIZE: usize = crate::reply::DEFAULT_LOB_SEGMENT_SIZE;

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection configuration for the database host server.
///
/// # Examples
///
/// ```rust
/// use hostdb::Config;
/// use std::time::Duration;
///
/// let config = Config::new("ibmi.example.com")
///     .connect_timeout(Duration::from_secs(30))
///     .compression(false);
/// assert_eq!(config.port, 8471);
///
/// let config: Config = "ibmi.example.com:9471".parse().unwrap();
/// assert_eq!(config.port, 9471);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to connect to
    pub host: String,
    /// Port to connect to
    pub port: u16,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Ask for RLE compressed replies on remote connections
    pub compression: bool,
    /// Ask for message id and message texts with every reply
    pub message_info: bool,
    /// Largest message accepted from the server
    pub max_message_size: usize,
    /// LOB segment size when the callback has no preference
    pub lob_segment_size: usize,
    /// TLS configuration, when the connection is secured
    pub tls_config: Option<TlsConfig>,
}

impl Config {
    /// Create a configuration for `host` on the default port
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Set port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable or disable reply compression
    pub fn compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Enable or disable message information in replies
    pub fn message_info(mut self, enabled: bool) -> Self {
        self.message_info = enabled;
        self
    }

    /// Set the largest message accepted from the server
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Set the default LOB segment size
    pub fn lob_segment_size(mut self, size: usize) -> Self {
        self.lob_segment_size = size;
        self
    }

    /// Set TLS configuration
    ///
    /// Moves the port to [`DEFAULT_SECURE_PORT`] if it was still the plain
    /// default.
    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.tls_config = Some(config);
        if self.port == DEFAULT_PORT {
            self.port = DEFAULT_SECURE_PORT;
        }
        self
    }

    /// Enable TLS with webpki root certificates
    pub fn with_tls(self) -> Result<Self> {
        let tls_config = TlsConfig::new();
        tls_config.build_client_config()?;
        Ok(self.tls_config(tls_config))
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls_config.is_some()
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            compression: true,
            message_info: true,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            lob_segment_size: DEFAULT_LOB_SEGMENT_SIZE,
            tls_config: None,
        }
    }
}

/// Parse a `host[:port]` address
impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidConnectionString(
                "empty connection string".to_string(),
            ));
        }

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let close = rest.find(']').ok_or_else(|| {
                Error::InvalidConnectionString("unterminated IPv6 address".to_string())
            })?;
            let host = &rest[..close];
            let port = match &rest[close + 1..] {
                "" => None,
                tail => Some(tail.strip_prefix(':').ok_or_else(|| {
                    Error::InvalidConnectionString(format!("unexpected text after address: {}", tail))
                })?),
            };
            (host, port)
        } else {
            match s.split_once(':') {
                Some((host, port)) => {
                    if port.contains(':') {
                        return Err(Error::InvalidConnectionString(
                            "too many colons in connection string".to_string(),
                        ));
                    }
                    (host, Some(port))
                }
                None => (s, None),
            }
        };

        if host.is_empty() {
            return Err(Error::InvalidConnectionString("missing host".to_string()));
        }

        let mut config = Config::new(host);
        if let Some(port) = port {
            config.port = port
                .parse()
                .map_err(|_| Error::InvalidConnectionString("invalid port number".to_string()))?;
        }
        Ok(config)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_only() {
        let config: Config = "myhost".parse().unwrap();
        assert_eq!(config.host, "myhost");
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.compression);
        assert!(config.message_info);
    }

    #[test]
    fn test_parse_host_port() {
        let config: Config = "myhost:9000".parse().unwrap();
        assert_eq!(config.host, "myhost");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_parse_ipv6() {
        let config: Config = "[::1]:8476".parse().unwrap();
        assert_eq!(config.host, "::1");
        assert_eq!(config.port, 8476);
        assert_eq!(config.socket_addr(), "[::1]:8476");

        let config: Config = "[fe80::1]".parse().unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Config>().is_err());
        assert!(":8471".parse::<Config>().is_err());
        assert!("myhost:notaport".parse::<Config>().is_err());
        assert!("a:1:2".parse::<Config>().is_err());
        assert!("[::1".parse::<Config>().is_err());
    }

    #[test]
    fn test_config_display() {
        let config = Config::new("myhost").port(8471);
        assert_eq!(config.to_string(), "myhost:8471");
    }

    #[test]
    fn test_tls_moves_default_port() {
        let config = Config::new("myhost").tls_config(TlsConfig::new());
        assert!(config.is_tls_enabled());
        assert_eq!(config.port, DEFAULT_SECURE_PORT);

        let config = Config::new("myhost").port(9999).tls_config(TlsConfig::new());
        assert_eq!(config.port, 9999);
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = Config::new("host")
            .connect_timeout(Duration::from_secs(30))
            .compression(false)
            .message_info(false)
            .max_message_size(1024)
            .lob_segment_size(4096);

        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(!config.compression);
        assert!(!config.message_info);
        assert_eq!(config.max_message_size, 1024);
        assert_eq!(config.lob_segment_size, 4096);
    }
}
