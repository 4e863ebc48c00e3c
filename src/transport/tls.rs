//! TLS transport support
//!
//! Secure connections go to the TLS port of the host server. It supports:
//! - Server certificate verification against webpki roots or a CA file
//! - Client certificates (mutual TLS)
//! - SNI (Server Name Indication)

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::{ClientConfig, RootCertStore};
use rustls_pemfile::{certs, private_key};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

use super::tcp::open_stream;
use super::StreamTransport;

/// TLS transport
pub type TlsTransport = StreamTransport<TlsStream<TcpStream>>;

/// TLS configuration for host server connections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    /// Server name for SNI (defaults to connection host)
    pub server_name: Option<String>,
    /// Path to CA certificate file (PEM format)
    pub ca_cert_path: Option<String>,
    /// Path to client certificate file (PEM format) for mTLS
    pub client_cert_path: Option<String>,
    /// Path to client private key file (PEM format)
    pub client_key_path: Option<String>,
}

impl TlsConfig {
    /// Create a new TLS configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server name for SNI
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Set the CA certificate path
    pub fn with_ca_cert(mut self, path: impl Into<String>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Set client certificate and key paths for mTLS
    pub fn with_client_cert(
        mut self,
        cert_path: impl Into<String>,
        key_path: impl Into<String>,
    ) -> Self {
        self.client_cert_path = Some(cert_path.into());
        self.client_key_path = Some(key_path.into());
        self
    }

    /// Build the rustls ClientConfig from this configuration
    pub fn build_client_config(&self) -> Result<ClientConfig> {
        let mut root_store = RootCertStore::empty();

        if let Some(ca_path) = &self.ca_cert_path {
            for cert in load_certs_from_file(ca_path)? {
                root_store
                    .add(cert)
                    .map_err(|e| Error::Tls(format!("failed to add CA cert: {}", e)))?;
            }
        } else {
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        }

        let builder = ClientConfig::builder().with_root_certificates(root_store);

        let config = match (&self.client_cert_path, &self.client_key_path) {
            (Some(cert_path), Some(key_path)) => {
                let client_certs = load_certs_from_file(cert_path)?;
                let client_key = load_private_key_from_file(key_path)?;
                builder
                    .with_client_auth_cert(client_certs, client_key)
                    .map_err(|e| Error::Tls(format!("failed to configure client auth: {}", e)))?
            }
            (None, None) => builder.with_no_client_auth(),
            _ => {
                return Err(Error::Tls(
                    "client certificate and key must be set together".to_string(),
                ))
            }
        };

        Ok(config)
    }
}

/// Run the TLS handshake over a connected TCP stream
pub async fn connect_tls(
    tcp_stream: TcpStream,
    server_name: &str,
    config: &TlsConfig,
) -> Result<TlsStream<TcpStream>> {
    let client_config = config.build_client_config()?;
    let connector = TlsConnector::from(Arc::new(client_config));

    let sni_name = config.server_name.as_deref().unwrap_or(server_name);
    let server_name = ServerName::try_from(sni_name.to_string())
        .map_err(|_| Error::Tls(format!("invalid server name: {}", sni_name)))?;

    connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(Error::Io)
}

impl StreamTransport<TlsStream<TcpStream>> {
    /// Connect and run the TLS handshake using a Config
    ///
    /// Uses the config's [`TlsConfig`], or the defaults when none is set.
    pub async fn connect(config: &Config) -> Result<Self> {
        let tls = config.tls_config.clone().unwrap_or_default();
        let (stream, local) = open_stream(config).await?;
        let stream = connect_tls(stream, &config.host, &tls).await?;
        debug!(host = %config.host, "TLS handshake complete");
        Ok(Self::new(stream, local).with_max_message_size(config.max_message_size))
    }
}

/// Load certificates from a PEM file
fn load_certs_from_file(path: &str) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path)
        .map_err(|e| Error::Tls(format!("failed to open cert file {}: {}", path, e)))?;
    let mut reader = BufReader::new(file);

    let certs: Vec<CertificateDer<'static>> = certs(&mut reader).filter_map(|r| r.ok()).collect();

    if certs.is_empty() {
        return Err(Error::Tls(format!("no certificates found in {}", path)));
    }

    Ok(certs)
}

/// Load private key from a PEM file
fn load_private_key_from_file(path: &str) -> Result<PrivateKeyDer<'static>> {
    let file = File::open(path)
        .map_err(|e| Error::Tls(format!("failed to open key file {}: {}", path, e)))?;
    let mut reader = BufReader::new(file);

    private_key(&mut reader)
        .map_err(|e| Error::Tls(format!("failed to parse key file {}: {}", path, e)))?
        .ok_or_else(|| Error::Tls(format!("no private key found in {}", path)))
}
