//! TCP transport implementation

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

use super::StreamTransport;

/// Plain TCP transport
pub type TcpTransport = StreamTransport<TcpStream>;

/// Whether `peer` is on this machine: loopback, or the same address as `local`
pub fn is_local_endpoint(local: SocketAddr, peer: SocketAddr) -> bool {
    peer.ip().is_loopback() || peer.ip() == local.ip()
}

/// Open a TCP stream with the configured timeout and `TCP_NODELAY`
pub(crate) async fn open_stream(config: &Config) -> Result<(TcpStream, bool)> {
    let addr = config.socket_addr();
    let stream = timeout(config.connect_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| Error::ConnectionTimeout(config.connect_timeout))?
        .map_err(Error::Io)?;

    stream.set_nodelay(true).map_err(Error::Io)?;

    let local = is_local_endpoint(
        stream.local_addr().map_err(Error::Io)?,
        stream.peer_addr().map_err(Error::Io)?,
    );
    debug!(%addr, local, "connected");
    Ok((stream, local))
}

impl StreamTransport<TcpStream> {
    /// Connect using a Config
    pub async fn connect(config: &Config) -> Result<Self> {
        let (stream, local) = open_stream(config).await?;
        Ok(Self::new(stream, local).with_max_message_size(config.max_message_size))
    }
}
