//! Transport layer for host server connections
//!
//! Moves whole messages between the session and the server. Every message
//! starts with its own 4-byte big-endian length, so a receive reads the
//! length, checks it and then reads the rest of the message.

mod tcp;
pub mod tls;

pub use tcp::{is_local_endpoint, TcpTransport};
pub use tls::{connect_tls, TlsConfig, TlsTransport};

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::DEFAULT_MAX_MESSAGE_SIZE;
use crate::constants::MIN_MESSAGE_LENGTH;
use crate::error::{Error, Result};

/// Trait for transport implementations
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Send one complete message and flush it
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive one complete message
    async fn receive(&mut self) -> Result<Bytes>;

    /// Whether the peer runs on this machine
    fn is_local(&self) -> bool;

    /// Check if the transport is connected
    fn is_connected(&self) -> bool;

    /// Close the connection
    async fn close(&mut self) -> Result<()>;
}

/// Message transport over any async byte stream
pub struct StreamTransport<S> {
    stream: Option<S>,
    local: bool,
    max_message_size: usize,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a connected stream
    pub fn new(stream: S, local: bool) -> Self {
        Self {
            stream: Some(stream),
            local,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Set the largest message accepted from the server
    pub fn with_max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = max.max(MIN_MESSAGE_LENGTH);
        self
    }

    /// Largest message accepted from the server
    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    fn stream_mut(&mut self) -> Result<&mut S> {
        self.stream.as_mut().ok_or(Error::ConnectionClosed)
    }
}

fn map_read_error(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        Error::Io(e)
    }
}

#[async_trait::async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream_mut()?;
        stream.write_all(data).await.map_err(Error::Io)?;
        stream.flush().await.map_err(Error::Io)?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<Bytes> {
        let max = self.max_message_size;
        let stream = self.stream_mut()?;

        let mut prefix = [0u8; 4];
        stream.read_exact(&mut prefix).await.map_err(map_read_error)?;
        let length = u32::from_be_bytes(prefix) as usize;
        if length < MIN_MESSAGE_LENGTH {
            return Err(Error::framing(format!(
                "message length {} below minimum {}",
                length, MIN_MESSAGE_LENGTH
            )));
        }
        if length > max {
            return Err(Error::MessageTooLarge { length, max });
        }

        let mut buf = BytesMut::with_capacity(length);
        buf.put_slice(&prefix);
        buf.resize(length, 0);
        stream
            .read_exact(&mut buf[4..])
            .await
            .map_err(map_read_error)?;
        Ok(buf.freeze())
    }

    fn is_local(&self) -> bool {
        self.local
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await.map_err(Error::Io)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn message(length: usize) -> Vec<u8> {
        let mut out = (length as u32).to_be_bytes().to_vec();
        out.resize(length, 0xAB);
        out
    }

    #[tokio::test]
    async fn test_receive_whole_message() {
        let (client, mut server) = duplex(1024);
        let mut transport = StreamTransport::new(client, true);
        server.write_all(&message(48)).await.unwrap();
        let received = transport.receive().await.unwrap();
        assert_eq!(received.len(), 48);
        assert_eq!(&received[..4], &[0, 0, 0, 48]);
        assert!(transport.is_local());
    }

    #[tokio::test]
    async fn test_send_reaches_peer() {
        let (client, mut server) = duplex(1024);
        let mut transport = StreamTransport::new(client, false);
        transport.send(&[1, 2, 3]).await.unwrap();
        let mut buf = [0u8; 3];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_oversized_message_rejected() {
        let (client, mut server) = duplex(1024);
        let mut transport = StreamTransport::new(client, false).with_max_message_size(64);
        server.write_all(&(100u32).to_be_bytes()).await.unwrap();
        let err = transport.receive().await.unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { length: 100, max: 64 }));
        assert!(err.is_framing());
    }

    #[tokio::test]
    async fn test_short_length_is_framing_error() {
        let (client, mut server) = duplex(1024);
        let mut transport = StreamTransport::new(client, false);
        server.write_all(&(12u32).to_be_bytes()).await.unwrap();
        assert!(transport.receive().await.unwrap_err().is_framing());
    }

    #[tokio::test]
    async fn test_peer_close_maps_to_connection_closed() {
        let (client, server) = duplex(1024);
        let mut transport = StreamTransport::new(client, false);
        drop(server);
        assert!(matches!(
            transport.receive().await.unwrap_err(),
            Error::ConnectionClosed
        ));
    }

    #[tokio::test]
    async fn test_closed_transport() {
        let (client, _server) = duplex(1024);
        let mut transport = StreamTransport::new(client, false);
        transport.close().await.unwrap();
        assert!(!transport.is_connected());
        assert!(matches!(
            transport.send(&[0]).await.unwrap_err(),
            Error::ConnectionClosed
        ));
    }
}
