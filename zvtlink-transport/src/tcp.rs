//! TCP transport
//!
//! Network terminals accept a plain TCP connection and exchange ZVT
//! packages without additional framing; the package length field is the
//! only record boundary. Terminals sit on a fixed LAN address, so the
//! target is resolved on every connect and nothing is cached to go
//! stale across a terminal reboot.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use zvtlink_core::MAX_SHORT_PAYLOAD;

use crate::{error::*, Transport};

/// TCP transport to a payment terminal
pub struct TcpTransport {
    addr: String,
    port: u16,
    peer: Option<SocketAddr>,
    stream: Option<TcpStream>,
    connect_timeout: Duration,
}

impl TcpTransport {
    /// Create a new TCP transport
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
            peer: None,
            stream: None,
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(Error::AlreadyConnected);
        }

        let target = (self.addr.as_str(), self.port);
        let stream = timeout(self.connect_timeout, TcpStream::connect(target))
            .await
            .map_err(|_| Error::ConnectionTimeout)??;

        // A package is a few dozen bytes and the terminal answers each
        // one before the next; batching would only add latency
        stream.set_nodelay(true)?;

        self.peer = stream.peer_addr().ok();
        self.stream = Some(stream);

        debug!("Connected to terminal at {}", self.remote_addr());
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        debug!("Closing connection to {}", self.remote_addr());
        let _ = stream.shutdown().await;
        self.peer = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace_chunk("TX", data);

        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    async fn receive(&mut self, read_timeout: Duration) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        // Sized for the single-byte length form; the rare length-escaped
        // receipt block arrives over further reads and is reassembled by
        // the link layer
        let mut buf = BytesMut::with_capacity(3 + MAX_SHORT_PAYLOAD);

        let n = timeout(read_timeout, stream.read_buf(&mut buf))
            .await
            .map_err(|_| Error::ReadTimeout)??;

        if n == 0 {
            warn!("Terminal closed the connection");
            return Err(Error::ConnectionClosed);
        }

        trace_chunk("RX", &buf);
        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        self.peer
            .map(|peer| peer.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.addr, self.port))
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!(
                "Transport to {} dropped without disconnect",
                self.remote_addr()
            );
        }
    }
}

/// Summarize one wire chunk by its package header
///
/// A read may begin mid-package; only a chunk that starts with a full
/// header is broken down into control field and declared length.
fn trace_chunk(direction: &str, data: &[u8]) {
    match *data {
        [ccrc, aprc, 0xFF, lo, hi, ..] => trace!(
            "{direction} CCRC {ccrc:02X} APRC {aprc:02X} declared {} (escaped), {} bytes on wire",
            u16::from_le_bytes([lo, hi]),
            data.len()
        ),
        [ccrc, aprc, declared, ..] => trace!(
            "{direction} CCRC {ccrc:02X} APRC {aprc:02X} declared {declared}, {} bytes on wire",
            data.len()
        ),
        _ => trace!("{direction} {} bytes mid-frame", data.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_transport_create() {
        let transport = TcpTransport::new("192.168.1.50", crate::DEFAULT_PORT);
        assert!(!transport.is_connected());
        assert_eq!(transport.remote_addr(), "192.168.1.50:5577");
    }

    #[tokio::test]
    async fn test_tcp_transport_invalid_address() {
        let mut transport = TcpTransport::new("invalid..address", crate::DEFAULT_PORT)
            .with_connect_timeout(Duration::from_millis(100));

        let result = transport.connect().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let mut transport = TcpTransport::new("192.168.1.50", crate::DEFAULT_PORT);
        let result = transport.send(&[0x06, 0x02, 0x00]).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_connects_and_sends_on_default_port() {
        // Stand in for a terminal listening on the standard port
        let listener = TcpListener::bind(("127.0.0.1", crate::DEFAULT_PORT))
            .await
            .expect("port 5577 must be free to pin the default");
        assert_eq!(listener.local_addr().unwrap().port(), 5577);

        let mut transport = TcpTransport::new("127.0.0.1", crate::DEFAULT_PORT);
        let (connected, accepted) = tokio::join!(transport.connect(), listener.accept());
        connected.unwrap();
        let (mut terminal, _) = accepted.unwrap();
        assert!(transport.is_connected());
        assert_eq!(transport.remote_addr(), "127.0.0.1:5577");

        // Log-off package reaches the terminal unmodified
        transport.send(&[0x06, 0x02, 0x00]).await.unwrap();
        let mut frame = [0u8; 3];
        terminal.read_exact(&mut frame).await.unwrap();
        assert_eq!(frame, [0x06, 0x02, 0x00]);

        transport.disconnect().await.unwrap();
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_receive_round_trip() {
        // An ephemeral port keeps this independent of the default-port test
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut transport = TcpTransport::new("127.0.0.1", port);
        let (connected, accepted) = tokio::join!(transport.connect(), listener.accept());
        connected.unwrap();
        let (mut terminal, _) = accepted.unwrap();

        terminal.write_all(&[0x80, 0x00, 0x00]).await.unwrap();
        let received = transport.receive(Duration::from_secs(1)).await.unwrap();
        assert_eq!(received.as_ref(), &[0x80, 0x00, 0x00]);

        // Idle line reports a timeout, not an error worth tearing down
        let idle = transport.receive(Duration::from_millis(50)).await;
        assert!(matches!(idle, Err(Error::ReadTimeout)));

        transport.disconnect().await.unwrap();
    }
}
