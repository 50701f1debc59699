//! Shared test harness: an in-process scripted terminal

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

use zvtlink::{ClientConfig, Transport, ZvtClient};
use zvtlink_transport::{Error, Result};

/// Transport wired to in-memory channels instead of a socket
struct ScriptedTransport {
    inbound: UnboundedReceiver<Bytes>,
    outbound: UnboundedSender<Bytes>,
    connected: bool,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.outbound
            .send(Bytes::copy_from_slice(data))
            .map_err(|_| Error::ConnectionClosed)
    }

    async fn receive(&mut self, read_timeout: Duration) -> Result<BytesMut> {
        match timeout(read_timeout, self.inbound.recv()).await {
            Err(_) => Err(Error::ReadTimeout),
            Ok(None) => Err(Error::ConnectionClosed),
            Ok(Some(bytes)) => Ok(BytesMut::from(&bytes[..])),
        }
    }

    fn remote_addr(&self) -> String {
        "mock-terminal".to_owned()
    }
}

/// Scripted remote side of the connection
pub struct MockTerminal {
    wire_in: UnboundedSender<Bytes>,
    wire_out: UnboundedReceiver<Bytes>,
}

impl MockTerminal {
    /// Inject bytes as if sent by the terminal
    pub fn send(&self, bytes: &[u8]) {
        self.wire_in.send(Bytes::copy_from_slice(bytes)).unwrap();
    }

    /// Acknowledge the last command positively
    pub fn acknowledge(&self) {
        self.send(&[0x80, 0x00, 0x00]);
    }

    /// Take the next package written by the client
    pub async fn expect(&mut self) -> Bytes {
        timeout(Duration::from_secs(2), self.wire_out.recv())
            .await
            .expect("client wrote nothing within two seconds")
            .expect("wire closed")
    }

    /// Assert the client acknowledged the last delivered package
    pub async fn expect_acknowledge(&mut self) {
        assert_eq!(self.expect().await.as_ref(), &[0x80, 0x00, 0x00]);
    }

    /// Check that nothing further was written
    pub fn assert_silent(&mut self) {
        assert!(self.wire_out.try_recv().is_err(), "unexpected wire traffic");
    }
}

/// Connect a client to a fresh mock terminal
pub async fn connect(config: ClientConfig) -> (ZvtClient, MockTerminal) {
    let (wire_in, inbound) = unbounded_channel();
    let (outbound, wire_out) = unbounded_channel();

    let transport = ScriptedTransport {
        inbound,
        outbound,
        connected: false,
    };

    let client = ZvtClient::connect(Box::new(transport), config)
        .await
        .expect("mock connect failed");

    (client, MockTerminal { wire_in, wire_out })
}
