//! Transport and link layer for ZVT terminals
//!
//! The [`Transport`] trait carries raw bytes to and from the terminal;
//! [`LinkChannel`] runs the ZVT link discipline on top of it: every
//! outbound package is answered by the terminal with `80 00` (or a
//! `84 xx` negative), and every terminal-initiated package is
//! acknowledged back before it is handed to the application.

pub mod error;
pub mod link;
pub mod tcp;

pub use error::{Error, Result};
pub use link::{LinkChannel, PackageHandler, SendOutcome};
pub use tcp::TcpTransport;

use async_trait::async_trait;
use bytes::BytesMut;
use std::time::Duration;

/// Standard ZVT network port
pub const DEFAULT_PORT: u16 = 5577;

/// Byte transport to a payment terminal
///
/// Implementations deliver raw bytes in arrival order; packaging is the
/// link layer's concern. A serial implementation would additionally
/// strip DLE/STX framing before handing bytes up, so that the link
/// layer sees the same byte stream in both cases.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the connection
    async fn connect(&mut self) -> Result<()>;

    /// Release the connection
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send raw bytes
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive raw bytes, waiting at most `timeout`
    ///
    /// Returns [`Error::ReadTimeout`] when nothing arrived; callers
    /// polling an idle line treat that as a non-event.
    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;

    /// Remote endpoint description for diagnostics
    fn remote_addr(&self) -> String;
}
