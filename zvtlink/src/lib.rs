//! # zvtlink
//!
//! Async Rust client for payment terminals speaking the ZVT protocol
//! (revision 13.09) over TCP.
//!
//! ## Features
//!
//! - Typed command methods for the merchant command set
//! - Event streams for status, display text, print lines and receipts
//! - Byte-exact package encoding (BCD amounts, TLV containers)
//! - Cancellation and per-command completion timeouts
//!
//! ## Quick Start
//!
//! ```no_run
//! use rust_decimal::Decimal;
//! use tokio_util::sync::CancellationToken;
//! use zvtlink::{ClientConfig, RegistrationConfig, TcpTransport, ZvtClient};
//!
//! #[tokio::main]
//! async fn main() -> zvtlink::Result<()> {
//!     let transport = TcpTransport::new("192.168.1.50", zvtlink::DEFAULT_PORT);
//!     let config = ClientConfig::new(123456);
//!     let mut client = ZvtClient::connect(Box::new(transport), config).await?;
//!
//!     let cancel = CancellationToken::new();
//!     client.registration(&RegistrationConfig::default(), &cancel).await;
//!     let response = client.payment(Decimal::new(123, 2), &cancel).await;
//!     println!("Payment: {response}");
//!
//!     client.log_off(&cancel).await;
//!     client.close().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
mod session;

// Re-exports
pub use client::{ClientEvents, ZvtClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use events::{EventHandlers, HandlerId};

// Re-export protocol and data types
pub use zvtlink_core::{commands, control, Package};
pub use zvtlink_transport::{SendOutcome, TcpTransport, Transport, DEFAULT_PORT};
pub use zvtlink_types::{
    CommandResponse, CommandState, Language, PrintLine, Receipt, RegistrationConfig,
    StatusInformation, TextEncoding,
};
