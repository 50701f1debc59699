//! # zvtlink-core
//!
//! Core protocol implementation for ZVT payment terminals (PA00P015/016,
//! revision 13.09).
//!
//! This crate provides the low-level protocol primitives:
//! - Package structure and encoding/decoding
//! - Packed-BCD codec for amounts and counters
//! - TLV containers
//! - Command payload encoders
//! - Reply decoding into typed messages
//! - Error, status and card-name catalogs

pub mod bcd;
pub mod bits;
pub mod catalog;
pub mod commands;
pub mod control;
pub mod decode;
pub mod error;
pub mod package;
pub mod text;
pub mod tlv;

pub use decode::{ReplyDecoder, ZvtMessage};
pub use error::{Error, Result};
pub use package::Package;
pub use tlv::TlvWriter;

/// Protocol revision implemented by this crate
pub const PROTOCOL_REVISION: &str = "13.09";

/// Largest payload expressible with the two-byte length escape
pub const MAX_PAYLOAD_SIZE: usize = 65535;

/// Largest payload expressible with a single length byte
pub const MAX_SHORT_PAYLOAD: usize = 254;
