//! Error types for zvtlink-core

use rust_decimal::Decimal;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Integer does not fit in the requested BCD width
    #[error("Value {value} does not fit in {width} BCD bytes")]
    Overflow { value: u64, width: usize },

    /// Amount is negative or exceeds twelve decimal digits of minor units
    #[error("Amount out of range for BCD encoding: {0}")]
    OutOfRange(Decimal),

    /// A nibble above 9 appeared in BCD data
    #[error("Invalid BCD digit in byte 0x{byte:02X}")]
    InvalidDigit { byte: u8 },

    /// BCD field wider than the integer codec supports
    #[error("BCD field too long: {len} bytes")]
    BcdTooLong { len: usize },

    /// Frame shorter than control field plus length byte
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    ShortFrame { expected: usize, actual: usize },

    /// Declared package length disagrees with the buffer
    #[error("Length mismatch: declared {declared} bytes, buffer holds {actual} bytes")]
    LengthMismatch { declared: usize, actual: usize },

    /// Payload exceeds the two-byte length escape
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    /// Password has more than six decimal digits
    #[error("Invalid password: {0} (at most six decimal digits)")]
    InvalidPassword(u32),

    /// A BMP field ran past the end of the payload
    #[error("Truncated {field} field in status information")]
    TruncatedField { field: &'static str },

    /// A BMP tag missing from the length table; the frame cannot be walked further
    #[error("Unknown BMP tag 0x{0:02X}")]
    UnknownBmp(u8),

    /// Malformed TLV tag or length
    #[error("Invalid TLV structure: {0}")]
    InvalidTlv(&'static str),

    /// Payload too short for the message it claims to be
    #[error("Empty payload for control field {0:02X} {1:02X}")]
    EmptyPayload(u8, u8),
}
