//! ZVT application package structure and encoding/decoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::error::{Error, Result};

/// ZVT application package
///
/// # Package Structure
///
/// ```text
/// ┌─────────────┬─────────────┬─────────────┬─────────────┐
/// │    CCRC     │    APRC     │   Length    │   Payload   │
/// │   1 byte    │   1 byte    │  1 byte *   │   N bytes   │
/// └─────────────┴─────────────┴─────────────┴─────────────┘
/// ```
///
/// `*` Payloads above 254 bytes use the length escape: `0xFF` followed by
/// a little-endian `u16`. The command set emitted by this crate never
/// exceeds the single-byte form, but inbound packages are accepted in
/// both.
///
/// # Examples
///
/// ```
/// use zvtlink_core::Package;
/// use zvtlink_core::control;
///
/// let package = Package::with_payload(control::AUTHORIZATION, vec![0x04]);
/// let encoded = package.encode().unwrap();
///
/// let decoded = Package::decode(&encoded).unwrap();
/// assert_eq!(package, decoded);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Package {
    /// Control field: command class (CCRC) and instruction (APRC)
    pub control_field: [u8; 2],

    /// Package payload (command-specific data)
    pub payload: Bytes,
}

impl Package {
    /// Smallest valid wire size: control field plus length byte
    pub const MIN_WIRE_SIZE: usize = 3;

    /// Create a new package with empty payload
    pub fn new(control_field: [u8; 2]) -> Self {
        Self {
            control_field,
            payload: Bytes::new(),
        }
    }

    /// Create a package with payload
    pub fn with_payload(control_field: [u8; 2], payload: impl Into<Bytes>) -> Self {
        Self {
            control_field,
            payload: payload.into(),
        }
    }

    /// Encode the package to its wire form
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the payload exceeds the
    /// two-byte length escape.
    pub fn encode(&self) -> Result<BytesMut> {
        let len = self.payload.len();
        if len > crate::MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: len,
                max: crate::MAX_PAYLOAD_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(Self::MIN_WIRE_SIZE + 2 + len);
        buf.put_slice(&self.control_field);

        if len <= crate::MAX_SHORT_PAYLOAD {
            buf.put_u8(len as u8);
        } else {
            buf.put_u8(0xFF);
            buf.put_u16_le(len as u16);
        }

        buf.put_slice(&self.payload);
        Ok(buf)
    }

    /// Decode a package from a complete wire buffer
    ///
    /// The link layer delivers whole application packages; this parser
    /// rejects anything shorter or longer than the declared length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShortFrame`] for buffers below the minimum wire
    /// size and [`Error::LengthMismatch`] when the declared length
    /// disagrees with the buffer.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < Self::MIN_WIRE_SIZE {
            return Err(Error::ShortFrame {
                expected: Self::MIN_WIRE_SIZE,
                actual: buf.len(),
            });
        }

        let control_field = [buf[0], buf[1]];

        let (declared, payload_start) = if buf[2] == 0xFF {
            if buf.len() < 5 {
                return Err(Error::ShortFrame {
                    expected: 5,
                    actual: buf.len(),
                });
            }
            (u16::from_le_bytes([buf[3], buf[4]]) as usize, 5)
        } else {
            (buf[2] as usize, 3)
        };

        let actual = buf.len() - payload_start;
        if declared != actual {
            return Err(Error::LengthMismatch { declared, actual });
        }

        Ok(Self {
            control_field,
            payload: Bytes::copy_from_slice(&buf[payload_start..]),
        })
    }

    /// Total wire size of this package
    pub fn wire_size(&self) -> usize {
        let len_field = if self.payload.len() <= crate::MAX_SHORT_PAYLOAD {
            1
        } else {
            3
        };
        2 + len_field + self.payload.len()
    }
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field(
                "control_field",
                &format!(
                    "{:02X} {:02X}",
                    self.control_field[0], self.control_field[1]
                ),
            )
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Package[{:02X} {:02X}](len={})",
            self.control_field[0],
            self.control_field[1],
            self.payload.len()
        )
    }
}
