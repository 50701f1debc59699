//! Print data delivered by the terminal
//!
//! Terminals print through the ECR in two shapes: single `06 D1` lines
//! with an attribute byte, or whole `06 D3` text blocks when TLV support
//! was negotiated at registration.

use std::fmt;

/// One line of receipt text from a `06 D1` package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintLine {
    /// Line text, already decoded with the configured encoding
    pub text: String,

    /// Raw attribute byte without the last-line marker
    pub attribute: u8,

    /// Set when attribute bit 7 marks this as the final line
    pub last_line: bool,
}

/// Receipt classification from the leading byte of a `06 D3` package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptType {
    Merchant,
    Customer,
    Administration,
    Unknown(u8),
}

impl From<u8> for ReceiptType {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Merchant,
            0x02 => Self::Customer,
            0x03 => Self::Administration,
            other => Self::Unknown(other),
        }
    }
}

/// A complete receipt text block from a `06 D3` package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub receipt_type: ReceiptType,
    pub lines: Vec<String>,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}
