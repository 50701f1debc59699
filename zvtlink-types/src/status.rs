//! Transaction status records
//!
//! A `04 0F` StatusInformation package carries a variable set of BMP
//! fields describing the transaction. Every field is optional; the
//! terminal only sends what applies to the command at hand.

use std::fmt;

use rust_decimal::Decimal;

/// Structured transaction result from a StatusInformation package
///
/// Digit-string fields keep the wire layout: `time` is `HHMMSS`,
/// `date` is `MMDD` (the terminal transmits no year), `expiry_date`
/// is `YYMM`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusInformation {
    /// Transaction amount in major units with two fraction digits
    pub amount: Option<Decimal>,

    /// Trace number assigned by the terminal
    pub trace_number: Option<u32>,

    /// Transaction time, `HHMMSS`
    pub time: Option<String>,

    /// Transaction date, `MMDD`
    pub date: Option<String>,

    /// Card expiry, `YYMM`
    pub expiry_date: Option<String>,

    /// Receipt number
    pub receipt_number: Option<u16>,

    /// Card type code
    pub card_type: Option<u8>,

    /// Card scheme name resolved from the card type code
    pub card_name: Option<String>,

    /// Masked primary account number; masked digits appear as `*`
    pub card_number: Option<String>,

    /// Result code, `0x00` on success
    pub result_code: Option<u8>,

    /// Resolved error text for a non-zero result code
    pub error_message: Option<String>,

    /// Terminal identifier (eight digits)
    pub terminal_id: Option<String>,

    /// Authorisation attribute / AID
    pub aid: Option<String>,

    /// Raw multi-reference data (BMP 60), unparsed
    pub multi_reference: Option<Vec<u8>>,

    /// Raw trailing TLV block, unparsed
    pub tlv_data: Option<Vec<u8>>,
}

impl StatusInformation {
    /// Check if the terminal reported the transaction as successful
    pub fn is_successful(&self) -> bool {
        matches!(self.result_code, None | Some(0))
    }
}

impl fmt::Display for StatusInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status[result={:?}", self.result_code)?;
        if let Some(amount) = &self.amount {
            write!(f, ", amount={amount}")?;
        }
        if let Some(trace) = self.trace_number {
            write!(f, ", trace={trace}")?;
        }
        if let Some(receipt) = self.receipt_number {
            write!(f, ", receipt={receipt}")?;
        }
        write!(f, "]")
    }
}
