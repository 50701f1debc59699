//! Reply decoding
//!
//! Classifies inbound packages by control field and parses each payload
//! into a typed [`ZvtMessage`]. StatusInformation payloads are a
//! sequence of BMP fields: fixed-width fields identified by their
//! leading byte, LL/LLL-variable fields with F-nibble lengths, and an
//! optional trailing TLV block.

use tracing::warn;
use zvtlink_types::{Language, PrintLine, Receipt, ReceiptType, StatusInformation, TextEncoding};

use crate::bcd;
use crate::bits;
use crate::catalog;
use crate::control::{self, InboundKind};
use crate::error::{Error, Result};
use crate::package::Package;
use crate::text::decode_text;
use crate::tlv;

/// One decoded inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZvtMessage {
    /// Transaction status record (04 0F)
    Status(StatusInformation),

    /// Intermediate status with resolved display text (04 FF)
    IntermediateStatus { code: u8, message: String },

    /// Single print line (06 D1)
    Line(PrintLine),

    /// Complete receipt block (06 D3)
    Receipt(Receipt),

    /// Successful termination, possibly with embedded status (06 0F)
    Completion(Option<StatusInformation>),

    /// Abort with resolved error text (06 1E)
    Abort { code: u8, message: String },

    /// Negative acknowledgement of the command itself (84 xx)
    NotSupported { code: u8 },
}

/// Stateless decoder configured with encoding and language
///
/// Immutable after construction; both settings apply for the lifetime
/// of the client.
#[derive(Debug, Clone, Copy)]
pub struct ReplyDecoder {
    encoding: TextEncoding,
    language: Language,
}

impl ReplyDecoder {
    pub fn new(encoding: TextEncoding, language: Language) -> Self {
        Self { encoding, language }
    }

    /// Decode one package into a typed message
    ///
    /// Returns `Ok(None)` for control fields outside the reply set
    /// (including the link-level acknowledge); callers log and drop
    /// those. A decode error also drops only the offending frame.
    pub fn decode(&self, package: &Package) -> Result<Option<ZvtMessage>> {
        let Some(kind) = control::classify(package.control_field) else {
            return Ok(None);
        };

        let payload = &package.payload;
        let message = match kind {
            InboundKind::StatusInformation => {
                ZvtMessage::Status(self.status_information(payload)?)
            }
            InboundKind::IntermediateStatus => self.intermediate_status(payload)?,
            InboundKind::PrintLine => self.print_line(payload)?,
            InboundKind::PrintTextBlock => self.print_text_block(payload)?,
            InboundKind::Completion => ZvtMessage::Completion(self.completion_status(payload)),
            InboundKind::Abort => self.abort(payload)?,
            InboundKind::NotSupported => ZvtMessage::NotSupported {
                code: package.control_field[1],
            },
            InboundKind::Acknowledge => return Ok(None),
        };

        Ok(Some(message))
    }

    // A completion whose payload does not parse as status fields still
    // terminates the command; the malformed payload only costs the
    // status event.
    fn completion_status(&self, payload: &[u8]) -> Option<StatusInformation> {
        if payload.is_empty() {
            return None;
        }
        match self.status_information(payload) {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("Ignoring unparseable completion payload: {e}");
                None
            }
        }
    }

    fn status_information(&self, payload: &[u8]) -> Result<StatusInformation> {
        let mut status = StatusInformation::default();
        let mut i = 0;

        while i < payload.len() {
            let tag = payload[i];
            i += 1;

            match tag {
                0x04 => {
                    let raw = field(payload, &mut i, 6, "amount")?;
                    status.amount = Some(bcd::bcd_to_decimal(raw)?);
                }
                0x0B => {
                    let raw = field(payload, &mut i, 3, "trace number")?;
                    status.trace_number = Some(bcd::bcd_to_int(raw)? as u32);
                }
                0x0C => {
                    let raw = field(payload, &mut i, 3, "time")?;
                    status.time = Some(bcd::bcd_to_digits(raw)?);
                }
                0x0D => {
                    let raw = field(payload, &mut i, 2, "date")?;
                    status.date = Some(bcd::bcd_to_digits(raw)?);
                }
                0x0E => {
                    let raw = field(payload, &mut i, 2, "expiry date")?;
                    status.expiry_date = Some(bcd::bcd_to_digits(raw)?);
                }
                0x17 => {
                    let raw = field(payload, &mut i, 2, "receipt number")?;
                    status.receipt_number = Some(bcd::bcd_to_int(raw)? as u16);
                }
                0x19 => {
                    let code = field(payload, &mut i, 1, "card type")?[0];
                    status.card_type = Some(code);
                    status.card_name = catalog::card_name(code).map(str::to_owned);
                }
                0x22 => {
                    let raw = ll_var(payload, &mut i, "card number")?;
                    status.card_number = Some(masked_pan(raw));
                }
                0x27 => {
                    let code = field(payload, &mut i, 1, "result code")?[0];
                    status.result_code = Some(code);
                    if code != 0 {
                        status.error_message = Some(self.error_message(code));
                    }
                }
                0x29 => {
                    let raw = field(payload, &mut i, 4, "terminal id")?;
                    status.terminal_id = Some(bcd::bcd_to_digits(raw)?);
                }
                0x3B => {
                    let raw = field(payload, &mut i, 8, "AID")?;
                    let text = decode_text(raw, self.encoding);
                    status.aid = Some(text.trim_end_matches([' ', '\0']).to_owned());
                }
                0x60 => {
                    let raw = lll_var(payload, &mut i, "multi reference")?;
                    status.multi_reference = Some(raw.to_vec());
                }
                0x06 => {
                    // Trailing TLV block, skipped by its own length
                    let (len, consumed) = tlv::read_length(&payload[i..])?;
                    i += consumed;
                    let raw = field(payload, &mut i, len, "TLV block")?;
                    status.tlv_data = Some(raw.to_vec());
                }
                other => skip_unknown_bmp(payload, &mut i, other)?,
            }
        }

        Ok(status)
    }

    fn intermediate_status(&self, payload: &[u8]) -> Result<ZvtMessage> {
        let code = *payload
            .first()
            .ok_or(Error::EmptyPayload(0x04, 0xFF))?;

        // Trailing bytes (timeout hint, optional text TLV) are tolerated;
        // the catalog text is authoritative.
        let message = match catalog::intermediate_status_text(code, self.language) {
            Some(text) => text.to_owned(),
            None => match self.language {
                Language::English => format!("Unknown status code 0x{code:02X}"),
                Language::German => format!("Unbekannter Statuscode 0x{code:02X}"),
            },
        };

        Ok(ZvtMessage::IntermediateStatus { code, message })
    }

    fn print_line(&self, payload: &[u8]) -> Result<ZvtMessage> {
        let attribute = *payload
            .first()
            .ok_or(Error::EmptyPayload(0x06, 0xD1))?;

        Ok(ZvtMessage::Line(PrintLine {
            text: decode_text(&payload[1..], self.encoding),
            attribute: attribute & 0x7F,
            last_line: bits::is_set(attribute, 7),
        }))
    }

    fn print_text_block(&self, payload: &[u8]) -> Result<ZvtMessage> {
        let receipt_type = ReceiptType::from(
            *payload
                .first()
                .ok_or(Error::EmptyPayload(0x06, 0xD3))?,
        );

        let mut lines = Vec::new();
        let mut i = 1;
        while i < payload.len() {
            let (tag, consumed) = tlv::read_tag(&payload[i..])?;
            i += consumed;
            let (len, consumed) = tlv::read_length(&payload[i..])?;
            i += consumed;
            let value = field(payload, &mut i, len, "receipt line")?;
            if tag == 0x07 {
                lines.push(decode_text(value, self.encoding));
            }
        }

        Ok(ZvtMessage::Receipt(Receipt {
            receipt_type,
            lines,
        }))
    }

    fn abort(&self, payload: &[u8]) -> Result<ZvtMessage> {
        let code = *payload
            .first()
            .ok_or(Error::EmptyPayload(0x06, 0x1E))?;
        Ok(ZvtMessage::Abort {
            code,
            message: self.error_message(code),
        })
    }

    fn error_message(&self, code: u8) -> String {
        match catalog::error_text(code) {
            Some(text) => text.to_owned(),
            None => format!("Unknown error code 0x{code:02X}"),
        }
    }
}

/// Take a fixed-width field, advancing the cursor
fn field<'a>(
    payload: &'a [u8],
    i: &mut usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8]> {
    let end = i
        .checked_add(len)
        .filter(|&end| end <= payload.len())
        .ok_or(Error::TruncatedField { field: name })?;
    let raw = &payload[*i..end];
    *i = end;
    Ok(raw)
}

/// Take an LL-Var field: two `Fx` length nibble bytes, then that many bytes
fn ll_var<'a>(payload: &'a [u8], i: &mut usize, name: &'static str) -> Result<&'a [u8]> {
    let header = field(payload, i, 2, name)?;
    let len = (header[0] & 0x0F) as usize * 10 + (header[1] & 0x0F) as usize;
    field(payload, i, len, name)
}

/// Take an LLL-Var field: three `Fx` length nibble bytes
fn lll_var<'a>(payload: &'a [u8], i: &mut usize, name: &'static str) -> Result<&'a [u8]> {
    let header = field(payload, i, 3, name)?;
    let len = (header[0] & 0x0F) as usize * 100
        + (header[1] & 0x0F) as usize * 10
        + (header[2] & 0x0F) as usize;
    field(payload, i, len, name)
}

/// Decode a BCD PAN; masked nibbles (above 9) become `*`
fn masked_pan(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len() * 2);
    for &b in raw {
        for nibble in [b >> 4, b & 0x0F] {
            if nibble <= 9 {
                out.push(char::from(b'0' + nibble));
            } else {
                out.push('*');
            }
        }
    }
    out
}

// Widths of BMP fields the client skips rather than interprets. Tags
// handled above never reach this table.
fn skip_unknown_bmp(payload: &[u8], i: &mut usize, tag: u8) -> Result<()> {
    let fixed = match tag {
        0x01 | 0x02 | 0x03 | 0x05 | 0x8A | 0x8C | 0xA0 | 0xD0 => 1,
        0x49 | 0x87 => 2,
        0x37 | 0x3D | 0x88 | 0xAA => 3,
        0xBA => 5,
        0x2A => 15,
        0x23 | 0x8B | 0xA7 | 0xD1 | 0xD2 => {
            ll_var(payload, i, "skipped field")?;
            return Ok(());
        }
        0x24 | 0x3C | 0x9A | 0xAF => {
            lll_var(payload, i, "skipped field")?;
            return Ok(());
        }
        _ => return Err(Error::UnknownBmp(tag)),
    };
    field(payload, i, fixed, "skipped field")?;
    Ok(())
}
