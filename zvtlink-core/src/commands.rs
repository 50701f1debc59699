//! Command payload encoders
//!
//! One function per merchant command, each producing a ready-to-send
//! [`Package`]. Byte layouts follow PA00P015 chapter 2; amounts, the
//! password and counters are packed BCD.

use bytes::{BufMut, BytesMut};
use rust_decimal::Decimal;
use zvtlink_types::RegistrationConfig;

use crate::bcd;
use crate::bits::with_bit;
use crate::control;
use crate::error::{Error, Result};
use crate::package::Package;
use crate::tlv::TlvWriter;

/// Largest password transmissible as three BCD bytes
pub const MAX_PASSWORD: u32 = 999_999;

/// Encode the registration config byte
///
/// Bit 7 is always set (ECR print type); bits 1-5 carry the behavior
/// flags, with suppress/disallow polarity on the wire.
pub fn config_byte(config: &RegistrationConfig) -> u8 {
    let mut byte = with_bit(0, 7, true);
    byte = with_bit(byte, 1, config.ecr_prints_payment_receipt);
    byte = with_bit(byte, 2, config.ecr_prints_admin_receipt);
    byte = with_bit(byte, 3, config.send_intermediate_status);
    byte = with_bit(byte, 4, !config.allow_payment_via_pt);
    byte = with_bit(byte, 5, !config.allow_admin_via_pt);
    byte
}

/// Registration (06 00)
///
/// Payload: password, config byte, currency code, `03` + service byte,
/// and optionally the TLV block permitting `06 D3` print text blocks.
pub fn registration(
    password: u32,
    config: &RegistrationConfig,
    permit_print_text_block: bool,
) -> Result<Package> {
    let mut payload = BytesMut::with_capacity(16);
    payload.put_slice(&password_bcd(password)?);
    payload.put_u8(config_byte(config));
    payload.put_slice(&bcd::int_to_bcd(config.currency_code as u64, 2)?);
    payload.put_u8(0x03);
    payload.put_u8(config.service_byte);

    if permit_print_text_block {
        let mut tlv = TlvWriter::new();
        tlv.container(0x26, |commands| {
            commands.field(0x0A, &control::PRINT_TEXT_BLOCK);
        });
        payload.put_slice(&tlv.finish_container(0x06));
    }

    Ok(Package::with_payload(
        control::REGISTRATION,
        payload.freeze(),
    ))
}

/// Authorization / payment (06 01)
pub fn payment(amount: Decimal) -> Result<Package> {
    let mut payload = BytesMut::with_capacity(7);
    payload.put_u8(0x04);
    payload.put_slice(&bcd::decimal_to_bcd(amount)?);
    Ok(Package::with_payload(
        control::AUTHORIZATION,
        payload.freeze(),
    ))
}

/// Reversal (06 30) of the transaction with the given receipt number
pub fn reversal(password: u32, receipt_number: u16) -> Result<Package> {
    let mut payload = BytesMut::with_capacity(6);
    payload.put_slice(&password_bcd(password)?);
    payload.put_u8(0x87);
    payload.put_slice(&bcd::int_to_bcd(receipt_number as u64, 2)?);
    Ok(Package::with_payload(control::REVERSAL, payload.freeze()))
}

/// Refund (06 31)
///
/// With a trace number the refund references the original transaction;
/// without one the `0B` group is omitted entirely.
pub fn refund(password: u32, amount: Decimal, trace_number: Option<u32>) -> Result<Package> {
    let mut payload = BytesMut::with_capacity(14);
    payload.put_slice(&password_bcd(password)?);
    payload.put_u8(0x04);
    payload.put_slice(&bcd::decimal_to_bcd(amount)?);
    if let Some(trace) = trace_number {
        payload.put_u8(0x0B);
        payload.put_slice(&bcd::int_to_bcd(trace as u64, 3)?);
    }
    Ok(Package::with_payload(control::REFUND, payload.freeze()))
}

/// End-of-day batch (06 50)
pub fn end_of_day(password: u32) -> Result<Package> {
    password_only(control::END_OF_DAY, password)
}

/// Send turnover totals (06 10)
pub fn turnover_totals(password: u32) -> Result<Package> {
    password_only(control::TURNOVER_TOTALS, password)
}

/// Repeat last receipt (06 20)
pub fn repeat_receipt(password: u32) -> Result<Package> {
    password_only(control::REPEAT_RECEIPT, password)
}

/// Log-off (06 02); fire-and-forget
pub fn log_off() -> Package {
    Package::new(control::LOG_OFF)
}

/// Abort the running command (06 B0); fire-and-forget
pub fn abort() -> Package {
    Package::new(control::ABORT_COMMAND)
}

/// Diagnosis (06 70)
pub fn diagnosis() -> Package {
    Package::new(control::DIAGNOSIS)
}

/// Software update (08 10)
pub fn software_update() -> Package {
    Package::new(control::SOFTWARE_UPDATE)
}

fn password_only(control_field: [u8; 2], password: u32) -> Result<Package> {
    let payload = password_bcd(password)?;
    Ok(Package::with_payload(control_field, payload.to_vec()))
}

fn password_bcd(password: u32) -> Result<[u8; 3]> {
    if password > MAX_PASSWORD {
        return Err(Error::InvalidPassword(password));
    }
    let encoded = bcd::int_to_bcd(password as u64, 3)?;
    let mut out = [0u8; 3];
    out.copy_from_slice(&encoded);
    Ok(out)
}
