//! Registration configuration and client-wide enums

use std::str::FromStr;

use crate::error::Error;

/// Behavior flags sent to the terminal with the Registration command
///
/// The flags map onto single bits of the registration config byte; the
/// encoding itself lives in the protocol crate. Defaults follow common
/// ECR practice: the ECR prints payment receipts, everything else stays
/// with the terminal.
///
/// # Examples
///
/// ```
/// use zvtlink_types::RegistrationConfig;
///
/// let config = RegistrationConfig {
///     send_intermediate_status: true,
///     ..Default::default()
/// };
/// assert_eq!(config.currency_code, 978);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// The ECR takes over printing of payment receipts (suppresses the
    /// terminal printout)
    pub ecr_prints_payment_receipt: bool,

    /// The ECR takes over printing of administration receipts
    pub ecr_prints_admin_receipt: bool,

    /// Ask the terminal to send intermediate status packages
    pub send_intermediate_status: bool,

    /// Allow payments to be started at the terminal itself
    pub allow_payment_via_pt: bool,

    /// Allow administration functions at the terminal itself
    pub allow_admin_via_pt: bool,

    /// Service byte appended after the currency code
    pub service_byte: u8,

    /// ISO 4217 numeric currency code, default 978 (EUR)
    pub currency_code: u16,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            ecr_prints_payment_receipt: true,
            ecr_prints_admin_receipt: false,
            send_intermediate_status: false,
            allow_payment_via_pt: true,
            allow_admin_via_pt: true,
            service_byte: 0x00,
            currency_code: 978,
        }
    }
}

/// Character encoding used for text fields received from the terminal
///
/// Fixed at client construction; terminals in the field ship with the
/// OEM code page unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    Utf8,
    Iso8859_1,
    Iso8859_2,
    Iso8859_15,
    #[default]
    CodePage437,
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "latin1" => Ok(Self::Iso8859_1),
            "iso-8859-2" | "latin2" => Ok(Self::Iso8859_2),
            "iso-8859-15" | "latin9" => Ok(Self::Iso8859_15),
            "cp437" | "ibm437" => Ok(Self::CodePage437),
            other => Err(Error::Parse(format!("Unknown text encoding: {other}"))),
        }
    }
}

/// Language for intermediate status messages
///
/// Error texts are English-only; a non-English language selects the
/// localized status catalog and falls back to English elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    German,
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "de" | "german" | "deutsch" => Ok(Self::German),
            other => Err(Error::Parse(format!("Unknown language: {other}"))),
        }
    }
}
