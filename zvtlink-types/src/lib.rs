//! Type definitions for zvtlink
//!
//! Plain data structures shared by the protocol, transport and client
//! crates: command responses, transaction status records, print data and
//! the registration configuration.

pub mod config;
pub mod error;
pub mod print;
pub mod response;
pub mod status;

pub use config::{Language, RegistrationConfig, TextEncoding};
pub use error::{Error, Result};
pub use print::{PrintLine, Receipt, ReceiptType};
pub use response::{CommandResponse, CommandState};
pub use status::StatusInformation;
