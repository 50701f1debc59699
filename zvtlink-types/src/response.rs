//! Command response types
//!
//! Every command issued through the client resolves to a [`CommandResponse`]
//! describing how the exchange terminated: a completion from the terminal,
//! an abort with an error message, a timeout, or a local failure.

use std::fmt;

/// Terminal state of a single logical command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandState {
    /// No terminating event was observed
    #[default]
    Unknown,

    /// The terminal reported completion
    Successful,

    /// The terminal aborted the command
    Abort,

    /// The terminal does not support the command
    NotSupported,

    /// No terminating event arrived within the completion timeout
    Timeout,

    /// Local failure (transport, encoding, cancellation, busy)
    Error,
}

/// Outcome of one command exchange
///
/// # Examples
///
/// ```
/// use zvtlink_types::{CommandResponse, CommandState};
///
/// let response = CommandResponse::abort("Card not readable");
/// assert_eq!(response.state, CommandState::Abort);
/// assert!(!response.is_successful());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// How the command terminated
    pub state: CommandState,

    /// Error description for `Abort` and `Error` states
    pub error_message: Option<String>,
}

impl CommandResponse {
    pub fn successful() -> Self {
        Self {
            state: CommandState::Successful,
            error_message: None,
        }
    }

    pub fn abort(message: impl Into<String>) -> Self {
        Self {
            state: CommandState::Abort,
            error_message: Some(message.into()),
        }
    }

    pub fn not_supported() -> Self {
        Self {
            state: CommandState::NotSupported,
            error_message: None,
        }
    }

    pub fn timeout() -> Self {
        Self {
            state: CommandState::Timeout,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            state: CommandState::Error,
            error_message: Some(message.into()),
        }
    }

    /// Check if the command completed successfully
    pub fn is_successful(&self) -> bool {
        self.state == CommandState::Successful
    }
}

impl Default for CommandResponse {
    fn default() -> Self {
        Self {
            state: CommandState::Unknown,
            error_message: None,
        }
    }
}

impl fmt::Display for CommandResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_message {
            Some(msg) => write!(f, "{:?}: {}", self.state, msg),
            None => write!(f, "{:?}", self.state),
        }
    }
}
