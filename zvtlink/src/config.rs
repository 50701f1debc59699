//! Client configuration

use std::time::Duration;

use zvtlink_types::{Language, TextEncoding};

/// Configuration for a [`ZvtClient`](crate::ZvtClient)
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use zvtlink::ClientConfig;
///
/// let config = ClientConfig::new(123456)
///     .with_command_completion_timeout(Duration::from_secs(90))
///     .with_tlv_support(true);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Terminal password, at most six decimal digits
    pub password: u32,

    /// Bound on the wait for a terminal completion after the
    /// acknowledgement; re-armed on inbound activity
    pub command_completion_timeout: Duration,

    /// Bound on the wait for the link-level acknowledgement
    pub acknowledge_timeout: Duration,

    /// Encoding of text received from the terminal
    pub encoding: TextEncoding,

    /// Language of intermediate status messages; error texts stay
    /// English regardless
    pub language: Language,

    /// Announce `06 D3` print-text-block support at registration
    pub activate_tlv_support: bool,
}

impl ClientConfig {
    pub fn new(password: u32) -> Self {
        Self {
            password,
            command_completion_timeout: Duration::from_secs(300),
            acknowledge_timeout: Duration::from_secs(5),
            encoding: TextEncoding::default(),
            language: Language::default(),
            activate_tlv_support: false,
        }
    }

    pub fn with_command_completion_timeout(mut self, timeout: Duration) -> Self {
        self.command_completion_timeout = timeout;
        self
    }

    pub fn with_acknowledge_timeout(mut self, timeout: Duration) -> Self {
        self.acknowledge_timeout = timeout;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_tlv_support(mut self, activate: bool) -> Self {
        self.activate_tlv_support = activate;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
