use rn42_transport::TransportError;
use thiserror::Error;

/// Errors from the radio driver.
#[derive(Debug, Error)]
pub enum RadioError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The module answered a command with something other than the
    /// expected acknowledgment.
    #[error("command '{command}' not acknowledged (got '{response}')")]
    NotAcknowledged { command: String, response: String },

    /// The key byte has no scan code mapping.
    #[error("no scan code for key 0x{key:02X}")]
    UnsupportedKey { key: u8 },

    /// All six report slots are occupied.
    #[error("rollover buffer full, key dropped")]
    RolloverFull,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// `C` was requested but the module has no stored remote address.
    #[error("no remote address stored, pair the module first")]
    NoRemoteAddress,

    /// Bring-up was cancelled from outside.
    #[error("operation cancelled")]
    Cancelled,
}
