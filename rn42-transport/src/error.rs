//! Transport error types

use thiserror::Error;

/// Errors that can occur on the serial link
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Port not found: {0}")]
    PortNotFound(String),

    #[error("Port disconnected")]
    Disconnected,

    #[error("Communication timeout")]
    Timeout,

    #[error("Response exceeded {limit} bytes without a line terminator")]
    ResponseTooLong { limit: usize },

    #[error("Serial permission denied: {0}")]
    PermissionDenied(String),

    #[error("Serial I/O error: {0}")]
    Io(String),
}

impl From<serialport::Error> for TransportError {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::NoDevice => TransportError::Disconnected,
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                TransportError::PermissionDenied(e.to_string())
            }
            _ => TransportError::Io(e.to_string()),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => TransportError::PermissionDenied(e.to_string()),
            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::NotConnected => {
                TransportError::Disconnected
            }
            _ => TransportError::Io(e.to_string()),
        }
    }
}
