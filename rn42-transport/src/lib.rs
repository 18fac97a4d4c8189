//! Transport abstraction layer for RN-42 Bluetooth radio communication
//!
//! This crate provides a byte-duplex serial interface the driver consumes,
//! plus the line-oriented response reader the module's AT dialect needs:
//!
//! - [`UartPort`] — a local serial device node (`/dev/ttyUSB0`, `COM3`, ...)
//! - [`MockPort`] — scripted in-memory port for tests
//! - [`LineReader`] — `\r\n`-terminated response capture with idle deadlines

pub mod error;
pub mod line_reader;
pub mod mock;
pub mod serial;

pub use error::TransportError;
pub use line_reader::{LineReader, ReceivedLine, DEFAULT_IDLE_TIMEOUT, MAX_LINE_LEN};
pub use mock::MockPort;
pub use serial::{UartPort, BAUD_RATE};

use async_trait::async_trait;
use std::sync::Arc;

/// The core transport trait - all backends implement this
///
/// The RN-42 is a plain byte pipe: command-mode traffic and HID report
/// frames travel over the same duplex channel. One driver instance owns
/// one port exclusively; nothing here is safe to share across concurrent
/// command flows.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write raw bytes to the module.
    async fn write_all(&self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read one pending byte.
    ///
    /// Returns `None` when nothing arrived within the backend's poll
    /// interval; callers layer their own deadlines on top.
    async fn read_byte(&self) -> Result<Option<u8>, TransportError>;

    /// Drop any unread input bytes.
    async fn discard_input(&self) -> Result<(), TransportError>;

    /// Identifier for log messages (device path or mock label).
    fn port_name(&self) -> &str;
}

/// Type alias for a boxed transport
pub type BoxedTransport = Arc<dyn Transport>;
