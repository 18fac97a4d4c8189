//! Driver for the RN-42 serial Bluetooth HID radio.
//!
//! The module is configured through a line-oriented AT command dialect
//! entered with `$$$` and left with `---`; once configured for the HID
//! profile it accepts raw keyboard and mouse report frames on the same
//! UART. This crate layers a state-tracked command [`Session`] over a
//! [`rn42_transport::Transport`], verified configuration setters on top
//! of the session, a rollover-buffered HID report encoder, and a
//! bring-up sequencer that only reboots the module when the stored
//! profile actually changed.

pub mod config;
pub mod error;
pub mod init;
pub mod protocol;
pub mod report;
pub mod scancode;
pub mod session;

pub use error::RadioError;
pub use init::{CancelFlag, InitOptions, InitSequencer, SetupReport};
pub use protocol::ConnectMode;
pub use report::HidReportEncoder;
pub use session::{ModuleState, Session};
