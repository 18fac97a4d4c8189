//! Command-mode session over a transport.
//!
//! Tracks which of the module's modes the UART is currently talking to.
//! The tracked state is the driver's best knowledge, not ground truth;
//! [`Session::reset_to_known_state`] exists to force agreement when the
//! module's actual mode is unknown, such as right after host start.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use rn42_transport::{LineReader, ReceivedLine, Transport, TransportError};

use crate::error::RadioError;
use crate::protocol::{ack, cmd, timing, REMOTE_ADDR_LEN};

/// Where the module is believed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleState {
    /// No assumption can be made, e.g. before first contact.
    #[default]
    Unknown,
    /// Data mode with no active Bluetooth connection.
    Disconnected,
    /// AT command mode.
    CommandMode,
    /// Data mode with an active connection; bytes written are HID
    /// frames, not commands.
    Connected,
}

/// A command session bound to one serial port.
pub struct Session {
    port: Arc<dyn Transport>,
    reader: LineReader,
    state: ModuleState,
}

impl Session {
    pub fn new(port: Arc<dyn Transport>) -> Self {
        Self {
            port,
            reader: LineReader::new(Duration::from_millis(timing::RESPONSE_IDLE_MS)),
            state: ModuleState::Unknown,
        }
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    pub fn port(&self) -> &Arc<dyn Transport> {
        &self.port
    }

    pub(crate) async fn read_line(&self) -> Result<ReceivedLine, TransportError> {
        self.reader.read_line(self.port.as_ref()).await
    }

    /// Write one command line, `\r`-terminated.
    pub(crate) async fn write_command(&self, command: &str) -> Result<(), TransportError> {
        let mut line = Vec::with_capacity(command.len() + 1);
        line.extend_from_slice(command.as_bytes());
        line.push(b'\r');
        self.port.write_all(&line).await
    }

    /// Drive the module to the disconnected data-mode state regardless
    /// of where it currently is.
    ///
    /// A NUL dropped into data mode severs any active connection and is
    /// harmless in command mode. The wake loop then probes with the
    /// `$$$` escape until the module answers anything at all, after
    /// which one exit sequence lands it back in data mode.
    pub async fn reset_to_known_state(&mut self) -> Result<(), RadioError> {
        debug!(port = self.port.port_name(), "resetting module state");
        self.port.write_all(&[cmd::DISCONNECT]).await?;
        sleep(Duration::from_millis(timing::DISCONNECT_SETTLE_MS)).await;
        self.port.discard_input().await?;

        let mut awake = false;
        for attempt in 0..timing::RESET_TRIGGER_ATTEMPTS {
            self.port.write_all(cmd::ENTER_COMMAND).await?;
            self.port.write_all(b"\r").await?;
            sleep(Duration::from_millis(timing::RESET_POLL_MS)).await;
            if self.port.read_byte().await?.is_some() {
                debug!(attempt, "module answered wake probe");
                awake = true;
                break;
            }
        }
        if !awake {
            return Err(TransportError::Timeout.into());
        }

        self.port.discard_input().await?;
        self.state = ModuleState::CommandMode;
        self.exit_command_mode().await?;
        Ok(())
    }

    /// Send the `$$$` escape and confirm the module entered command
    /// mode.
    ///
    /// Two replies count as success: `CMD`, and a line starting with
    /// `?`, which is the module's syntax-error prompt and means it was
    /// already in command mode (a stray `$$$` in command mode is an
    /// unknown command).
    pub async fn enter_command_mode(&mut self) -> Result<(), RadioError> {
        self.port.discard_input().await?;
        self.port.write_all(cmd::ENTER_COMMAND).await?;
        self.port.write_all(b"\r").await?;

        let line = self.read_line().await?;
        if line.matches(ack::CMD) || line.first() == Some(ack::ALREADY_IN_COMMAND) {
            debug!("command mode entered");
            self.state = ModuleState::CommandMode;
            Ok(())
        } else {
            Err(RadioError::NotAcknowledged {
                command: "$$$".into(),
                response: line.as_text(),
            })
        }
    }

    /// Leave command mode. Safe to call in any state; in data mode the
    /// `---` bytes are swallowed by whatever is on the other end.
    pub async fn exit_command_mode(&mut self) -> Result<(), RadioError> {
        self.write_command(cmd::EXIT_COMMAND).await?;
        sleep(Duration::from_millis(timing::EXIT_SETTLE_MS)).await;
        self.state = ModuleState::Disconnected;
        Ok(())
    }

    /// Connect to the stored remote address.
    ///
    /// Verifies an address is actually stored first; issuing a bare `C`
    /// with nothing stored leaves the module wedged in a connect
    /// attempt that never resolves.
    pub async fn connect(&mut self) -> Result<(), RadioError> {
        self.require_command_mode()?;
        self.port.discard_input().await?;
        self.write_command(cmd::GET_REMOTE_ADDR).await?;
        let line = self.read_line().await?;

        if line.is_empty() && !line.is_complete() {
            return Err(TransportError::Timeout.into());
        }
        if line.matches(ack::NO_REMOTE_ADDR) {
            warn!("no remote address stored, leaving command mode");
            self.exit_command_mode().await?;
            return Err(RadioError::NoRemoteAddress);
        }

        info!(address = %line.as_text(), "connecting to stored remote");
        self.write_command(cmd::CONNECT).await?;
        self.state = ModuleState::Connected;
        Ok(())
    }

    /// Connect to an explicit remote address (eight hex digits, the
    /// low half of the full Bluetooth address).
    pub async fn connect_to(&mut self, address: &str) -> Result<(), RadioError> {
        if address.len() != REMOTE_ADDR_LEN || !address.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RadioError::InvalidParameter(format!(
                "remote address must be {REMOTE_ADDR_LEN} hex digits, got '{address}'"
            )));
        }
        self.require_command_mode()?;
        info!(address, "connecting to explicit remote");
        self.write_command(&format!("{}{address}", cmd::CONNECT_TO))
            .await?;
        self.state = ModuleState::Connected;
        Ok(())
    }

    /// Reboot the module so stored settings take effect. On success the
    /// state is [`ModuleState::Unknown`] until the next reset.
    pub async fn reboot(&mut self) -> Result<(), RadioError> {
        self.require_command_mode()?;
        self.port.discard_input().await?;
        self.write_command(cmd::REBOOT).await?;
        let line = self.read_line().await?;
        if !line.matches(ack::REBOOT) {
            return Err(RadioError::NotAcknowledged {
                command: cmd::REBOOT.into(),
                response: line.as_text(),
            });
        }
        info!("module rebooting");
        sleep(Duration::from_millis(timing::REBOOT_SETTLE_MS)).await;
        self.state = ModuleState::Unknown;
        Ok(())
    }

    fn require_command_mode(&self) -> Result<(), RadioError> {
        if self.state == ModuleState::CommandMode {
            Ok(())
        } else {
            Err(RadioError::InvalidParameter(format!(
                "not in command mode (state {:?})",
                self.state
            )))
        }
    }
}
