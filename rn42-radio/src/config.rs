//! Verified configuration setters and settings readback.
//!
//! Every setter writes its `S` command, waits out the module's command
//! processing delay, then reads the reply and reports whether `AOK`
//! came back. A `false` return means the module answered with something
//! else; callers decide whether that is fatal.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use rn42_transport::{ReceivedLine, TransportError};

use crate::error::RadioError;
use crate::protocol::{ack, cmd, profile, timing, ConnectMode, NAME_MAX_LEN};
use crate::session::Session;

impl Session {
    /// Write a set command and check its acknowledgment.
    async fn apply(&self, prefix: &str, value: &str) -> Result<bool, TransportError> {
        let command = format!("{prefix}{value}");
        self.port().discard_input().await?;
        self.write_command(&command).await?;
        sleep(Duration::from_millis(timing::COMMAND_DELAY_MS)).await;

        let line = self.read_line().await?;
        let ok = line.matches(ack::OK);
        if ok {
            debug!(command, "setting stored");
        } else {
            warn!(command, response = %line.as_text(), "setting not acknowledged");
        }
        Ok(ok)
    }

    /// Run a `G` query and hand back the raw response line.
    async fn query(&self, command: &str) -> Result<ReceivedLine, TransportError> {
        self.port().discard_input().await?;
        self.write_command(command).await?;
        self.read_line().await
    }

    /// `SA` authentication toggle.
    pub async fn set_authentication(&self, enabled: bool) -> Result<bool, RadioError> {
        let value = if enabled { "1" } else { "0" };
        Ok(self.apply(cmd::SET_AUTH, value).await?)
    }

    /// `SN` friendly device name. Truncated at the first `\r` and to
    /// the module's fifteen-character limit.
    pub async fn set_device_name(&self, name: &str) -> Result<bool, RadioError> {
        let bounded: String = name
            .chars()
            .take_while(|&c| c != '\r')
            .take(NAME_MAX_LEN)
            .collect();
        if bounded.is_empty() {
            return Err(RadioError::InvalidParameter("empty device name".into()));
        }
        Ok(self.apply(cmd::SET_NAME, &bounded).await?)
    }

    /// `SW` sleep/sniff register, four hex digits.
    pub async fn set_sleep_mode(&self, code: &str) -> Result<bool, RadioError> {
        if code.len() != 4 || !code.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RadioError::InvalidParameter(format!(
                "sleep code must be 4 hex digits, got '{code}'"
            )));
        }
        Ok(self.apply(cmd::SET_SLEEP, code).await?)
    }

    /// `SQ` special configuration register.
    pub async fn set_special_config(&self, value: u16) -> Result<bool, RadioError> {
        Ok(self.apply(cmd::SET_SPECIAL, &value.to_string()).await?)
    }

    /// `SM` connection mode.
    pub async fn set_connect_mode(&self, mode: ConnectMode) -> Result<bool, RadioError> {
        Ok(self
            .apply(cmd::SET_CONNECT_MODE, &mode.wire_value().to_string())
            .await?)
    }

    /// `ST` configuration timer, seconds of remote configurability
    /// after boot (255 keeps it open forever).
    pub async fn set_config_timer(&self, seconds: u8) -> Result<bool, RadioError> {
        Ok(self
            .apply(cmd::SET_CONFIG_TIMER, &seconds.to_string())
            .await?)
    }

    /// `SH` flag register selecting combined keyboard and mouse
    /// reports.
    pub async fn set_keyboard_mouse_mode(&self) -> Result<bool, RadioError> {
        Ok(self
            .apply(cmd::SET_HID_FLAGS, profile::KEYBOARD_MOUSE)
            .await?)
    }

    /// `S~` profile select, verified by readback. The stored profile
    /// gates whether bring-up needs a reboot, so an unverified write
    /// here is worse than a failed one.
    pub async fn set_hid_profile(&self) -> Result<bool, RadioError> {
        if !self.apply(cmd::SET_PROFILE, profile::HID).await? {
            return Ok(false);
        }
        self.hid_profile_active().await
    }

    /// Whether the stored profile is already HID.
    pub async fn hid_profile_active(&self) -> Result<bool, RadioError> {
        let line = self.query(cmd::GET_PROFILE).await?;
        Ok(line.matches(ack::HID_PROFILE))
    }

    pub async fn get_device_name(&self) -> Result<String, RadioError> {
        Ok(self.query(cmd::GET_NAME).await?.as_text())
    }

    pub async fn get_authentication(&self) -> Result<String, RadioError> {
        Ok(self.query(cmd::GET_AUTH).await?.as_text())
    }

    pub async fn get_sleep_mode(&self) -> Result<String, RadioError> {
        Ok(self.query(cmd::GET_SLEEP).await?.as_text())
    }

    pub async fn get_special_config(&self) -> Result<String, RadioError> {
        Ok(self.query(cmd::GET_SPECIAL).await?.as_text())
    }

    pub async fn get_connect_mode(&self) -> Result<String, RadioError> {
        Ok(self.query(cmd::GET_CONNECT_MODE).await?.as_text())
    }

    pub async fn get_hid_flags(&self) -> Result<String, RadioError> {
        Ok(self.query(cmd::GET_HID_FLAGS).await?.as_text())
    }
}
