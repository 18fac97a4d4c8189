//! Module bring-up.
//!
//! Forces the module into a known state, enters command mode with
//! retries, stores the HID configuration, and reboots only when the
//! stored profile actually changed. Individual setting rejections are
//! logged and collected rather than aborting bring-up; transport
//! faults abort immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::RadioError;
use crate::protocol::{timing, ConnectMode};
use crate::session::Session;

/// Cooperative cancellation handle, shared with a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Settings stored during bring-up.
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub name: String,
    pub authentication: bool,
    pub connect_mode: ConnectMode,
    /// `SW` sniff register, four hex digits.
    pub sleep_code: String,
    /// `SQ` special configuration register.
    pub special_config: u16,
    /// `ST` seconds of post-boot remote configurability.
    pub config_timer: u8,
    pub cancel: CancelFlag,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            name: "RN42-HID".into(),
            authentication: true,
            connect_mode: ConnectMode::AutoConnectDtr,
            sleep_code: "80A0".into(),
            special_config: 16,
            config_timer: 255,
            cancel: CancelFlag::new(),
        }
    }
}

/// Which settings the module acknowledged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetupReport {
    pub authentication: bool,
    pub name: bool,
    pub connect_mode: bool,
    pub sleep_mode: bool,
    pub special_config: bool,
    pub config_timer: bool,
    pub hid_flags: bool,
    pub profile: bool,
    /// Whether the profile changed and forced a reboot.
    pub rebooted: bool,
}

impl SetupReport {
    pub fn all_ok(&self) -> bool {
        self.authentication
            && self.name
            && self.connect_mode
            && self.sleep_mode
            && self.special_config
            && self.config_timer
            && self.hid_flags
            && self.profile
    }
}

/// Runs the bring-up sequence against a session.
pub struct InitSequencer {
    options: InitOptions,
}

impl InitSequencer {
    pub fn new(options: InitOptions) -> Self {
        Self { options }
    }

    /// Reset, enter command mode, store settings, and reboot if the
    /// profile changed. Leaves the session in command mode unless a
    /// reboot ran.
    pub async fn run(&self, session: &mut Session) -> Result<SetupReport, RadioError> {
        info!(name = %self.options.name, "starting module bring-up");
        session.reset_to_known_state().await?;
        self.enter_command_mode_blocking(session).await?;

        let opts = &self.options;
        let mut report = SetupReport {
            authentication: session.set_authentication(opts.authentication).await?,
            name: session.set_device_name(&opts.name).await?,
            connect_mode: session.set_connect_mode(opts.connect_mode).await?,
            sleep_mode: session.set_sleep_mode(&opts.sleep_code).await?,
            special_config: session.set_special_config(opts.special_config).await?,
            config_timer: session.set_config_timer(opts.config_timer).await?,
            hid_flags: session.set_keyboard_mouse_mode().await?,
            ..SetupReport::default()
        };

        if session.hid_profile_active().await? {
            info!("HID profile already stored, skipping reboot");
            report.profile = true;
        } else {
            report.profile = session.set_hid_profile().await?;
            if !report.profile {
                warn!("HID profile not stored, module left unrebooted");
                return Ok(report);
            }
            session.reboot().await?;
            report.rebooted = true;
        }

        if !report.all_ok() {
            warn!(?report, "some settings were not acknowledged");
        }
        Ok(report)
    }

    /// Retry command-mode entry until it sticks or the flag trips.
    /// Rejections back off and retry; transport faults are fatal.
    async fn enter_command_mode_blocking(&self, session: &mut Session) -> Result<(), RadioError> {
        loop {
            if self.options.cancel.is_cancelled() {
                return Err(RadioError::Cancelled);
            }
            match session.enter_command_mode().await {
                Ok(()) => return Ok(()),
                Err(RadioError::Transport(e)) => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "command mode entry failed, retrying");
                    sleep(Duration::from_millis(timing::RETRY_BACKOFF_MS)).await;
                }
            }
        }
    }
}
