//! Wire-level constants for the RN-42 AT command dialect and HID frames.

use std::fmt;
use std::str::FromStr;

/// Command strings. Set commands take their argument appended directly
/// to the prefix; every command line is terminated with `\r`.
pub mod cmd {
    /// Escape sequence that enters command mode. Sent bare, no `\r`
    /// before it, though the module tolerates a trailing one.
    pub const ENTER_COMMAND: &[u8] = b"$$$";
    /// Leaves command mode and returns the UART to data mode.
    pub const EXIT_COMMAND: &str = "---";
    /// A single NUL in data mode drops any active connection.
    pub const DISCONNECT: u8 = 0x00;

    pub const SET_AUTH: &str = "SA,";
    pub const SET_NAME: &str = "SN,";
    pub const SET_SLEEP: &str = "SW,";
    pub const SET_SPECIAL: &str = "SQ,";
    pub const SET_CONNECT_MODE: &str = "SM,";
    pub const SET_CONFIG_TIMER: &str = "ST,";
    pub const SET_PROFILE: &str = "S~,";
    pub const SET_HID_FLAGS: &str = "SH,";

    pub const GET_REMOTE_ADDR: &str = "GR";
    pub const GET_PROFILE: &str = "G~";
    pub const GET_AUTH: &str = "GA";
    pub const GET_NAME: &str = "GN";
    pub const GET_SLEEP: &str = "GW";
    pub const GET_SPECIAL: &str = "GQ";
    pub const GET_CONNECT_MODE: &str = "GM";
    pub const GET_HID_FLAGS: &str = "GH";

    /// Reboot so stored settings take effect.
    pub const REBOOT: &str = "R,1";
    /// Connect to the stored remote address.
    pub const CONNECT: &str = "C";
    /// Connect to an explicit remote address.
    pub const CONNECT_TO: &str = "C,";
}

/// Acknowledgment tokens the module sends back.
pub mod ack {
    /// Successful set command.
    pub const OK: &[u8] = b"AOK";
    /// Command mode entered.
    pub const CMD: &[u8] = b"CMD";
    /// Reboot accepted.
    pub const REBOOT: &[u8] = b"Reboot!";
    /// First byte of the syntax-error prompt. Seeing it in reply to
    /// `$$$` means the module was already sitting in command mode.
    pub const ALREADY_IN_COMMAND: u8 = b'?';
    /// `G~` readback when the HID profile is stored.
    pub const HID_PROFILE: &[u8] = b"6";
    /// `GR` readback when no remote address has ever been stored.
    pub const NO_REMOTE_ADDR: &[u8] = b"NOT SET";
}

/// Profile and HID flag register values.
pub mod profile {
    /// `S~` argument selecting the HID profile.
    pub const HID: &str = "6";
    /// `SH` flag register enabling combined keyboard and mouse reports.
    pub const KEYBOARD_MOUSE: &str = "0030";
}

/// HID report frame layout.
pub mod frame {
    /// Frame marker for a keyboard report.
    pub const KEYBOARD: u8 = 0xFE;
    /// Length byte that follows the keyboard marker.
    pub const KEYBOARD_LEN: u8 = 0x07;
    /// Frame marker for a mouse report.
    pub const MOUSE: u8 = 0xFD;
    /// Length byte that follows the mouse marker.
    pub const MOUSE_LEN: u8 = 0x05;
    /// Report descriptor type byte for mouse frames.
    pub const MOUSE_TYPE: u8 = 0x02;

    /// Modifier byte bit for left shift.
    pub const SHIFT_MODIFIER: u8 = 0x02;
    /// Keyboard reports carry this many simultaneous key slots.
    pub const ROLLOVER_SLOTS: usize = 6;
}

/// Timing constants, all milliseconds.
pub mod timing {
    /// Idle deadline while collecting a response line.
    pub const RESPONSE_IDLE_MS: u64 = 250;
    /// Pause after forcing a disconnect before talking again.
    pub const DISCONNECT_SETTLE_MS: u64 = 1000;
    /// Pause between issuing a set command and reading its ack.
    pub const COMMAND_DELAY_MS: u64 = 100;
    /// Backoff between command-mode entry retries.
    pub const RETRY_BACKOFF_MS: u64 = 100;
    /// Pause after `---` before the UART is usable for data.
    pub const EXIT_SETTLE_MS: u64 = 500;
    /// Pause after `R,1` while the module restarts.
    pub const REBOOT_SETTLE_MS: u64 = 2000;
    /// How many `$$$` probes to send while waking an unresponsive
    /// module before giving up.
    pub const RESET_TRIGGER_ATTEMPTS: usize = 64;
    /// Pause between wake probes.
    pub const RESET_POLL_MS: u64 = 25;
}

/// Device names longer than this are truncated by the module itself,
/// so the driver truncates first.
pub const NAME_MAX_LEN: usize = 15;

/// A remote Bluetooth address argument is eight hex digits (the module
/// fills the upper OUI bytes from its pairing table).
pub const REMOTE_ADDR_LEN: usize = 8;

/// `SM` connection mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    Slave,
    Master,
    Trigger,
    AutoConnectMaster,
    /// Auto-connect gated on the DTR switch. The mode the HID bring-up
    /// stores by default.
    AutoConnectDtr,
    AutoConnectAny,
}

impl ConnectMode {
    /// Register value as written after `SM,`.
    pub fn wire_value(self) -> u8 {
        match self {
            ConnectMode::Slave => 0,
            ConnectMode::Master => 1,
            ConnectMode::Trigger => 2,
            ConnectMode::AutoConnectMaster => 3,
            ConnectMode::AutoConnectDtr => 4,
            ConnectMode::AutoConnectAny => 5,
        }
    }

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(ConnectMode::Slave),
            1 => Some(ConnectMode::Master),
            2 => Some(ConnectMode::Trigger),
            3 => Some(ConnectMode::AutoConnectMaster),
            4 => Some(ConnectMode::AutoConnectDtr),
            5 => Some(ConnectMode::AutoConnectAny),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectMode::Slave => "slave",
            ConnectMode::Master => "master",
            ConnectMode::Trigger => "trigger",
            ConnectMode::AutoConnectMaster => "auto-master",
            ConnectMode::AutoConnectDtr => "auto-dtr",
            ConnectMode::AutoConnectAny => "auto-any",
        };
        f.write_str(name)
    }
}

impl FromStr for ConnectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slave" => Ok(ConnectMode::Slave),
            "master" => Ok(ConnectMode::Master),
            "trigger" => Ok(ConnectMode::Trigger),
            "auto-master" => Ok(ConnectMode::AutoConnectMaster),
            "auto-dtr" => Ok(ConnectMode::AutoConnectDtr),
            "auto-any" => Ok(ConnectMode::AutoConnectAny),
            _ => Err(format!(
                "unknown connect mode '{s}' (expected slave, master, trigger, auto-master, auto-dtr or auto-any)"
            )),
        }
    }
}
