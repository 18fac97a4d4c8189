//! Command line definitions.

use clap::{Parser, Subcommand};

use rn42_radio::ConnectMode;

#[derive(Parser)]
#[command(name = "rn42ctl", version, about = "RN-42 Bluetooth HID radio control")]
pub struct Cli {
    /// Serial device the module is attached to
    #[arg(short, long, global = true, default_value = "/dev/ttyUSB0")]
    pub port: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reset the module and store the HID configuration
    Init {
        /// Friendly device name (truncated to 15 characters)
        #[arg(short, long, default_value = "RN42-HID")]
        name: String,

        /// Store the configuration without pairing authentication
        #[arg(long)]
        no_auth: bool,

        /// Connection mode to store
        #[arg(short, long, default_value = "auto-dtr")]
        mode: ConnectMode,

        /// Sleep register value, four hex digits
        #[arg(long, default_value = "80A0")]
        sleep: String,
    },

    /// Type a text string as keyboard reports
    #[command(alias = "t")]
    Type {
        text: String,

        /// Milliseconds between key events
        #[arg(short, long, default_value_t = 20)]
        delay: u64,
    },

    /// Press and release a single character
    Key { key: char },

    /// Send one mouse report
    Mouse {
        #[arg(allow_hyphen_values = true)]
        dx: i8,
        #[arg(allow_hyphen_values = true)]
        dy: i8,

        /// Button bitmask: 1 left, 2 right, 4 middle
        #[arg(short, long, default_value_t = 0)]
        buttons: u8,
    },

    /// Connect to a remote host
    Connect {
        /// Remote address, eight hex digits; stored address when omitted
        address: Option<String>,
    },

    /// Print the module's stored settings
    #[command(alias = "s")]
    Status,
}
