//! Subcommand handlers.

use std::time::Duration;

use anyhow::Context;
use tokio::time::sleep;
use tracing::info;

use rn42_radio::{
    CancelFlag, ConnectMode, HidReportEncoder, InitOptions, InitSequencer, Session,
};
use rn42_transport::{BoxedTransport, UartPort};

fn open_port(path: &str) -> anyhow::Result<BoxedTransport> {
    UartPort::open(path).with_context(|| format!("opening serial port {path}"))
}

pub async fn init(
    port: &str,
    name: String,
    no_auth: bool,
    mode: ConnectMode,
    sleep_code: String,
    cancel: CancelFlag,
) -> anyhow::Result<()> {
    let mut session = Session::new(open_port(port)?);
    let options = InitOptions {
        name,
        authentication: !no_auth,
        connect_mode: mode,
        sleep_code,
        cancel,
        ..InitOptions::default()
    };

    let report = InitSequencer::new(options).run(&mut session).await?;
    if report.all_ok() {
        if report.rebooted {
            println!("module configured, rebooted into the HID profile");
        } else {
            println!("module configured, HID profile was already active");
        }
    } else {
        println!("module configured with rejections: {report:?}");
    }
    Ok(())
}

pub async fn type_text(port: &str, text: &str, delay_ms: u64) -> anyhow::Result<()> {
    let port = open_port(port)?;
    let mut encoder = HidReportEncoder::new();
    let delay = Duration::from_millis(delay_ms);

    for ch in text.chars() {
        let key = ascii_key(ch)?;
        encoder.key_press(port.as_ref(), key).await?;
        sleep(delay).await;
        encoder.key_release(port.as_ref(), key).await?;
        sleep(delay).await;
    }
    info!(chars = text.chars().count(), "text sent");
    Ok(())
}

fn ascii_key(ch: char) -> anyhow::Result<u8> {
    if !ch.is_ascii() {
        anyhow::bail!("character {ch:?} is not ASCII");
    }
    Ok(ch as u8)
}

pub async fn key(port: &str, ch: char) -> anyhow::Result<()> {
    let port = open_port(port)?;
    let key = ascii_key(ch)?;
    let mut encoder = HidReportEncoder::new();
    encoder.key_press(port.as_ref(), key).await?;
    encoder.key_release(port.as_ref(), key).await?;
    Ok(())
}

pub async fn mouse(port: &str, buttons: u8, dx: i8, dy: i8) -> anyhow::Result<()> {
    let port = open_port(port)?;
    HidReportEncoder::new()
        .move_mouse(port.as_ref(), buttons, dx, dy)
        .await?;
    Ok(())
}

pub async fn connect(port: &str, address: Option<String>) -> anyhow::Result<()> {
    let mut session = Session::new(open_port(port)?);
    session.enter_command_mode().await?;
    match address {
        Some(addr) => session.connect_to(&addr).await?,
        None => session.connect().await?,
    }
    println!("connection initiated");
    Ok(())
}

pub async fn status(port: &str) -> anyhow::Result<()> {
    let mut session = Session::new(open_port(port)?);
    session.enter_command_mode().await?;

    println!("name:           {}", session.get_device_name().await?);
    println!("authentication: {}", session.get_authentication().await?);
    println!("connect mode:   {}", session.get_connect_mode().await?);
    println!("sleep:          {}", session.get_sleep_mode().await?);
    println!("special config: {}", session.get_special_config().await?);
    println!("hid flags:      {}", session.get_hid_flags().await?);
    println!(
        "hid profile:    {}",
        if session.hid_profile_active().await? {
            "active"
        } else {
            "inactive"
        }
    );

    session.exit_command_mode().await?;
    Ok(())
}
