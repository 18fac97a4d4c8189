//! End-to-end bring-up and connection flows against a scripted port.

use std::sync::Arc;

use rn42_radio::{
    CancelFlag, ConnectMode, InitOptions, InitSequencer, ModuleState, RadioError, Session,
};
use rn42_transport::MockPort;

/// Scripted module used by the full-sequence tests. Answers the wake
/// probe with a prompt byte, later escapes with `CMD`, every setter
/// with `AOK`, and the profile query with the byte handed in.
fn scripted_module(port: &MockPort, profile_replies: Vec<&'static [u8]>) {
    let mut escapes = 0usize;
    let mut profiles = profile_replies.into_iter();
    port.set_responder(move |chunk| match chunk {
        [0x00] | b"\r" | b"---\r" => Vec::new(),
        b"$$$" => {
            escapes += 1;
            if escapes == 1 {
                b"?".to_vec()
            } else {
                b"CMD\r\n".to_vec()
            }
        }
        b"G~\r" => profiles.next().unwrap_or(b"6").to_vec(),
        b"R,1\r" => b"Reboot!\r\n".to_vec(),
        c if c.starts_with(b"S") => b"AOK\r\n".to_vec(),
        _ => Vec::new(),
    });
}

fn contains_write(port: &MockPort, needle: &[u8]) -> bool {
    port.writes().iter().any(|w| w == needle)
}

#[tokio::test(start_paused = true)]
async fn bringup_skips_reboot_when_profile_already_stored() {
    let port = Arc::new(MockPort::new());
    scripted_module(&port, vec![b"6\r\n"]);
    let mut session = Session::new(port.clone());

    let report = InitSequencer::new(InitOptions::default())
        .run(&mut session)
        .await
        .unwrap();

    assert!(report.all_ok());
    assert!(!report.rebooted);
    assert!(!contains_write(&port, b"R,1\r"));
    assert_eq!(session.state(), ModuleState::CommandMode);
}

#[tokio::test(start_paused = true)]
async fn bringup_reboots_when_profile_changed() {
    let port = Arc::new(MockPort::new());
    // first readback says SPP, the post-set verification says HID
    scripted_module(&port, vec![b"0\r\n", b"6\r\n"]);
    let mut session = Session::new(port.clone());

    let report = InitSequencer::new(InitOptions::default())
        .run(&mut session)
        .await
        .unwrap();

    assert!(report.all_ok());
    assert!(report.rebooted);
    assert!(contains_write(&port, b"S~,6\r"));
    assert!(contains_write(&port, b"R,1\r"));
    assert_eq!(session.state(), ModuleState::Unknown);
}

#[tokio::test(start_paused = true)]
async fn bringup_stores_every_configured_setting() {
    let port = Arc::new(MockPort::new());
    scripted_module(&port, vec![b"6\r\n"]);
    let mut session = Session::new(port.clone());

    let options = InitOptions {
        name: "desk-keyboard".into(),
        authentication: false,
        connect_mode: ConnectMode::Slave,
        sleep_code: "0000".into(),
        special_config: 0,
        config_timer: 60,
        cancel: CancelFlag::new(),
    };
    InitSequencer::new(options).run(&mut session).await.unwrap();

    assert!(contains_write(&port, b"SA,0\r"));
    assert!(contains_write(&port, b"SN,desk-keyboard\r"));
    assert!(contains_write(&port, b"SM,0\r"));
    assert!(contains_write(&port, b"SW,0000\r"));
    assert!(contains_write(&port, b"SQ,0\r"));
    assert!(contains_write(&port, b"ST,60\r"));
    assert!(contains_write(&port, b"SH,0030\r"));
}

#[tokio::test(start_paused = true)]
async fn entry_rejection_retries_after_backoff() {
    let port = Arc::new(MockPort::new());
    // wake probe gets a prompt byte, the first real entry attempt is
    // rejected, the second sticks
    let mut escapes = 0usize;
    port.set_responder(move |chunk| match chunk {
        b"$$$" => {
            escapes += 1;
            match escapes {
                1 => b"?".to_vec(),
                2 => b"ERR\r\n".to_vec(),
                _ => b"CMD\r\n".to_vec(),
            }
        }
        b"G~\r" => b"6\r\n".to_vec(),
        c if c.starts_with(b"S") => b"AOK\r\n".to_vec(),
        _ => Vec::new(),
    });
    let mut session = Session::new(port.clone());

    let start = tokio::time::Instant::now();
    let report = InitSequencer::new(InitOptions::default())
        .run(&mut session)
        .await
        .unwrap();

    assert!(report.all_ok());
    // one wake probe plus exactly two entry attempts
    let escape_writes = port.writes().iter().filter(|w| *w == b"$$$").count();
    assert_eq!(escape_writes, 3);
    // the rejected attempt must have cost one backoff on top of the
    // disconnect and exit settle intervals
    let floor = rn42_radio::protocol::timing::DISCONNECT_SETTLE_MS
        + rn42_radio::protocol::timing::EXIT_SETTLE_MS
        + rn42_radio::protocol::timing::RETRY_BACKOFF_MS;
    assert!(start.elapsed() >= std::time::Duration::from_millis(floor));
}

#[tokio::test(start_paused = true)]
async fn cancelled_bringup_stops_before_configuring() {
    let port = Arc::new(MockPort::new());
    scripted_module(&port, vec![]);
    let mut session = Session::new(port.clone());

    let options = InitOptions::default();
    options.cancel.cancel();

    let err = InitSequencer::new(options)
        .run(&mut session)
        .await
        .unwrap_err();
    assert!(matches!(err, RadioError::Cancelled));
    assert!(!contains_write(&port, b"SH,0030\r"));
}

#[tokio::test(start_paused = true)]
async fn connect_uses_stored_remote_address() {
    let port = Arc::new(MockPort::new());
    port.set_responder(|chunk| match chunk {
        b"$$$" => b"CMD\r\n".to_vec(),
        b"GR\r" => b"0006668C\r\n".to_vec(),
        _ => Vec::new(),
    });
    let mut session = Session::new(port.clone());

    session.enter_command_mode().await.unwrap();
    session.connect().await.unwrap();

    assert!(contains_write(&port, b"C\r"));
    assert_eq!(session.state(), ModuleState::Connected);
}

#[tokio::test(start_paused = true)]
async fn connect_without_stored_address_backs_out() {
    let port = Arc::new(MockPort::new());
    port.set_responder(|chunk| match chunk {
        b"$$$" => b"CMD\r\n".to_vec(),
        b"GR\r" => b"NOT SET\r\n".to_vec(),
        _ => Vec::new(),
    });
    let mut session = Session::new(port.clone());

    session.enter_command_mode().await.unwrap();
    let err = session.connect().await.unwrap_err();

    assert!(matches!(err, RadioError::NoRemoteAddress));
    assert!(contains_write(&port, b"---\r"));
    assert!(!contains_write(&port, b"C\r"));
    assert_eq!(session.state(), ModuleState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn silent_module_times_out_the_address_query() {
    let port = Arc::new(MockPort::new());
    port.set_responder(|chunk| match chunk {
        b"$$$" => b"CMD\r\n".to_vec(),
        _ => Vec::new(),
    });
    let mut session = Session::new(port.clone());

    session.enter_command_mode().await.unwrap();
    let err = session.connect().await.unwrap_err();
    assert!(matches!(
        err,
        RadioError::Transport(rn42_transport::TransportError::Timeout)
    ));
}
