//! HID report encoding and rollover state.
//!
//! While the module is connected with the HID profile active, the UART
//! carries raw report frames instead of commands. Keyboard frames are
//! `[0xFE, 0x07, modifier, slot0..slot5]`; the encoder keeps the six
//! slot bytes and the modifier byte between calls so held keys stay
//! reported until released.

use tracing::trace;

use rn42_transport::Transport;

use crate::error::RadioError;
use crate::protocol::frame;
use crate::scancode::{self, NONPRINTING_BASE};

/// Keyboard report state plus frame encoding for both report types.
#[derive(Debug, Default)]
pub struct HidReportEncoder {
    slots: [u8; frame::ROLLOVER_SLOTS],
    modifiers: u8,
}

impl HidReportEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held scan codes, zeros for free slots.
    pub fn slots(&self) -> &[u8; frame::ROLLOVER_SLOTS] {
        &self.slots
    }

    pub fn modifiers(&self) -> u8 {
        self.modifiers
    }

    /// Map a key byte to its scan code and shift requirement. Bytes at
    /// or above [`NONPRINTING_BASE`] carry a raw scan code offset by
    /// that base; the band between ASCII and the base is reserved for
    /// modifier handling that keyboard report frames cannot express.
    fn translate(key: u8) -> Result<(u8, bool), RadioError> {
        if key >= NONPRINTING_BASE {
            return Ok((key - NONPRINTING_BASE, false));
        }
        if key >= 0x80 {
            return Err(RadioError::UnsupportedKey { key });
        }
        scancode::lookup(key).ok_or(RadioError::UnsupportedKey { key })
    }

    /// Press `key`: claim a slot, apply shift if the character needs
    /// it, and transmit the updated report.
    ///
    /// A press that finds no free slot still transmits the unchanged
    /// report (so the host and device agree on what is held) and then
    /// reports [`RadioError::RolloverFull`]; neither the slots nor the
    /// modifier byte are touched in that case.
    pub async fn key_press(&mut self, port: &dyn Transport, key: u8) -> Result<(), RadioError> {
        let (code, shifted) = Self::translate(key)?;

        let already_held = self.slots.contains(&code);
        if !already_held {
            match self.slots.iter_mut().find(|slot| **slot == 0) {
                Some(slot) => *slot = code,
                None => {
                    trace!(key, "rollover buffer full");
                    self.transmit_keyboard(port).await?;
                    return Err(RadioError::RolloverFull);
                }
            }
        }
        if shifted {
            self.modifiers |= frame::SHIFT_MODIFIER;
        }
        self.transmit_keyboard(port).await
    }

    /// Release `key`: free every slot holding its code and transmit.
    ///
    /// A shifted character clears the shift modifier even if another
    /// shifted character is still held. Shift ownership is not tracked
    /// per key; callers that need overlapping shifted holds must
    /// re-press the surviving key.
    pub async fn key_release(&mut self, port: &dyn Transport, key: u8) -> Result<(), RadioError> {
        let (code, shifted) = Self::translate(key)?;

        if shifted {
            self.modifiers &= !frame::SHIFT_MODIFIER;
        }
        for slot in &mut self.slots {
            if *slot == code {
                *slot = 0;
            }
        }
        self.transmit_keyboard(port).await
    }

    /// Release everything and transmit an empty report.
    pub async fn release_all(&mut self, port: &dyn Transport) -> Result<(), RadioError> {
        self.slots = [0; frame::ROLLOVER_SLOTS];
        self.modifiers = 0;
        self.transmit_keyboard(port).await
    }

    /// Encode and send the current keyboard report.
    async fn transmit_keyboard(&self, port: &dyn Transport) -> Result<(), RadioError> {
        let mut buf = [0u8; 3 + frame::ROLLOVER_SLOTS];
        buf[0] = frame::KEYBOARD;
        buf[1] = frame::KEYBOARD_LEN;
        buf[2] = self.modifiers;
        buf[3..].copy_from_slice(&self.slots);
        trace!(frame = ?buf, "keyboard report");
        port.write_all(&buf).await?;
        Ok(())
    }

    /// Send a mouse report. Deltas are one signed byte each; buttons is
    /// a bitmask with bit 0 left, bit 1 right, bit 2 middle.
    pub async fn move_mouse(
        &self,
        port: &dyn Transport,
        buttons: u8,
        dx: i8,
        dy: i8,
    ) -> Result<(), RadioError> {
        let buf = [
            frame::MOUSE,
            frame::MOUSE_LEN,
            frame::MOUSE_TYPE,
            buttons,
            dx as u8,
            dy as u8,
            0x00,
        ];
        trace!(frame = ?buf, "mouse report");
        port.write_all(&buf).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rn42_transport::MockPort;

    use super::*;

    #[tokio::test]
    async fn press_and_release_frame_bytes() {
        let port = MockPort::new();
        let mut enc = HidReportEncoder::new();

        enc.key_press(&port, b'a').await.unwrap();
        enc.key_release(&port, b'a').await.unwrap();

        let writes = port.writes();
        assert_eq!(writes[0], vec![0xFE, 0x07, 0x00, 0x04, 0, 0, 0, 0, 0]);
        assert_eq!(writes[1], vec![0xFE, 0x07, 0x00, 0x00, 0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn shifted_character_sets_modifier() {
        let port = MockPort::new();
        let mut enc = HidReportEncoder::new();

        enc.key_press(&port, b'A').await.unwrap();
        assert_eq!(
            port.writes()[0],
            vec![0xFE, 0x07, 0x02, 0x04, 0, 0, 0, 0, 0]
        );

        enc.key_release(&port, b'A').await.unwrap();
        assert_eq!(enc.modifiers(), 0);
    }

    #[tokio::test]
    async fn duplicate_press_claims_no_second_slot() {
        let port = MockPort::new();
        let mut enc = HidReportEncoder::new();

        enc.key_press(&port, b'x').await.unwrap();
        enc.key_press(&port, b'x').await.unwrap();
        assert_eq!(enc.slots().iter().filter(|&&s| s != 0).count(), 1);
    }

    #[tokio::test]
    async fn seventh_key_reports_rollover_and_preserves_state() {
        let port = MockPort::new();
        let mut enc = HidReportEncoder::new();

        for key in [b'a', b'b', b'c', b'd', b'e', b'f'] {
            enc.key_press(&port, key).await.unwrap();
        }
        let held = *enc.slots();

        let err = enc.key_press(&port, b'G').await.unwrap_err();
        assert!(matches!(err, RadioError::RolloverFull));
        assert_eq!(enc.slots(), &held);
        // the shift the rejected 'G' would have needed must not leak
        assert_eq!(enc.modifiers(), 0);

        // the overflow press still transmitted the unchanged report
        let writes = port.writes();
        assert_eq!(writes.len(), 7);
        assert_eq!(&writes[6][3..], &held);
    }

    #[tokio::test]
    async fn shift_clears_even_with_other_shifted_keys_held() {
        let port = MockPort::new();
        let mut enc = HidReportEncoder::new();

        enc.key_press(&port, b'A').await.unwrap();
        enc.key_press(&port, b'B').await.unwrap();
        enc.key_release(&port, b'A').await.unwrap();

        // 'B' is still held but the modifier is gone
        assert!(enc.slots().contains(&0x05));
        assert_eq!(enc.modifiers(), 0);
    }

    #[tokio::test]
    async fn nonprinting_keys_pass_offset_scan_codes() {
        let port = MockPort::new();
        let mut enc = HidReportEncoder::new();

        // 218 - 136 = 0x52, the up-arrow usage
        enc.key_press(&port, 218).await.unwrap();
        assert!(enc.slots().contains(&0x52));
    }

    #[tokio::test]
    async fn reserved_band_is_unsupported() {
        let port = MockPort::new();
        let mut enc = HidReportEncoder::new();

        for key in [0x80_u8, 130, 135] {
            let err = enc.key_press(&port, key).await.unwrap_err();
            assert!(matches!(err, RadioError::UnsupportedKey { .. }));
        }
        assert!(port.writes().is_empty());
    }

    #[tokio::test]
    async fn mouse_frame_encodes_negative_deltas() {
        let port = MockPort::new();
        let enc = HidReportEncoder::new();

        enc.move_mouse(&port, 0x01, -5, 10).await.unwrap();
        assert_eq!(
            port.writes()[0],
            vec![0xFD, 0x05, 0x02, 0x01, 0xFB, 0x0A, 0x00]
        );
    }

    #[tokio::test]
    async fn release_all_zeroes_everything() {
        let port = MockPort::new();
        let mut enc = HidReportEncoder::new();

        enc.key_press(&port, b'Q').await.unwrap();
        enc.key_press(&port, b'w').await.unwrap();
        enc.release_all(&port).await.unwrap();

        assert_eq!(enc.slots(), &[0; 6]);
        assert_eq!(enc.modifiers(), 0);
        let last = port.writes().pop().unwrap();
        assert_eq!(last, vec![0xFE, 0x07, 0, 0, 0, 0, 0, 0, 0]);
    }
}
