//! ASCII to USB HID scan code translation.

/// Table entries with this bit set require the shift modifier.
pub const SHIFT_FLAG: u8 = 0x80;

/// Key bytes at or above this value are raw scan codes offset by it,
/// bypassing the ASCII table (arrow keys, function keys and the like).
pub const NONPRINTING_BASE: u8 = 136;

const S: u8 = SHIFT_FLAG;

/// US-layout map from ASCII to scan code. Zero means unmapped; the
/// high bit marks characters reached through shift.
#[rustfmt::skip]
const ASCII_TO_SCAN: [u8; 128] = [
    0x00,     0x00,     0x00,     0x00,     // NUL SOH STX ETX
    0x00,     0x00,     0x00,     0x00,     // EOT ENQ ACK BEL
    0x2a,     0x2b,     0x28,     0x00,     // BS  TAB LF  VT
    0x00,     0x00,     0x00,     0x00,     // FF  CR  SO  SI
    0x00,     0x00,     0x00,     0x00,     // DLE DC1 DC2 DC3
    0x00,     0x00,     0x00,     0x00,     // DC4 NAK SYN ETB
    0x00,     0x00,     0x00,     0x00,     // CAN EM  SUB ESC
    0x00,     0x00,     0x00,     0x00,     // FS  GS  RS  US
    0x2c,     0x1e | S, 0x34 | S, 0x20 | S, // space ! " #
    0x21 | S, 0x22 | S, 0x24 | S, 0x34,     // $ % & '
    0x26 | S, 0x27 | S, 0x25 | S, 0x2e | S, // ( ) * +
    0x36,     0x2d,     0x37,     0x38,     // , - . /
    0x27,     0x1e,     0x1f,     0x20,     // 0 1 2 3
    0x21,     0x22,     0x23,     0x24,     // 4 5 6 7
    0x25,     0x26,     0x33 | S, 0x33,     // 8 9 : ;
    0x36 | S, 0x2e,     0x37 | S, 0x38 | S, // < = > ?
    0x1f | S, 0x04 | S, 0x05 | S, 0x06 | S, // @ A B C
    0x07 | S, 0x08 | S, 0x09 | S, 0x0a | S, // D E F G
    0x0b | S, 0x0c | S, 0x0d | S, 0x0e | S, // H I J K
    0x0f | S, 0x10 | S, 0x11 | S, 0x12 | S, // L M N O
    0x13 | S, 0x14 | S, 0x15 | S, 0x16 | S, // P Q R S
    0x17 | S, 0x18 | S, 0x19 | S, 0x1a | S, // T U V W
    0x1b | S, 0x1c | S, 0x1d | S, 0x2f,     // X Y Z [
    0x31,     0x30,     0x23 | S, 0x2d | S, // \ ] ^ _
    0x35,     0x04,     0x05,     0x06,     // ` a b c
    0x07,     0x08,     0x09,     0x0a,     // d e f g
    0x0b,     0x0c,     0x0d,     0x0e,     // h i j k
    0x0f,     0x10,     0x11,     0x12,     // l m n o
    0x13,     0x14,     0x15,     0x16,     // p q r s
    0x17,     0x18,     0x19,     0x1a,     // t u v w
    0x1b,     0x1c,     0x1d,     0x2f | S, // x y z {
    0x31 | S, 0x30 | S, 0x35 | S, 0x00,     // | } ~ DEL
];

/// Look up the scan code for a printable ASCII byte. Returns the code
/// and whether shift is required, or `None` for unmapped characters.
pub fn lookup(ascii: u8) -> Option<(u8, bool)> {
    let entry = *ASCII_TO_SCAN.get(usize::from(ascii))?;
    if entry == 0 {
        return None;
    }
    Some((entry & !SHIFT_FLAG, entry & SHIFT_FLAG != 0))
}
