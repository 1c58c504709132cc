//! Relative (mouse mode) HID report.
//!
//! Layout (6 bytes, after the report ID):
//! ```text
//! Byte 0:   Button bitfield
//!           Bit 0 = Left, Bit 1 = Right, Bit 2 = Middle
//! Byte 1-2: X displacement (signed, little-endian)
//! Byte 3-4: Y displacement (signed, little-endian)
//! Byte 5:   Scroll wheel  (signed, -127..127)
//! ```

use super::REPORT_ID_MOUSE;

/// Mouse report body size in bytes (without report ID).
pub const MOUSE_REPORT_SIZE: usize = 6;

/// Relative mouse report published while the sensor is in mouse mode.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    /// Button bitfield (bit 0 = left, bit 1 = right, bit 2 = middle).
    pub buttons: u8,
    /// Relative X movement.
    pub x: i16,
    /// Relative Y movement.
    pub y: i16,
    /// Scroll wheel delta.
    pub wheel: i8,
}

impl MouseReport {
    /// Create an idle (no movement, no buttons) report.
    pub const fn empty() -> Self {
        Self {
            buttons: 0,
            x: 0,
            y: 0,
            wheel: 0,
        }
    }

    /// Build a report from raw sensor deltas.
    ///
    /// The wheel delta is clamped into the descriptor's -127..127 range and
    /// optionally inverted.
    pub fn from_motion(buttons: u8, dx: i16, dy: i16, wheel: i16, reverse_scroll: bool) -> Self {
        let wheel = if reverse_scroll {
            wheel.saturating_neg()
        } else {
            wheel
        };
        Self {
            buttons: buttons & 0x07,
            x: dx,
            y: dy,
            wheel: wheel.clamp(-127, 127) as i8,
        }
    }

    /// Serialise with the report ID prefix for USB HID transmission.
    /// Returns the number of bytes written, or 0 if `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < MOUSE_REPORT_SIZE + 1 {
            return 0;
        }
        let x = self.x.to_le_bytes();
        let y = self.y.to_le_bytes();
        buf[0] = REPORT_ID_MOUSE;
        buf[1] = self.buttons;
        buf[2] = x[0];
        buf[3] = x[1];
        buf[4] = y[0];
        buf[5] = y[1];
        buf[6] = self.wheel as u8;
        MOUSE_REPORT_SIZE + 1
    }

    /// Returns `true` when no buttons are pressed and there is no movement.
    pub fn is_idle(&self) -> bool {
        self.buttons == 0 && self.x == 0 && self.y == 0 && self.wheel == 0
    }
}
