//! Precision Touchpad digitizer report.
//!
//! Layout (after the report ID), for `N` finger slots:
//! ```text
//! N x 6 bytes: per finger
//!     Byte 0:   Bit 0 = confidence (touch valid), Bit 1 = tip switch
//!     Byte 1:   Contact ID
//!     Byte 2-3: X (little-endian)
//!     Byte 4-5: Y (little-endian)
//! 2 bytes:     Scan time, 100 us units (little-endian)
//! 1 byte:      Contact count
//! 1 byte:      Bit 0..2 = button 1..3
//! ```

use super::REPORT_ID_DIGITIZER;
use crate::error::Error;

/// Serialised size of a single finger collection.
pub const FINGER_SIZE: usize = 6;

/// Report body size (without report ID) for `n` finger slots.
pub const fn ptp_report_size(n: usize) -> usize {
    n * FINGER_SIZE + 4
}

/// One finger slot of the digitizer report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FingerContact {
    pub contact_id: u8,
    pub x: i16,
    pub y: i16,
    /// The sensor considers this a deliberate touch (HID "Confidence").
    pub touch_valid: bool,
    /// Finger is on the surface.
    pub tip_switch: bool,
}

impl FingerContact {
    pub const EMPTY: Self = Self {
        contact_id: 0,
        x: 0,
        y: 0,
        touch_valid: false,
        tip_switch: false,
    };

    /// Decode the sensor's packed confidence/tip byte.
    pub fn from_confidence_tip(contact_id: u8, x: i16, y: i16, confidence_tip: u8) -> Self {
        Self {
            contact_id,
            x,
            y,
            touch_valid: confidence_tip & 0x01 != 0,
            tip_switch: confidence_tip & 0x02 != 0,
        }
    }

    fn flags(&self) -> u8 {
        (self.touch_valid as u8) | ((self.tip_switch as u8) << 1)
    }
}

/// Digitizer report body: up to `N` contacts plus aggregate fields.
///
/// Only `fingers[..contact_count]` are meaningful; every slot past the
/// count is kept all-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactFrame<const N: usize> {
    pub fingers: [FingerContact; N],
    pub contact_count: u8,
    /// 100 us units, wrapping.
    pub scan_time: u16,
    pub button1: bool,
    pub button2: bool,
    pub button3: bool,
}

impl<const N: usize> Default for ContactFrame<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> ContactFrame<N> {
    /// Serialised size including the report ID byte.
    pub const WIRE_SIZE: usize = ptp_report_size(N) + 1;

    /// No contacts, no buttons, idle scan time.
    pub const fn empty() -> Self {
        Self {
            fingers: [FingerContact::EMPTY; N],
            contact_count: 0,
            scan_time: 0,
            button1: false,
            button2: false,
            button3: false,
        }
    }

    /// Empty frame carrying a scan time and button state.
    pub fn neutral(scan_time: u16, buttons: u8) -> Self {
        let mut frame = Self::empty();
        frame.scan_time = scan_time;
        frame.set_buttons(buttons);
        frame
    }

    pub fn set_buttons(&mut self, buttons: u8) {
        self.button1 = buttons & 0x01 != 0;
        self.button2 = buttons & 0x02 != 0;
        self.button3 = buttons & 0x04 != 0;
    }

    pub fn buttons(&self) -> u8 {
        (self.button1 as u8) | ((self.button2 as u8) << 1) | ((self.button3 as u8) << 2)
    }

    /// Valid contacts, in slot order.
    pub fn contacts(&self) -> &[FingerContact] {
        &self.fingers[..self.contact_count as usize]
    }

    /// Slot holding `contact_id`, if the contact is present.
    pub fn slot_of(&self, contact_id: u8) -> Option<usize> {
        self.contacts()
            .iter()
            .position(|f| f.contact_id == contact_id)
    }

    /// Insert or update a contact, keyed by its contact ID.
    ///
    /// Returns the slot the contact landed in.
    pub fn set_finger(&mut self, finger: FingerContact) -> Result<usize, Error> {
        if let Some(slot) = self.slot_of(finger.contact_id) {
            self.fingers[slot] = finger;
            return Ok(slot);
        }

        let count = self.contact_count as usize;
        if count == N {
            return Err(Error::CapacityExceeded);
        }

        self.fingers[count] = finger;
        self.contact_count += 1;
        Ok(count)
    }

    /// Bitmask of valid slots whose tip switch is down.
    pub fn tip_mask(&self) -> u8 {
        self.contacts()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.tip_switch)
            .fold(0, |mask, (slot, _)| mask | (1 << slot))
    }

    /// Keep only the slots set in `keep`, moved to the front in slot
    /// order, and zero the vacated tail.
    ///
    /// `marked` is a bitmask over the old slots; the same marks are
    /// returned re-indexed to the new slots (dropped slots lose theirs).
    pub fn retain_slots(&mut self, keep: u8, marked: u8) -> u8 {
        let count = self.contact_count as usize;
        let mut kept = 0;
        let mut remapped = 0;
        for i in 0..count {
            if keep & (1 << i) == 0 {
                continue;
            }
            if marked & (1 << i) != 0 {
                remapped |= 1 << kept;
            }
            self.fingers[kept] = self.fingers[i];
            kept += 1;
        }

        for finger in &mut self.fingers[kept..count] {
            *finger = FingerContact::EMPTY;
        }

        self.contact_count = kept as u8;
        remapped
    }

    /// Drop every contact whose tip switch is released.
    ///
    /// Survivors keep their relative order and move to the front; the
    /// vacated tail is zeroed. With no contacts left the scan time goes
    /// back to the idle marker (0).
    pub fn clear_lifted_fingers(&mut self) {
        self.retain_slots(self.tip_mask(), 0);
        if self.contact_count == 0 {
            self.scan_time = 0;
        }
    }

    /// Stamp the scan time from a free-running 100 us counter.
    pub fn refresh_scan_time(&mut self, now_100us: u32) {
        self.scan_time = if self.contact_count > 0 {
            (now_100us & 0xFFFF) as u16
        } else {
            0
        };
    }

    /// Serialise with the report ID prefix.
    /// Returns the number of bytes written, or 0 if `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < Self::WIRE_SIZE {
            return 0;
        }

        buf[0] = REPORT_ID_DIGITIZER;
        for (i, finger) in self.fingers.iter().enumerate() {
            let at = 1 + i * FINGER_SIZE;
            let x = finger.x.to_le_bytes();
            let y = finger.y.to_le_bytes();
            buf[at..at + FINGER_SIZE].copy_from_slice(&[
                finger.flags(),
                finger.contact_id,
                x[0],
                x[1],
                y[0],
                y[1],
            ]);
        }

        let tail = 1 + N * FINGER_SIZE;
        let scan = self.scan_time.to_le_bytes();
        buf[tail] = scan[0];
        buf[tail + 1] = scan[1];
        buf[tail + 2] = self.contact_count;
        buf[tail + 3] = self.buttons();
        Self::WIRE_SIZE
    }
}
