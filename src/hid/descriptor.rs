//! Composite HID report descriptor: PTP touch pad, device configuration
//! (input mode + selective reporting) and a relative mouse.
//!
//! The per-finger collection is repeated once per slot, so the descriptor
//! is assembled in a `const fn` for the configured finger capacity.

use super::{
    REPORT_ID_DIGITIZER, REPORT_ID_FEATURE_CAPABILITIES, REPORT_ID_FEATURE_CERTIFICATION,
    REPORT_ID_FEATURE_MODE, REPORT_ID_FEATURE_SELECTIVE, REPORT_ID_MOUSE,
};
use crate::config;

/// Largest finger capacity the descriptor can be built for.
pub const MAX_FINGERS: usize = 5;

const MAX_DESCRIPTOR_SIZE: usize = descriptor_len(MAX_FINGERS);

/// Exact descriptor length for `fingers` contact slots.
pub const fn descriptor_len(fingers: usize) -> usize {
    TOUCHPAD_HEADER.len() + fingers * FINGER_COLLECTION.len() + TRAILER.len()
}

/// Fixed-capacity descriptor buffer built at compile time.
pub struct ReportDescriptor {
    buf: [u8; MAX_DESCRIPTOR_SIZE],
    len: usize,
}

impl ReportDescriptor {
    const fn new() -> Self {
        Self {
            buf: [0; MAX_DESCRIPTOR_SIZE],
            len: 0,
        }
    }

    const fn push(mut self, items: &[u8]) -> Self {
        let mut i = 0;
        while i < items.len() {
            self.buf[self.len] = items[i];
            self.len += 1;
            i += 1;
        }
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

const fn lo(v: u16) -> u8 {
    (v & 0xFF) as u8
}

const fn hi(v: u16) -> u8 {
    (v >> 8) as u8
}

const FINGER_COLLECTION: &[u8] = &[
    0x05, 0x0D, //   Usage Page (Digitizer)
    0x09, 0x22, //   Usage (Finger)
    0xA1, 0x02, //   Collection (Logical)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x09, 0x47, //     Usage (Confidence)
    0x09, 0x42, //     Usage (Tip Switch)
    0x95, 0x02, //     Report Count (2)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x06, //     Report Count (6)
    0x81, 0x03, //     Input (Constant) - padding
    0x25, 0x7F, //     Logical Maximum (127)
    0x09, 0x51, //     Usage (Contact Identifier)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x75, 0x10, //     Report Size (16)
    0x55, 0x0E, //     Unit Exponent (-2)
    0x65, 0x11, //     Unit (cm, linear)
    0x35, 0x00, //     Physical Minimum (0)
    0x09, 0x30, //     Usage (X)
    0x26, lo(config::LOGICAL_X_MAX), hi(config::LOGICAL_X_MAX), // Logical Maximum
    0x46, lo(config::PHYSICAL_X_MAX), hi(config::PHYSICAL_X_MAX), // Physical Maximum
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x09, 0x31, //     Usage (Y)
    0x26, lo(config::LOGICAL_Y_MAX), hi(config::LOGICAL_Y_MAX), // Logical Maximum
    0x46, lo(config::PHYSICAL_Y_MAX), hi(config::PHYSICAL_Y_MAX), // Physical Maximum
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0xC0, //   End Collection
];

const TOUCHPAD_HEADER: &[u8] = &[
    0x05, 0x0D, // Usage Page (Digitizer)
    0x09, 0x05, // Usage (Touch Pad)
    0xA1, 0x01, // Collection (Application)
    0x85, REPORT_ID_DIGITIZER, //   Report ID
];

const TRAILER: &[u8] = &[
    //   - Scan time, contact count, buttons -
    0x55, 0x0C, //   Unit Exponent (-4)
    0x66, 0x01, 0x10, //   Unit (seconds)
    0x47, 0xFF, 0xFF, 0x00, 0x00, //   Physical Maximum (65535)
    0x27, 0xFF, 0xFF, 0x00, 0x00, //   Logical Maximum (65535)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x01, //   Report Count (1)
    0x05, 0x0D, //   Usage Page (Digitizer)
    0x09, 0x56, //   Usage (Scan Time)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x55, 0x00, //   Unit Exponent (0)
    0x65, 0x00, //   Unit (none)
    0x45, 0x00, //   Physical Maximum (0)
    0x09, 0x54, //   Usage (Contact Count)
    0x25, 0x7F, //   Logical Maximum (127)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x05, 0x09, //   Usage Page (Button)
    0x09, 0x01, //   Usage (Button 1)
    0x09, 0x02, //   Usage (Button 2)
    0x09, 0x03, //   Usage (Button 3)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x03, //   Report Count (3)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x95, 0x05, //   Report Count (5)
    0x81, 0x03, //   Input (Constant) - padding
    //
    //   - Capabilities feature -
    0x05, 0x0D, //   Usage Page (Digitizer)
    0x85, REPORT_ID_FEATURE_CAPABILITIES, //   Report ID
    0x09, 0x55, //   Usage (Contact Count Maximum)
    0x09, 0x59, //   Usage (Pad Type)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x02, //   Report Count (2)
    0x25, 0x0F, //   Logical Maximum (15)
    0xB1, 0x02, //   Feature (Data, Variable, Absolute)
    //
    //   - Certification blob feature -
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x85, REPORT_ID_FEATURE_CERTIFICATION, //   Report ID
    0x09, 0xC5, //   Usage (Vendor Usage 0xC5)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x96, 0x00, 0x01, //   Report Count (256)
    0xB1, 0x02, //   Feature (Data, Variable, Absolute)
    0xC0, // End Collection (Application)
    //
    // - Device configuration -
    0x05, 0x0D, // Usage Page (Digitizer)
    0x09, 0x0E, // Usage (Device Configuration)
    0xA1, 0x01, // Collection (Application)
    0x85, REPORT_ID_FEATURE_MODE, //   Report ID
    0x09, 0x22, //   Usage (Finger)
    0xA1, 0x02, //   Collection (Logical)
    0x09, 0x52, //     Usage (Input Mode)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x0A, //     Logical Maximum (10)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0xB1, 0x02, //     Feature (Data, Variable, Absolute)
    0xC0, //   End Collection
    0x09, 0x22, //   Usage (Finger)
    0xA1, 0x00, //   Collection (Physical)
    0x85, REPORT_ID_FEATURE_SELECTIVE, //     Report ID
    0x09, 0x57, //     Usage (Surface Switch)
    0x09, 0x58, //     Usage (Button Switch)
    0x75, 0x01, //     Report Size (1)
    0x95, 0x02, //     Report Count (2)
    0x25, 0x01, //     Logical Maximum (1)
    0xB1, 0x02, //     Feature (Data, Variable, Absolute)
    0x95, 0x06, //     Report Count (6)
    0xB1, 0x03, //     Feature (Constant) - padding
    0xC0, //   End Collection
    0xC0, // End Collection
    //
    // - Mouse -
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x85, REPORT_ID_MOUSE, //   Report ID
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x03, //     Usage Maximum (Button 3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant) - padding
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x16, 0x01, 0x80, //     Logical Minimum (-32767)
    0x26, 0xFF, 0x7F, //     Logical Maximum (32767)
    0x75, 0x10, //     Report Size (16)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0x09, 0x38, //     Usage (Wheel)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection (Physical)
    0xC0, // End Collection (Application)
];

/// Build the descriptor for `fingers` contact slots (2..=[`MAX_FINGERS`]).
pub const fn build(fingers: usize) -> ReportDescriptor {
    assert!(
        fingers >= 2 && fingers <= MAX_FINGERS,
        "finger capacity must be 2..=5"
    );

    let mut desc = ReportDescriptor::new().push(TOUCHPAD_HEADER);
    let mut n = 0;
    while n < fingers {
        desc = desc.push(FINGER_COLLECTION);
        n += 1;
    }
    desc.push(TRAILER)
}

/// Descriptor for the configured finger capacity.
pub static REPORT_DESCRIPTOR: ReportDescriptor = build(config::TRACKPAD_FINGERS);
