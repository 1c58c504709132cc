//! PTP feature reports: input mode, selective reporting, device
//! capabilities and the certification blob.
//!
//! Host writes (`SET_REPORT`) arrive with the report ID as the first byte
//! and must match the exact report length; anything else is rejected as
//! [`Error::UnsupportedRequest`] before it reaches the mode engine.

use super::{
    REPORT_ID_FEATURE_CAPABILITIES, REPORT_ID_FEATURE_CERTIFICATION, REPORT_ID_FEATURE_MODE,
    REPORT_ID_FEATURE_SELECTIVE,
};
use crate::error::Error;

/// Values of the HID "Input Mode" feature byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InputMode {
    /// Relative pointer: deltas, buttons and wheel in the mouse report.
    Mouse = 0,
    /// Absolute multi-touch: contacts in the digitizer report.
    Touchpad = 3,
}

impl InputMode {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    pub const fn is_mouse(self) -> bool {
        matches!(self, InputMode::Mouse)
    }
}

impl TryFrom<u8> for InputMode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Error> {
        match byte {
            0 => Ok(InputMode::Mouse),
            3 => Ok(InputMode::Touchpad),
            _ => Err(Error::UnsupportedRequest),
        }
    }
}

/// Mode feature report (report ID + 1 byte).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeReport {
    pub mode: InputMode,
}

impl ModeReport {
    pub const WIRE_SIZE: usize = 2;

    pub fn from_feature_bytes(data: &[u8]) -> Result<Self, Error> {
        match data {
            [REPORT_ID_FEATURE_MODE, mode] => Ok(Self {
                mode: InputMode::try_from(*mode)?,
            }),
            _ => Err(Error::UnsupportedRequest),
        }
    }

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < Self::WIRE_SIZE {
            return 0;
        }
        buf[0] = REPORT_ID_FEATURE_MODE;
        buf[1] = self.mode.as_byte();
        Self::WIRE_SIZE
    }
}

/// Selective reporting feature report.
///
/// Byte layout: bit 0 = surface switch, bit 1 = button switch, 6 bits
/// padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelectiveReport {
    pub surface_switch: bool,
    pub button_switch: bool,
}

impl Default for SelectiveReport {
    fn default() -> Self {
        Self {
            surface_switch: true,
            button_switch: true,
        }
    }
}

impl SelectiveReport {
    pub const WIRE_SIZE: usize = 2;

    pub fn from_feature_bytes(data: &[u8]) -> Result<Self, Error> {
        match data {
            [REPORT_ID_FEATURE_SELECTIVE, bits] => Ok(Self {
                surface_switch: bits & 0x01 != 0,
                button_switch: bits & 0x02 != 0,
            }),
            _ => Err(Error::UnsupportedRequest),
        }
    }

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < Self::WIRE_SIZE {
            return 0;
        }
        buf[0] = REPORT_ID_FEATURE_SELECTIVE;
        buf[1] = (self.surface_switch as u8) | ((self.button_switch as u8) << 1);
        Self::WIRE_SIZE
    }
}

/// HID "Pad Type" values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PadType {
    Depressible = 0,
    Pressure = 1,
    NonClickable = 2,
}

/// Capabilities feature report: max contacts (low nibble) and pad type
/// (high nibble). Fixed at build time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapabilitiesReport {
    pub max_touches: u8,
    pub pad_type: PadType,
}

impl CapabilitiesReport {
    pub const WIRE_SIZE: usize = 2;

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < Self::WIRE_SIZE {
            return 0;
        }
        buf[0] = REPORT_ID_FEATURE_CAPABILITIES;
        buf[1] = (self.max_touches & 0x0F) | ((self.pad_type as u8) << 4);
        Self::WIRE_SIZE
    }
}

/// Length of the certification (PTPHQA) blob.
pub const CERTIFICATION_BLOB_SIZE: usize = 256;

/// Certification status blob (PTPHQA).
///
/// This is the publicly documented default blob hosts accept from
/// uncertified devices; it must be returned verbatim.
pub const CERTIFICATION_BLOB: [u8; CERTIFICATION_BLOB_SIZE] = [
    0xfc, 0x28, 0xfe, 0x84, 0x40, 0xcb, 0x9a, 0x87, 0x0d, 0xbe, 0x57, 0x3c, 0xb6, 0x70, 0x09, 0x88,
    0x07, 0x97, 0x2d, 0x2b, 0xe3, 0x38, 0x34, 0xb6, 0x6c, 0xed, 0xb0, 0xf7, 0xe5, 0x9c, 0xf6, 0xc2,
    0x2e, 0x84, 0x1b, 0xe8, 0xb4, 0x51, 0x78, 0x43, 0x1f, 0x28, 0x4b, 0x7c, 0x2d, 0x53, 0xaf, 0xfc,
    0x47, 0x70, 0x1b, 0x59, 0x6f, 0x74, 0x43, 0xc4, 0xf3, 0x47, 0x18, 0x53, 0x1a, 0xa2, 0xa1, 0x71,
    0xc7, 0x95, 0x0e, 0x31, 0x55, 0x21, 0xd3, 0xb5, 0x1e, 0xe9, 0x0c, 0xba, 0xec, 0xb8, 0x89, 0x19,
    0x3e, 0xb3, 0xaf, 0x75, 0x81, 0x9d, 0x53, 0xb9, 0x41, 0x57, 0xf4, 0x6d, 0x39, 0x25, 0x29, 0x7c,
    0x87, 0xd9, 0xb4, 0x98, 0x45, 0x7d, 0xa7, 0x26, 0x9c, 0x65, 0x3b, 0x85, 0x68, 0x89, 0xd7, 0x3b,
    0xbd, 0xff, 0x14, 0x67, 0xf2, 0x2b, 0xf0, 0x2a, 0x41, 0x54, 0xf0, 0xfd, 0x2c, 0x66, 0x7c, 0xf8,
    0xc0, 0x8f, 0x33, 0x13, 0x03, 0xf1, 0xd3, 0xc1, 0x0b, 0x89, 0xd9, 0x1b, 0x62, 0xcd, 0x51, 0xb7,
    0x80, 0xb8, 0xaf, 0x3a, 0x10, 0xc1, 0x8a, 0x5b, 0xe8, 0x8a, 0x56, 0xf0, 0x8c, 0xaa, 0xfa, 0x35,
    0xe9, 0x42, 0xc4, 0xd8, 0x55, 0xc3, 0x38, 0xcc, 0x2b, 0x53, 0x5c, 0x69, 0x52, 0xd5, 0xc8, 0x73,
    0x02, 0x38, 0x7c, 0x73, 0xb6, 0x41, 0xe7, 0xff, 0x05, 0xd8, 0x2b, 0x79, 0x9a, 0xe2, 0x34, 0x60,
    0x8f, 0xa3, 0x32, 0x1f, 0x09, 0x78, 0x62, 0xbc, 0x80, 0xe3, 0x0f, 0xbd, 0x65, 0x20, 0x08, 0x13,
    0xc1, 0xe2, 0xee, 0x53, 0x2d, 0x86, 0x7e, 0xa7, 0x5a, 0xc5, 0xd3, 0x7d, 0x98, 0xbe, 0x31, 0x48,
    0x1f, 0xfb, 0xda, 0xaf, 0xa2, 0xa8, 0x6a, 0x89, 0xd6, 0xbf, 0xf2, 0xd3, 0x32, 0x2a, 0x9a, 0xe4,
    0xcf, 0x17, 0xb7, 0xb8, 0xf4, 0xe1, 0x33, 0x08, 0x24, 0x8b, 0xc4, 0x43, 0xa5, 0xe5, 0x24, 0xc2,
];

/// Certification feature report wrapper.
pub struct CertificationReport;

impl CertificationReport {
    pub const WIRE_SIZE: usize = CERTIFICATION_BLOB_SIZE + 1;

    pub fn blob(&self) -> &'static [u8; CERTIFICATION_BLOB_SIZE] {
        &CERTIFICATION_BLOB
    }

    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < Self::WIRE_SIZE {
            return 0;
        }
        buf[0] = REPORT_ID_FEATURE_CERTIFICATION;
        buf[1..Self::WIRE_SIZE].copy_from_slice(&CERTIFICATION_BLOB);
        Self::WIRE_SIZE
    }
}
