//! HID report types published to, and read by, the host.

pub mod descriptor;
pub mod feature;
pub mod mouse;
pub mod ptp;


use mouse::MouseReport;
use ptp::ContactFrame;

// Report IDs shared by the descriptor and every serialiser.

pub const REPORT_ID_MOUSE: u8 = 0x01;
pub const REPORT_ID_DIGITIZER: u8 = 0x02;
pub const REPORT_ID_FEATURE_CAPABILITIES: u8 = 0x03;
pub const REPORT_ID_FEATURE_CERTIFICATION: u8 = 0x04;
pub const REPORT_ID_FEATURE_MODE: u8 = 0x05;
pub const REPORT_ID_FEATURE_SELECTIVE: u8 = 0x06;

/// An input report on its way to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HidReport<const N: usize> {
    Ptp(ContactFrame<N>),
    Mouse(MouseReport),
}

impl<const N: usize> HidReport<N> {
    /// Serialise with the report ID prefix; 0 if `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Ptp(frame) => frame.serialize(buf),
            HidReport::Mouse(m) => m.serialize(buf),
        }
    }

    pub fn is_ptp(&self) -> bool {
        matches!(self, HidReport::Ptp(_))
    }

    pub fn is_mouse(&self) -> bool {
        matches!(self, HidReport::Mouse(_))
    }
}
