//! Application-wide constants and compile-time configuration.
//!
//! Surface geometry, finger capacity, endpoint layout and USB identity
//! live here so they can be tuned in one place.

use crate::hid::feature::{InputMode, PadType};

// Trackpad

/// Number of simultaneous finger contacts reported to the host (2..=5).
pub const TRACKPAD_FINGERS: usize = 5;

/// Input mode every endpoint starts in, and returns to after a disconnect.
///
/// The device enumerates as a relative mouse; a PTP-capable host switches
/// it to absolute reporting by writing the Input Mode feature report.
pub const DEFAULT_INPUT_MODE: InputMode = InputMode::Mouse;

/// Invert the wheel delta in relative (mouse) mode.
pub const REVERSE_SCROLL: bool = false;

/// Pad type advertised in the capabilities feature report.
pub const PAD_TYPE: PadType = PadType::NonClickable;

/// Logical coordinate range reported by the sensor in absolute mode.
pub const LOGICAL_X_MAX: u16 = 4095;
pub const LOGICAL_Y_MAX: u16 = 4095;

/// Physical surface size in 0.1 mm units.
pub const PHYSICAL_X_MAX: u16 = 720;
pub const PHYSICAL_Y_MAX: u16 = 560;

// Endpoints

/// Number of BLE profiles that can each negotiate their own mode.
pub const BLE_PROFILE_COUNT: usize = 5;

/// Logical endpoints: one USB slot plus one per BLE profile.
pub const ENDPOINT_COUNT: usize = 1 + BLE_PROFILE_COUNT;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "ptp-trackpad";
pub const USB_PRODUCT: &str = "Precision Touchpad";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 1;

/// Depth of the queue between report publication and the USB writer.
pub const REPORT_QUEUE_DEPTH: usize = 16;
