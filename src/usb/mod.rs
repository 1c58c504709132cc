//! USB transport - presents the trackpad as a single HID interface.
//!
//! One composite report descriptor carries the PTP digitizer, the device
//! configuration features and the fallback mouse. Input reports come from
//! the [`crate::runtime::ReportChannel`]; feature reports are served from
//! and written to the shared trackpad on the control pipe.

pub mod hid_device;
