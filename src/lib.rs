//! Precision Touchpad report framing and host mode negotiation.
//!
//! Turns single-finger sensor updates into complete multi-finger HID
//! digitizer frames, and keeps the sensor's reporting mode in line with
//! what each connected host negotiated through the PTP feature reports.
//!
//! The core is `no_std` and host-testable. The embassy tasks and the
//! `embassy-usb` HID interface sit behind the `embedded` feature.
//!
//! ```text
//!  sensor data-ready ──► FrameAggregator ──► ReportStore ──► ReportSink
//!                              ▲                  ▲
//!  host SET_REPORT ──► EndpointTable ──► Coalescer ──► ModeEngine
//! ```

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod aggregator;
pub mod coalesce;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod hid;
pub mod mode;
pub mod sensor;
pub mod store;
pub mod trackpad;

#[cfg(feature = "embedded")]
pub mod runtime;
#[cfg(feature = "embedded")]
pub mod usb;

pub use aggregator::FrameAggregator;
pub use endpoint::{Endpoint, EndpointModeState};
pub use error::Error;
pub use hid::feature::InputMode;
pub use hid::HidReport;
pub use mode::ModeEngine;
pub use store::ReportSink;
pub use trackpad::Trackpad;
