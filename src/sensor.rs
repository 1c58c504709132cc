//! Boundary with the physical sensor driver.
//!
//! The driver is split in two halves because the two halves live in
//! different execution contexts: samples are fetched in the data-ready
//! context, configuration is written from the reconciliation worker.

use crate::error::Error;
use crate::hid::feature::InputMode;
use crate::hid::ptp::FingerContact;

/// One absolute-mode data-ready event: a single finger plus a snapshot
/// of the aggregate fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FingerUpdate {
    pub contact: FingerContact,
    /// Fingers the sensor currently sees; 0 means "not reported yet".
    pub total_present: u8,
    /// Bit 0..2 = button 1..3.
    pub buttons: u8,
    /// 100 us units; 0 when the sensor did not stamp this scan.
    pub scan_time: u16,
}

/// One relative-mode data-ready event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelativeMotion {
    pub dx: i16,
    pub dy: i16,
    pub buttons: u8,
    pub wheel: i16,
}

/// A data-ready payload, shaped by the sensor's current reporting mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorSample {
    Absolute(FingerUpdate),
    Relative(RelativeMotion),
}

/// Data-ready side of the sensor.
pub trait SampleSource {
    /// Fetch the sample behind the current data-ready event.
    ///
    /// Returns [`Error::TransientUnavailable`] when the bus read failed;
    /// the caller skips the cycle.
    fn fetch(&mut self) -> Result<SensorSample, Error>;
}

/// Configuration side of the sensor.
pub trait SensorControl {
    /// Switch the sensor's own reporting format.
    fn set_input_mode(&mut self, mode: InputMode) -> Result<(), Error>;

    /// Arm or disarm the data-ready trigger.
    fn set_data_ready(&mut self, armed: bool) -> Result<(), Error>;
}

/// Free-running 100 us counter used to stamp scans the sensor left
/// unstamped.
pub trait ScanClock {
    fn now_100us(&self) -> u32;
}
