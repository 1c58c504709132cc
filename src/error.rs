//! Unified error type for ptp-trackpad.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the crate.
///
/// None of these are fatal: each is recovered locally or handed back to
/// the caller as a return code, and processing resumes with the next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Aggregation
    /// A new contact arrived while every finger slot was occupied.
    /// The update is dropped; the rest of the burst is unaffected.
    CapacityExceeded,

    // Host requests
    /// Malformed or out-of-range feature report from the host, or a
    /// report ID this device does not serve. No state was mutated.
    UnsupportedRequest,

    // Sensor
    /// The sensor could not deliver a sample this cycle. The last
    /// published report stays in place.
    TransientUnavailable,

    /// The sensor rejected a configuration write (mode or trigger).
    Sensor,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}
