//! Logical host endpoints and the per-endpoint negotiated state.
//!
//! Each endpoint's record is packed into one `AtomicU8`, so a host write
//! (transport context) and a reconciliation pass (worker context) never
//! observe a half-updated record.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::{self, BLE_PROFILE_COUNT, ENDPOINT_COUNT};
use crate::error::Error;
use crate::hid::feature::InputMode;

/// One host connection slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endpoint {
    Usb,
    Ble { profile: u8 },
}

impl Endpoint {
    /// Stable table index: USB first, then one slot per BLE profile.
    pub const fn index(self) -> usize {
        match self {
            Endpoint::Usb => 0,
            Endpoint::Ble { profile } => 1 + profile as usize,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Endpoint::Usb),
            i if i < ENDPOINT_COUNT => Some(Endpoint::Ble {
                profile: (i - 1) as u8,
            }),
            _ => None,
        }
    }

    pub const fn is_valid(self) -> bool {
        match self {
            Endpoint::Usb => true,
            Endpoint::Ble { profile } => (profile as usize) < BLE_PROFILE_COUNT,
        }
    }
}

/// Mode and selective-reporting flags recorded for one endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndpointModeState {
    pub input_mode: InputMode,
    pub surface_report: bool,
    pub button_report: bool,
}

impl EndpointModeState {
    pub const DEFAULT: Self = Self {
        input_mode: config::DEFAULT_INPUT_MODE,
        surface_report: true,
        button_report: true,
    };

    const MOUSE: u8 = 0x01;
    const SURFACE: u8 = 0x02;
    const BUTTON: u8 = 0x04;

    const fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.input_mode.is_mouse() {
            bits |= Self::MOUSE;
        }
        if self.surface_report {
            bits |= Self::SURFACE;
        }
        if self.button_report {
            bits |= Self::BUTTON;
        }
        bits
    }

    const fn from_bits(bits: u8) -> Self {
        Self {
            input_mode: if bits & Self::MOUSE != 0 {
                InputMode::Mouse
            } else {
                InputMode::Touchpad
            },
            surface_report: bits & Self::SURFACE != 0,
            button_report: bits & Self::BUTTON != 0,
        }
    }
}

impl Default for EndpointModeState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Recorded state for every logical endpoint.
pub struct EndpointTable {
    entries: [AtomicU8; ENDPOINT_COUNT],
}

impl EndpointTable {
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const INIT: AtomicU8 = AtomicU8::new(EndpointModeState::DEFAULT.to_bits());
        Self {
            entries: [INIT; ENDPOINT_COUNT],
        }
    }

    fn entry(&self, endpoint: Endpoint) -> Result<&AtomicU8, Error> {
        if !endpoint.is_valid() {
            return Err(Error::UnsupportedRequest);
        }
        self.entries
            .get(endpoint.index())
            .ok_or(Error::UnsupportedRequest)
    }

    pub fn get(&self, endpoint: Endpoint) -> Result<EndpointModeState, Error> {
        let bits = self.entry(endpoint)?.load(Ordering::Acquire);
        Ok(EndpointModeState::from_bits(bits))
    }

    pub fn set_mode(&self, endpoint: Endpoint, mode: InputMode) -> Result<(), Error> {
        let entry = self.entry(endpoint)?;
        if mode.is_mouse() {
            entry.fetch_or(EndpointModeState::MOUSE, Ordering::AcqRel);
        } else {
            entry.fetch_and(!EndpointModeState::MOUSE, Ordering::AcqRel);
        }
        Ok(())
    }

    pub fn set_selective(&self, endpoint: Endpoint, surface: bool, button: bool) -> Result<(), Error> {
        let entry = self.entry(endpoint)?;
        let mut flags = 0;
        if surface {
            flags |= EndpointModeState::SURFACE;
        }
        if button {
            flags |= EndpointModeState::BUTTON;
        }
        let keep = EndpointModeState::MOUSE;
        // Both flags land in a single store; the mode bit is preserved.
        // The closure never returns `None`, so the update cannot fail.
        entry
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((bits & keep) | flags)
            })
            .ok();
        Ok(())
    }

    /// Forget everything negotiated on `endpoint`.
    pub fn reset(&self, endpoint: Endpoint) -> Result<(), Error> {
        self.entry(endpoint)?
            .store(EndpointModeState::DEFAULT.to_bits(), Ordering::Release);
        Ok(())
    }
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self::new()
    }
}
