//! Live sensor mode and the reconciliation worker that drives it.
//!
//! Host requests only record what an endpoint asked for (see
//! [`crate::endpoint`]). The [`ModeEngine`] is the single writer of the
//! live state: it reads the active endpoint's record, reconfigures the
//! sensor, and publishes one neutral report whenever the host would
//! otherwise be left holding a stale contact or button.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::endpoint::EndpointModeState;
use crate::hid::feature::{InputMode, SelectiveReport};
use crate::hid::mouse::MouseReport;
use crate::hid::ptp::ContactFrame;
use crate::sensor::SensorControl;
use crate::store::ReportSink;
use crate::trackpad::Trackpad;

const UNCONFIGURED: u8 = 0xFF;

/// Flags the ingestion path reads on every data-ready event.
pub struct LiveModes {
    mode: AtomicU8,
    surface: AtomicBool,
    button: AtomicBool,
    enabled: AtomicBool,
    /// Bumped whenever buffered contacts stop being valid.
    generation: AtomicU8,
}

impl LiveModes {
    pub const fn new() -> Self {
        Self {
            mode: AtomicU8::new(UNCONFIGURED),
            surface: AtomicBool::new(true),
            button: AtomicBool::new(true),
            enabled: AtomicBool::new(false),
            generation: AtomicU8::new(0),
        }
    }

    /// Mode the sensor is currently configured for; `None` before the
    /// first reconciliation pass.
    pub fn mode(&self) -> Option<InputMode> {
        InputMode::try_from(self.mode.load(Ordering::Acquire)).ok()
    }

    pub fn selective(&self) -> SelectiveReport {
        SelectiveReport {
            surface_switch: self.surface.load(Ordering::Acquire),
            button_switch: self.button.load(Ordering::Acquire),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u8 {
        self.generation.load(Ordering::Acquire)
    }

    fn set_mode(&self, mode: InputMode) {
        self.mode.store(mode.as_byte(), Ordering::Release);
    }

    fn set_selective(&self, selective: SelectiveReport) {
        self.surface.store(selective.surface_switch, Ordering::Release);
        self.button.store(selective.button_switch, Ordering::Release);
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for LiveModes {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconciliation worker. Owns the configuration side of the sensor.
pub struct ModeEngine<S> {
    sensor: S,
    passes: u32,
}

impl<S: SensorControl> ModeEngine<S> {
    pub fn new(sensor: S) -> Self {
        Self { sensor, passes: 0 }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Reconciliation passes run so far.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Run one pass if one was requested since the last.
    pub fn run_pending<K, const N: usize>(&mut self, tp: &Trackpad<K, N>) -> bool
    where
        K: ReportSink<N>,
    {
        if !tp.reconcile.try_take() {
            return false;
        }
        self.reconcile(tp);
        true
    }

    /// Bring the live state in line with the active endpoint's record
    /// and the latest enable request.
    pub fn reconcile<K, const N: usize>(&mut self, tp: &Trackpad<K, N>)
    where
        K: ReportSink<N>,
    {
        self.passes = self.passes.wrapping_add(1);

        let endpoint = tp.active_endpoint();
        let state = tp.endpoints.get(endpoint).unwrap_or_else(|e| {
            warn!("No record for {}: {}", endpoint, e);
            EndpointModeState::DEFAULT
        });

        if tp.live.mode() != Some(state.input_mode) {
            self.apply_mode(tp, state.input_mode);
        }

        let selective = SelectiveReport {
            surface_switch: state.surface_report,
            button_switch: state.button_report,
        };
        tp.live.set_selective(selective);
        tp.store.set_selective(selective);

        self.set_enabled(tp, tp.enable_requested());
    }

    /// Switch the sensor and the ingestion path to `mode`.
    pub fn apply_mode<K, const N: usize>(&mut self, tp: &Trackpad<K, N>, mode: InputMode)
    where
        K: ReportSink<N>,
    {
        info!("Setting input mode to {}", mode);

        if let Err(e) = self.sensor.set_input_mode(mode) {
            error!("Sensor rejected input mode {}: {}", mode, e);
        }

        Self::publish_neutral(tp, tp.live.mode());

        tp.live.set_mode(mode);
        tp.live.bump_generation();
        tp.store.set_mode(mode);

        if tp.live.enabled() {
            self.arm(true);
        }
    }

    /// Start or stop reporting. Repeating the current state is a no-op.
    pub fn set_enabled<K, const N: usize>(&mut self, tp: &Trackpad<K, N>, enabled: bool)
    where
        K: ReportSink<N>,
    {
        tp.record_enable_request(enabled);
        if tp.live.enabled() == enabled {
            return;
        }

        if enabled {
            info!("Trackpad enabled");
            tp.live.set_enabled(true);
            self.arm(true);
        } else {
            info!("Trackpad disabled");
            tp.live.set_enabled(false);
            tp.live.bump_generation();
            Self::publish_neutral(tp, tp.live.mode());
            self.arm(false);
        }
    }

    /// Release every contact and button the host may still hold for `mode`.
    fn publish_neutral<K, const N: usize>(tp: &Trackpad<K, N>, mode: Option<InputMode>)
    where
        K: ReportSink<N>,
    {
        match mode {
            Some(InputMode::Mouse) => tp.publish_mouse(MouseReport::empty()),
            Some(InputMode::Touchpad) => {
                let scan_time = tp.store.digitizer().scan_time.wrapping_add(1);
                tp.publish_ptp(ContactFrame::neutral(scan_time, 0));
            }
            None => {}
        }
    }

    fn arm(&mut self, armed: bool) {
        if let Err(e) = self.sensor.set_data_ready(armed) {
            error!("Failed to set data-ready trigger to {}: {}", armed, e);
        }
    }
}
