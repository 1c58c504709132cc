//! Shared trackpad state and its host- and sensor-facing operations.
//!
//! A [`Trackpad`] is meant to live in a `static` and be used through `&`
//! from three places: the sensor data-ready context (with its own
//! [`FrameAggregator`]), the transport (feature reads and writes, endpoint
//! changes) and the reconciliation worker ([`crate::mode::ModeEngine`]).

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::aggregator::FrameAggregator;
use crate::coalesce::Coalescer;
use crate::config;
use crate::endpoint::{Endpoint, EndpointTable};
use crate::error::Error;
use crate::hid::feature::{
    CapabilitiesReport, CertificationReport, InputMode, ModeReport, SelectiveReport,
};
use crate::hid::mouse::MouseReport;
use crate::hid::ptp::ContactFrame;
use crate::hid::{REPORT_ID_FEATURE_MODE, REPORT_ID_FEATURE_SELECTIVE};
use crate::mode::LiveModes;
use crate::sensor::{RelativeMotion, ScanClock, SensorSample};
use crate::store::{ReportSink, ReportStore};

pub struct Trackpad<K, const N: usize> {
    pub(crate) store: ReportStore<N>,
    pub(crate) endpoints: EndpointTable,
    pub(crate) live: LiveModes,
    active_endpoint: AtomicU8,
    enable_request: AtomicBool,
    pub(crate) reconcile: Coalescer,
    sink: K,
}

impl<K: ReportSink<N>, const N: usize> Trackpad<K, N> {
    pub const fn new(sink: K) -> Self {
        Self {
            store: ReportStore::new(),
            endpoints: EndpointTable::new(),
            live: LiveModes::new(),
            active_endpoint: AtomicU8::new(0),
            enable_request: AtomicBool::new(true),
            reconcile: Coalescer::new(),
            sink,
        }
    }

    /// Ask the worker for the initial configuration pass.
    pub fn start(&self) {
        self.reconcile.submit();
    }

    pub fn store(&self) -> &ReportStore<N> {
        &self.store
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn live(&self) -> &LiveModes {
        &self.live
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn reconcile_pending(&self) -> bool {
        self.reconcile.is_pending()
    }

    /// Wait for a requested reconciliation pass and claim it.
    pub async fn wait_reconcile(&self) {
        self.reconcile.wait().await
    }

    // Sensor side

    /// Handle one data-ready event.
    ///
    /// Samples are routed by the live mode; a sample of the other shape
    /// (the sensor has not switched yet) is dropped. A failed fetch
    /// leaves every published report untouched.
    pub fn on_data_ready<C: ScanClock>(
        &self,
        aggregator: &mut FrameAggregator<C, N>,
        sample: Result<SensorSample, Error>,
    ) -> Result<(), Error> {
        if !self.live.enabled() {
            return Ok(());
        }

        let sample = sample.map_err(|e| {
            warn!("Sensor fetch failed: {}", e);
            e
        })?;

        aggregator.sync_generation(self.live.generation());

        match (self.live.mode(), sample) {
            (Some(InputMode::Touchpad), SensorSample::Absolute(update)) => aggregator
                .ingest_finger_update(update, self.live.selective(), |frame| {
                    self.publish_ptp(frame)
                }),
            (Some(InputMode::Mouse), SensorSample::Relative(motion)) => {
                self.ingest_relative(motion);
                Ok(())
            }
            (mode, _) => {
                debug!("Sample does not match live mode {}, dropped", mode);
                Ok(())
            }
        }
    }

    /// Publish one relative-mode sample as a mouse report.
    pub fn ingest_relative(&self, motion: RelativeMotion) {
        let report = MouseReport::from_motion(
            motion.buttons,
            motion.dx,
            motion.dy,
            motion.wheel,
            config::REVERSE_SCROLL,
        );
        self.publish_mouse(report);
    }

    pub(crate) fn publish_ptp(&self, frame: ContactFrame<N>) {
        self.store.set_digitizer(frame);
        self.sink.send_ptp_report(&frame);
    }

    pub(crate) fn publish_mouse(&self, report: MouseReport) {
        self.store.set_mouse(report);
        self.sink.send_mouse_report(&report);
    }

    // Host side

    /// Record `mode` for `endpoint` and schedule reconciliation.
    pub fn request_mode(&self, endpoint: Endpoint, mode: InputMode) -> Result<(), Error> {
        self.endpoints.set_mode(endpoint, mode)?;
        debug!("{} requested input mode {}", endpoint, mode);
        self.reconcile.submit();
        Ok(())
    }

    /// Host wrote the Input Mode byte.
    pub fn set_mode_report(&self, mode: u8, endpoint: Endpoint) -> Result<(), Error> {
        let mode = InputMode::try_from(mode).map_err(|e| {
            error!("Invalid input mode {} from {}", mode, endpoint);
            e
        })?;
        self.request_mode(endpoint, mode)
    }

    pub fn request_selective(
        &self,
        endpoint: Endpoint,
        surface: bool,
        button: bool,
    ) -> Result<(), Error> {
        self.endpoints.set_selective(endpoint, surface, button)?;
        debug!(
            "{} requested selective reporting {}, {}",
            endpoint,
            surface,
            button
        );
        self.reconcile.submit();
        Ok(())
    }

    /// Host wrote the selective reporting flags.
    pub fn set_selective_report(
        &self,
        surface: bool,
        button: bool,
        endpoint: Endpoint,
    ) -> Result<(), Error> {
        self.request_selective(endpoint, surface, button)
    }

    /// Parse and apply a host `SET_REPORT(Feature)`. `data` starts with
    /// the report ID.
    pub fn set_feature_report(
        &self,
        report_id: u8,
        data: &[u8],
        endpoint: Endpoint,
    ) -> Result<(), Error> {
        match report_id {
            REPORT_ID_FEATURE_MODE => {
                let report = ModeReport::from_feature_bytes(data)?;
                self.request_mode(endpoint, report.mode)
            }
            REPORT_ID_FEATURE_SELECTIVE => {
                let report = SelectiveReport::from_feature_bytes(data)?;
                self.request_selective(endpoint, report.surface_switch, report.button_switch)
            }
            _ => {
                error!("Invalid report ID {} written", report_id);
                Err(Error::UnsupportedRequest)
            }
        }
    }

    /// The host connection that currently receives reports changed.
    pub fn select_endpoint(&self, endpoint: Endpoint) -> Result<(), Error> {
        if !endpoint.is_valid() {
            return Err(Error::UnsupportedRequest);
        }
        info!("Active endpoint: {}", endpoint);
        self.active_endpoint
            .store(endpoint.index() as u8, Ordering::Release);
        self.reconcile.submit();
        Ok(())
    }

    pub fn active_endpoint(&self) -> Endpoint {
        Endpoint::from_index(self.active_endpoint.load(Ordering::Acquire) as usize)
            .unwrap_or(Endpoint::Usb)
    }

    /// Forget what `endpoint` negotiated; it starts over on reconnect.
    pub fn endpoint_disconnected(&self, endpoint: Endpoint) -> Result<(), Error> {
        self.endpoints.reset(endpoint)?;
        info!("{} disconnected, mode reset", endpoint);
        self.reconcile.submit();
        Ok(())
    }

    /// USB bus power change. Only a disabled bus drops the USB record.
    pub fn usb_bus_enabled(&self, enabled: bool) -> Result<(), Error> {
        if enabled {
            return Ok(());
        }
        self.endpoint_disconnected(Endpoint::Usb)
    }

    /// Deferred enable/disable, safe from any context.
    pub fn request_enabled(&self, enabled: bool) {
        self.record_enable_request(enabled);
        self.reconcile.submit();
    }

    pub fn get_enabled(&self) -> bool {
        self.live.enabled()
    }

    pub(crate) fn enable_requested(&self) -> bool {
        self.enable_request.load(Ordering::Acquire)
    }

    pub(crate) fn record_enable_request(&self, enabled: bool) {
        self.enable_request.store(enabled, Ordering::Release);
    }

    // Transport reads

    pub fn get_current_digitizer_report(&self) -> ContactFrame<N> {
        self.store.digitizer()
    }

    pub fn get_current_mouse_report(&self) -> MouseReport {
        self.store.mouse()
    }

    pub fn get_feature_selective_report(&self) -> SelectiveReport {
        self.store.selective()
    }

    pub fn get_feature_mode_report(&self) -> ModeReport {
        self.store.mode()
    }

    pub fn get_feature_capabilities_report(&self) -> CapabilitiesReport {
        self.store.capabilities()
    }

    pub fn get_feature_certification_report(&self) -> CertificationReport {
        self.store.certification()
    }

    /// Serialise any report for a host `GET_REPORT`.
    pub fn get_report(&self, report_id: u8, buf: &mut [u8]) -> Result<usize, Error> {
        self.store.get_report(report_id, buf)
    }
}
