//! Embassy tasks that drive a static [`Trackpad`].
//!
//! Two contexts touch the trackpad: the sensor loop (waits on the
//! data-ready pin, owns the [`FrameAggregator`]) and the reconciliation
//! worker (owns the [`ModeEngine`] and the sensor's configuration side).
//! Published reports leave through a bounded channel drained by the
//! transport writer.
//!
//! ```ignore
//! static REPORTS: ReportChannel<TRACKPAD_FINGERS> = Channel::new();
//! static TRACKPAD: SharedTrackpad = Trackpad::new(ChannelSink::new(&REPORTS));
//! ```

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Instant, Timer};
use embedded_hal_async::digital::Wait;

use crate::aggregator::FrameAggregator;
use crate::config::{REPORT_QUEUE_DEPTH, TRACKPAD_FINGERS};
use crate::hid::mouse::MouseReport;
use crate::hid::ptp::ContactFrame;
use crate::hid::HidReport;
use crate::mode::ModeEngine;
use crate::sensor::{SampleSource, ScanClock, SensorControl};
use crate::store::ReportSink;
use crate::trackpad::Trackpad;

/// Queue between report publication and the transport writer.
pub type ReportChannel<const N: usize> =
    Channel<CriticalSectionRawMutex, HidReport<N>, REPORT_QUEUE_DEPTH>;

/// Trackpad at the configured finger capacity, feeding a [`ReportChannel`].
pub type SharedTrackpad = Trackpad<ChannelSink<TRACKPAD_FINGERS>, TRACKPAD_FINGERS>;

/// Forwards every published report into a [`ReportChannel`].
///
/// Never blocks: a full queue drops the report.
pub struct ChannelSink<const N: usize> {
    channel: &'static ReportChannel<N>,
}

impl<const N: usize> ChannelSink<N> {
    pub const fn new(channel: &'static ReportChannel<N>) -> Self {
        Self { channel }
    }
}

impl<const N: usize> ReportSink<N> for ChannelSink<N> {
    fn send_ptp_report(&self, report: &ContactFrame<N>) {
        if self.channel.try_send(HidReport::Ptp(*report)).is_err() {
            warn!("Report queue full, digitizer frame dropped");
        }
    }

    fn send_mouse_report(&self, report: &MouseReport) {
        if self.channel.try_send(HidReport::Mouse(*report)).is_err() {
            warn!("Report queue full, mouse report dropped");
        }
    }
}

/// Scan clock backed by the embassy time driver.
pub struct EmbassyClock;

impl ScanClock for EmbassyClock {
    fn now_100us(&self) -> u32 {
        // Truncation is the wrap the scan time field expects.
        (Instant::now().as_micros() / 100) as u32
    }
}

/// Sensor loop: one [`SampleSource::fetch`] per data-ready edge.
///
/// The data-ready line is active low.
pub async fn sensor_task<K, P, S, const N: usize>(
    tp: &'static Trackpad<K, N>,
    mut data_ready: P,
    mut source: S,
) -> !
where
    K: ReportSink<N>,
    P: Wait,
    S: SampleSource,
{
    info!("Sensor task started");
    let mut aggregator = FrameAggregator::new(EmbassyClock);

    loop {
        if data_ready.wait_for_low().await.is_err() {
            error!("Data-ready pin wait failed");
            Timer::after_millis(10).await;
            continue;
        }

        // Failures are logged at the source and retried on the next edge.
        let _ = tp.on_data_ready(&mut aggregator, source.fetch());
    }
}

/// Reconciliation worker: one pass per (coalesced) request.
pub async fn reconcile_task<K, S, const N: usize>(
    tp: &'static Trackpad<K, N>,
    mut engine: ModeEngine<S>,
) -> !
where
    K: ReportSink<N>,
    S: SensorControl,
{
    info!("Reconcile task started");
    tp.start();

    loop {
        tp.wait_reconcile().await;
        engine.reconcile(tp);
    }
}

/// Run both trackpad contexts in a single task.
pub async fn run<K, P, S, C, const N: usize>(
    tp: &'static Trackpad<K, N>,
    data_ready: P,
    source: S,
    control: C,
) -> !
where
    K: ReportSink<N>,
    P: Wait,
    S: SampleSource,
    C: SensorControl,
{
    match select(
        sensor_task(tp, data_ready, source),
        reconcile_task(tp, ModeEngine::new(control)),
    )
    .await
    {
        Either::First(never) => never,
        Either::Second(never) => never,
    }
}
