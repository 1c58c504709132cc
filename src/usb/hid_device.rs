//! USB HID Precision Touchpad device.
//!
//! Generic over the `embassy-usb` driver, so any chip HAL with an
//! embassy USB driver can host it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::Driver;
use embassy_usb::{Builder, Config, Handler, UsbDevice};
use static_cell::StaticCell;

use crate::config::{self, REPORT_QUEUE_DEPTH, TRACKPAD_FINGERS};
use crate::endpoint::Endpoint;
use crate::hid::descriptor::REPORT_DESCRIPTOR;
use crate::hid::HidReport;
use crate::runtime::SharedTrackpad;

/// Largest report on the interrupt endpoint (the digitizer frame).
pub const HID_PACKET_SIZE: usize = 64;

static HID_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
// Must hold the 257-byte certification feature report.
static USB_CTRL_BUF: StaticCell<[u8; 320]> = StaticCell::new();
static FEATURE_HANDLER: StaticCell<FeatureRequestHandler> = StaticCell::new();
static USB_STATE_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();

/// Serves `GET_REPORT` / `SET_REPORT` on the control pipe.
struct FeatureRequestHandler {
    trackpad: &'static SharedTrackpad,
}

impl RequestHandler for FeatureRequestHandler {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        match id {
            ReportId::In(id) | ReportId::Feature(id) => self.trackpad.get_report(id, buf).ok(),
            ReportId::Out(_) => None,
        }
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let ReportId::Feature(id) = id else {
            warn!("Unexpected SET_REPORT for non-feature report");
            return OutResponse::Rejected;
        };

        match self.trackpad.set_feature_report(id, data, Endpoint::Usb) {
            Ok(()) => OutResponse::Accepted,
            Err(_) => OutResponse::Rejected,
        }
    }
}

/// Forgets the USB host's negotiated mode when the bus is disabled.
///
/// A bus reset keeps the record; the host re-sends the mode feature after
/// it re-enumerates.
struct UsbStateHandler {
    trackpad: &'static SharedTrackpad,
}

impl Handler for UsbStateHandler {
    fn enabled(&mut self, enabled: bool) {
        info!("USB enabled: {}", enabled);
        if let Err(e) = self.trackpad.usb_bus_enabled(enabled) {
            error!("USB disconnect not recorded: {}", e);
        }
    }

    fn reset(&mut self) {
        debug!("USB bus reset");
    }

    fn configured(&mut self, configured: bool) {
        debug!("USB configured: {}", configured);
    }
}

/// Build result containing the USB device runner and the HID writer.
pub struct UsbHidDevice<D: Driver<'static>> {
    pub device: UsbDevice<'static, D>,
    pub writer: HidWriter<'static, D, HID_PACKET_SIZE>,
}

/// Initialise the USB stack and create the touchpad HID interface.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init<D: Driver<'static>>(driver: D, trackpad: &'static SharedTrackpad) -> UsbHidDevice<D> {
    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 320]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let state_handler = USB_STATE_HANDLER.init(UsbStateHandler { trackpad });
    builder.handler(state_handler);

    let feature_handler = FEATURE_HANDLER.init(FeatureRequestHandler { trackpad });
    let hid_state = HID_STATE.init(State::new());
    let hid_config = HidConfig {
        report_descriptor: REPORT_DESCRIPTOR.as_bytes(),
        request_handler: Some(feature_handler),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: HID_PACKET_SIZE as u16,
    };
    let writer = HidWriter::new(&mut builder, hid_state, hid_config);

    let device = builder.build();

    info!(
        "USB HID touchpad initialised ({} byte report descriptor)",
        REPORT_DESCRIPTOR.as_bytes().len()
    );

    UsbHidDevice { device, writer }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
pub async fn run_usb_device<D: Driver<'static>>(mut device: UsbDevice<'static, D>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Input report forwarding task - drains the report channel into the
/// HID interrupt endpoint.
pub async fn hid_writer_task<D: Driver<'static>>(
    mut writer: HidWriter<'static, D, HID_PACKET_SIZE>,
    report_rx: Receiver<
        'static,
        CriticalSectionRawMutex,
        HidReport<TRACKPAD_FINGERS>,
        REPORT_QUEUE_DEPTH,
    >,
) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; HID_PACKET_SIZE];

    loop {
        let report = report_rx.receive().await;

        let n = report.serialize(&mut buf);
        if n == 0 {
            error!("Report does not fit the HID packet");
            continue;
        }
        if writer.write(&buf[..n]).await.is_err() {
            warn!("USB HID write failed");
        }
    }
}
