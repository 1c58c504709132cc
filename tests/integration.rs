//! Integration tests for ptp-trackpad: full sensor-to-host scenarios
//! through the public API, with a recording transport and a fake sensor.

use core::cell::{Cell, RefCell};

use heapless::Vec;
use ptp_trackpad::hid::mouse::MouseReport;
use ptp_trackpad::hid::ptp::{ContactFrame, FingerContact};
use ptp_trackpad::hid::{
    REPORT_ID_DIGITIZER, REPORT_ID_FEATURE_CAPABILITIES, REPORT_ID_FEATURE_CERTIFICATION,
    REPORT_ID_FEATURE_MODE, REPORT_ID_FEATURE_SELECTIVE, REPORT_ID_MOUSE,
};
use ptp_trackpad::sensor::{FingerUpdate, RelativeMotion, ScanClock, SensorControl, SensorSample};
use ptp_trackpad::{
    Endpoint, EndpointModeState, Error, FrameAggregator, HidReport, InputMode, ModeEngine,
    ReportSink, Trackpad,
};

const N: usize = 5;

// ═══════════════════════════════════════════════════════════════════════════
// Fakes
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct RecordingSink {
    reports: RefCell<Vec<HidReport<N>, 64>>,
}

impl RecordingSink {
    fn take(&self) -> Vec<HidReport<N>, 64> {
        core::mem::take(&mut *self.reports.borrow_mut())
    }
}

impl ReportSink<N> for RecordingSink {
    fn send_ptp_report(&self, report: &ContactFrame<N>) {
        self.reports
            .borrow_mut()
            .push(HidReport::Ptp(*report))
            .expect("recording sink full");
    }

    fn send_mouse_report(&self, report: &MouseReport) {
        self.reports
            .borrow_mut()
            .push(HidReport::Mouse(*report))
            .expect("recording sink full");
    }
}

#[derive(Default)]
struct FakeSensor {
    modes: Vec<InputMode, 16>,
    armed: Vec<bool, 16>,
}

impl SensorControl for FakeSensor {
    fn set_input_mode(&mut self, mode: InputMode) -> Result<(), Error> {
        self.modes.push(mode).map_err(|_| Error::BufferOverflow)
    }

    fn set_data_ready(&mut self, armed: bool) -> Result<(), Error> {
        self.armed.push(armed).map_err(|_| Error::BufferOverflow)
    }
}

struct FakeClock(Cell<u32>);

impl ScanClock for FakeClock {
    fn now_100us(&self) -> u32 {
        self.0.get()
    }
}

struct Rig {
    tp: Trackpad<RecordingSink, N>,
    engine: ModeEngine<FakeSensor>,
    agg: FrameAggregator<FakeClock, N>,
}

impl Rig {
    /// Booted and reconciled once: default mode, reporting enabled.
    fn booted() -> Self {
        let mut rig = Rig {
            tp: Trackpad::new(RecordingSink::default()),
            engine: ModeEngine::new(FakeSensor::default()),
            agg: FrameAggregator::new(FakeClock(Cell::new(0))),
        };
        rig.tp.start();
        assert!(rig.engine.run_pending(&rig.tp));
        rig
    }

    fn booted_touchpad() -> Self {
        let mut rig = Self::booted();
        rig.tp.set_mode_report(3, Endpoint::Usb).unwrap();
        assert!(rig.engine.run_pending(&rig.tp));
        rig.tp.sink().take();
        rig
    }

    fn finger(&mut self, id: u8, x: i16, y: i16, present: u8) -> Result<(), Error> {
        self.update(FingerUpdate {
            contact: FingerContact::from_confidence_tip(id, x, y, 0x03),
            total_present: present,
            buttons: 0,
            scan_time: 100,
        })
    }

    fn update(&mut self, update: FingerUpdate) -> Result<(), Error> {
        self.tp
            .on_data_ready(&mut self.agg, Ok(SensorSample::Absolute(update)))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Startup & Mode Negotiation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn boot_configures_default_mode_silently() {
    let rig = Rig::booted();

    assert_eq!(rig.tp.live().mode(), Some(InputMode::Mouse));
    assert!(rig.tp.get_enabled());
    assert_eq!(rig.engine.sensor().modes.as_slice(), &[InputMode::Mouse]);
    assert_eq!(rig.engine.sensor().armed.as_slice(), &[true]);
    // Nothing to release on first configuration.
    assert!(rig.tp.sink().take().is_empty());
}

#[test]
fn switching_to_touchpad_releases_mouse_once() {
    let mut rig = Rig::booted();

    rig.tp
        .set_feature_report(REPORT_ID_FEATURE_MODE, &[REPORT_ID_FEATURE_MODE, 3], Endpoint::Usb)
        .unwrap();
    assert!(rig.tp.reconcile_pending());
    assert!(rig.engine.run_pending(&rig.tp));

    let sent = rig.tp.sink().take();
    assert_eq!(sent.as_slice(), &[HidReport::Mouse(MouseReport::empty())]);
    assert_eq!(rig.tp.live().mode(), Some(InputMode::Touchpad));
    assert_eq!(rig.tp.get_feature_mode_report().mode, InputMode::Touchpad);
    assert_eq!(
        rig.engine.sensor().modes.as_slice(),
        &[InputMode::Mouse, InputMode::Touchpad]
    );

    let mut buf = [0u8; 8];
    assert_eq!(rig.tp.get_report(REPORT_ID_FEATURE_MODE, &mut buf), Ok(2));
    assert_eq!(&buf[..2], &[REPORT_ID_FEATURE_MODE, 3]);
}

#[test]
fn leaving_touchpad_sends_empty_frame_after_last_scan() {
    let mut rig = Rig::booted_touchpad();
    rig.finger(0, 10, 10, 1).unwrap();
    assert_eq!(rig.tp.get_current_digitizer_report().scan_time, 100);
    rig.tp.sink().take();

    rig.tp.set_mode_report(0, Endpoint::Usb).unwrap();
    rig.engine.run_pending(&rig.tp);

    let sent = rig.tp.sink().take();
    assert_eq!(sent.len(), 1);
    match sent[0] {
        HidReport::Ptp(frame) => {
            assert_eq!(frame.contact_count, 0);
            assert_eq!(frame.scan_time, 101);
            assert_eq!(frame.buttons(), 0);
        }
        HidReport::Mouse(_) => panic!("expected neutral digitizer frame"),
    }
}

#[test]
fn same_mode_request_publishes_nothing() {
    let mut rig = Rig::booted();
    rig.tp.request_mode(Endpoint::Usb, InputMode::Mouse).unwrap();
    assert!(rig.engine.run_pending(&rig.tp));

    assert!(rig.tp.sink().take().is_empty());
    assert_eq!(rig.engine.sensor().modes.len(), 1);
}

#[test]
fn requests_coalesce_into_one_pass() {
    let mut rig = Rig::booted();
    let passes = rig.engine.passes();

    rig.tp.set_mode_report(3, Endpoint::Usb).unwrap();
    rig.tp.set_mode_report(0, Endpoint::Usb).unwrap();
    rig.tp.set_selective_report(false, true, Endpoint::Usb).unwrap();
    rig.tp.set_mode_report(3, Endpoint::Usb).unwrap();
    rig.tp.request_enabled(true);

    assert!(rig.engine.run_pending(&rig.tp));
    assert!(!rig.engine.run_pending(&rig.tp));
    assert_eq!(rig.engine.passes(), passes + 1);

    // Only the final recorded state was applied.
    assert_eq!(
        rig.engine.sensor().modes.as_slice(),
        &[InputMode::Mouse, InputMode::Touchpad]
    );
    assert_eq!(rig.tp.sink().take().len(), 1);
    let selective = rig.tp.get_feature_selective_report();
    assert!(!selective.surface_switch);
    assert!(selective.button_switch);
}

#[test]
fn invalid_requests_mutate_nothing() {
    let mut rig = Rig::booted();

    assert_eq!(
        rig.tp.set_mode_report(2, Endpoint::Usb),
        Err(Error::UnsupportedRequest)
    );
    assert_eq!(
        rig.tp.set_feature_report(REPORT_ID_FEATURE_MODE, &[REPORT_ID_FEATURE_MODE], Endpoint::Usb),
        Err(Error::UnsupportedRequest)
    );
    assert_eq!(
        rig.tp.set_feature_report(REPORT_ID_FEATURE_CAPABILITIES, &[3, 0x25], Endpoint::Usb),
        Err(Error::UnsupportedRequest)
    );
    assert_eq!(
        rig.tp.set_mode_report(3, Endpoint::Ble { profile: 9 }),
        Err(Error::UnsupportedRequest)
    );

    assert!(!rig.tp.reconcile_pending());
    assert!(!rig.engine.run_pending(&rig.tp));
    assert_eq!(
        rig.tp.endpoints().get(Endpoint::Usb),
        Ok(EndpointModeState::DEFAULT)
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Enable / Disable
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn set_enabled_is_idempotent() {
    let mut rig = Rig::booted_touchpad();
    let Rig { tp, engine, .. } = &mut rig;
    let arms = engine.sensor().armed.len();

    engine.set_enabled(tp, false);
    engine.set_enabled(tp, false);

    assert!(!tp.get_enabled());
    assert_eq!(tp.sink().take().len(), 1);
    assert_eq!(&engine.sensor().armed[arms..], &[false]);

    engine.set_enabled(tp, true);
    engine.set_enabled(tp, true);
    assert!(tp.get_enabled());
    assert!(tp.sink().take().is_empty());
    assert_eq!(&engine.sensor().armed[arms..], &[false, true]);
}

#[test]
fn deferred_disable_drops_samples() {
    let mut rig = Rig::booted_touchpad();
    rig.tp.request_enabled(false);
    rig.engine.run_pending(&rig.tp);
    rig.tp.sink().take();

    rig.finger(0, 1, 1, 1).unwrap();
    assert!(rig.tp.sink().take().is_empty());
    assert!(!rig.tp.get_enabled());
}

// ═══════════════════════════════════════════════════════════════════════════
// Frame Aggregation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn three_finger_burst_yields_one_frame() {
    let mut rig = Rig::booted_touchpad();

    rig.finger(0, 100, 200, 3).unwrap();
    rig.finger(1, 300, 400, 3).unwrap();
    assert!(rig.tp.sink().take().is_empty());
    rig.finger(2, 500, 600, 3).unwrap();

    let sent = rig.tp.sink().take();
    assert_eq!(sent.len(), 1);
    let HidReport::Ptp(frame) = sent[0] else {
        panic!("expected digitizer frame");
    };
    assert_eq!(frame.contact_count, 3);
    assert_eq!(
        frame.contacts().iter().map(|f| f.contact_id).collect::<Vec<u8, 5>>(),
        [0, 1, 2]
    );
    assert_eq!(frame.fingers[3], FingerContact::EMPTY);
    assert_eq!(frame.fingers[4], FingerContact::EMPTY);
    assert_eq!(rig.tp.get_current_digitizer_report(), frame);

    let mut buf = [0u8; 64];
    let written = rig.tp.get_report(REPORT_ID_DIGITIZER, &mut buf).unwrap();
    assert_eq!(written, ContactFrame::<N>::WIRE_SIZE);
    assert_eq!(buf[0], REPORT_ID_DIGITIZER);
    assert_eq!(buf[written - 2], 3);
}

#[test]
fn consecutive_bursts_with_changing_ids() {
    let mut rig = Rig::booted_touchpad();
    let bursts: [&[u8]; 4] = [&[0, 1, 2, 3, 4], &[5, 6, 7, 8, 9], &[1, 9], &[10, 11, 12, 13, 14]];

    for ids in bursts {
        for (i, &id) in ids.iter().enumerate() {
            let at = 10 * i16::from(id);
            rig.finger(id, at, at + 1, ids.len() as u8).unwrap();
        }

        let sent = rig.tp.sink().take();
        assert_eq!(sent.len(), 1, "burst {ids:?}");
        let HidReport::Ptp(frame) = sent[0] else {
            panic!("expected digitizer frame");
        };
        assert_eq!(usize::from(frame.contact_count), ids.len());
        assert_eq!(
            frame.contacts().iter().map(|f| f.contact_id).collect::<Vec<u8, 5>>(),
            ids
        );
        for contact in frame.contacts() {
            assert_eq!(contact.x, 10 * i16::from(contact.contact_id));
        }
        for slot in &frame.fingers[ids.len()..] {
            assert_eq!(*slot, FingerContact::EMPTY);
        }

        let mut buf = [0u8; 64];
        let written = rig.tp.get_report(REPORT_ID_DIGITIZER, &mut buf).unwrap();
        assert_eq!(usize::from(buf[written - 2]), ids.len());
    }
}

#[test]
fn selective_surface_off_reports_buttons_only() {
    let mut rig = Rig::booted_touchpad();
    rig.tp
        .set_feature_report(
            REPORT_ID_FEATURE_SELECTIVE,
            &[REPORT_ID_FEATURE_SELECTIVE, 0x02],
            Endpoint::Usb,
        )
        .unwrap();
    rig.engine.run_pending(&rig.tp);

    let mut buf = [0u8; 2];
    rig.tp
        .get_report(REPORT_ID_FEATURE_SELECTIVE, &mut buf)
        .unwrap();
    assert_eq!(buf, [REPORT_ID_FEATURE_SELECTIVE, 0x02]);

    for id in 0..2 {
        rig.update(FingerUpdate {
            contact: FingerContact::from_confidence_tip(id, 50, 50, 0x03),
            total_present: 2,
            buttons: 0x01,
            scan_time: 7,
        })
        .unwrap();
    }

    let sent = rig.tp.sink().take();
    assert_eq!(sent.len(), 2);
    for report in &sent {
        let HidReport::Ptp(frame) = report else {
            panic!("expected digitizer frame");
        };
        assert_eq!(frame.contact_count, 0);
        assert!(frame.button1);
        assert_eq!(frame.fingers, [FingerContact::EMPTY; N]);
    }
}

#[test]
fn transient_fetch_failure_keeps_last_report() {
    let mut rig = Rig::booted_touchpad();
    rig.finger(0, 1, 2, 1).unwrap();
    let before = rig.tp.get_current_digitizer_report();
    rig.tp.sink().take();

    let r = rig
        .tp
        .on_data_ready(&mut rig.agg, Err(Error::TransientUnavailable));
    assert_eq!(r, Err(Error::TransientUnavailable));
    assert!(rig.tp.sink().take().is_empty());
    assert_eq!(rig.tp.get_current_digitizer_report(), before);
}

#[test]
fn mode_change_discards_partial_burst() {
    let mut rig = Rig::booted_touchpad();
    rig.finger(0, 1, 1, 2).unwrap();

    rig.tp.set_mode_report(0, Endpoint::Usb).unwrap();
    rig.engine.run_pending(&rig.tp);
    rig.tp.set_mode_report(3, Endpoint::Usb).unwrap();
    rig.engine.run_pending(&rig.tp);
    rig.tp.sink().take();

    rig.finger(1, 2, 2, 1).unwrap();
    let sent = rig.tp.sink().take();
    let HidReport::Ptp(frame) = sent[0] else {
        panic!("expected digitizer frame");
    };
    assert_eq!(frame.contact_count, 1);
    assert_eq!(frame.fingers[0].contact_id, 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Relative Mode
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn relative_samples_become_mouse_reports() {
    let mut rig = Rig::booted();
    let motion = RelativeMotion {
        dx: -5,
        dy: 12,
        buttons: 0x02,
        wheel: 1,
    };
    rig.tp
        .on_data_ready(&mut rig.agg, Ok(SensorSample::Relative(motion)))
        .unwrap();

    let expected = MouseReport {
        buttons: 0x02,
        x: -5,
        y: 12,
        wheel: 1,
    };
    assert_eq!(rig.tp.sink().take().as_slice(), &[HidReport::Mouse(expected)]);

    let mut buf = [0u8; 8];
    assert_eq!(rig.tp.get_report(REPORT_ID_MOUSE, &mut buf), Ok(7));
    assert_eq!(&buf[..7], &[REPORT_ID_MOUSE, 0x02, 0xFB, 0xFF, 0x0C, 0x00, 0x01]);
}

#[test]
fn sample_of_wrong_shape_is_dropped() {
    let mut rig = Rig::booted_touchpad();
    rig.tp
        .on_data_ready(
            &mut rig.agg,
            Ok(SensorSample::Relative(RelativeMotion::default())),
        )
        .unwrap();
    assert!(rig.tp.sink().take().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Endpoints
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn each_endpoint_keeps_its_own_mode() {
    let mut rig = Rig::booted();
    let ble = Endpoint::Ble { profile: 1 };

    rig.tp.set_mode_report(3, ble).unwrap();
    rig.engine.run_pending(&rig.tp);
    // USB is still active and still in mouse mode.
    assert_eq!(rig.tp.live().mode(), Some(InputMode::Mouse));

    rig.tp.select_endpoint(ble).unwrap();
    rig.engine.run_pending(&rig.tp);
    assert_eq!(rig.tp.active_endpoint(), ble);
    assert_eq!(rig.tp.live().mode(), Some(InputMode::Touchpad));

    rig.tp.select_endpoint(Endpoint::Usb).unwrap();
    rig.engine.run_pending(&rig.tp);
    assert_eq!(rig.tp.live().mode(), Some(InputMode::Mouse));
}

#[test]
fn disconnect_resets_endpoint_and_live_mode() {
    let mut rig = Rig::booted();
    let ble = Endpoint::Ble { profile: 0 };
    rig.tp.select_endpoint(ble).unwrap();
    rig.tp.set_mode_report(3, ble).unwrap();
    rig.tp.set_selective_report(false, false, ble).unwrap();
    rig.engine.run_pending(&rig.tp);
    assert_eq!(rig.tp.live().mode(), Some(InputMode::Touchpad));
    rig.tp.sink().take();

    rig.tp.endpoint_disconnected(ble).unwrap();
    rig.engine.run_pending(&rig.tp);

    assert_eq!(rig.tp.endpoints().get(ble), Ok(EndpointModeState::DEFAULT));
    assert_eq!(rig.tp.live().mode(), Some(InputMode::Mouse));
    let selective = rig.tp.get_feature_selective_report();
    assert!(selective.surface_switch && selective.button_switch);

    let sent = rig.tp.sink().take();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_ptp());
}

#[test]
fn usb_record_survives_until_bus_disabled() {
    let mut rig = Rig::booted_touchpad();

    rig.tp.usb_bus_enabled(true).unwrap();
    assert!(!rig.engine.run_pending(&rig.tp));
    assert_eq!(
        rig.tp.endpoints().get(Endpoint::Usb).map(|s| s.input_mode),
        Ok(InputMode::Touchpad)
    );
    assert_eq!(rig.tp.live().mode(), Some(InputMode::Touchpad));
    assert!(rig.tp.sink().take().is_empty());

    rig.tp.usb_bus_enabled(false).unwrap();
    assert!(rig.engine.run_pending(&rig.tp));
    assert_eq!(
        rig.tp.endpoints().get(Endpoint::Usb),
        Ok(EndpointModeState::DEFAULT)
    );
    assert_eq!(rig.tp.live().mode(), Some(InputMode::Mouse));
}

// ═══════════════════════════════════════════════════════════════════════════
// GET_REPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn get_report_serves_fixed_features() {
    let rig = Rig::booted();
    let mut buf = [0u8; 300];

    assert_eq!(
        rig.tp.get_report(REPORT_ID_FEATURE_CAPABILITIES, &mut buf),
        Ok(2)
    );
    assert_eq!(buf[1], (N as u8) | (2 << 4));

    assert_eq!(
        rig.tp.get_report(REPORT_ID_FEATURE_CERTIFICATION, &mut buf),
        Ok(257)
    );
    assert_eq!(
        &buf[1..257],
        &rig.tp.get_feature_certification_report().blob()[..]
    );
    assert_eq!(rig.tp.get_feature_capabilities_report().max_touches, N as u8);
}

#[test]
fn get_report_rejects_unknown_and_short() {
    let rig = Rig::booted();
    let mut buf = [0u8; 8];
    assert_eq!(
        rig.tp.get_report(0x42, &mut buf),
        Err(Error::UnsupportedRequest)
    );
    assert_eq!(
        rig.tp.get_report(REPORT_ID_FEATURE_CERTIFICATION, &mut buf),
        Err(Error::BufferOverflow)
    );
}
