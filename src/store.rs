//! Currently-published report payloads.
//!
//! Every report sits behind its own critical-section mutex and is
//! replaced as a whole, so the transport never reads a half-written
//! frame while the sensor context is publishing.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config;
use crate::error::Error;
use crate::hid::feature::{
    CapabilitiesReport, CertificationReport, InputMode, ModeReport, SelectiveReport,
};
use crate::hid::mouse::MouseReport;
use crate::hid::ptp::ContactFrame;
use crate::hid::{
    REPORT_ID_DIGITIZER, REPORT_ID_FEATURE_CAPABILITIES, REPORT_ID_FEATURE_CERTIFICATION,
    REPORT_ID_FEATURE_MODE, REPORT_ID_FEATURE_SELECTIVE, REPORT_ID_MOUSE,
};

type Slot<T> = Mutex<CriticalSectionRawMutex, Cell<T>>;

/// Transport notification hook, called after every input report publish.
pub trait ReportSink<const N: usize> {
    fn send_ptp_report(&self, report: &ContactFrame<N>);
    fn send_mouse_report(&self, report: &MouseReport);
}

/// Live copies of every report the host can read.
pub struct ReportStore<const N: usize> {
    digitizer: Slot<ContactFrame<N>>,
    mouse: Slot<MouseReport>,
    selective: Slot<SelectiveReport>,
    mode: Slot<ModeReport>,
    capabilities: CapabilitiesReport,
}

impl<const N: usize> ReportStore<N> {
    pub const fn new() -> Self {
        Self {
            digitizer: Mutex::new(Cell::new(ContactFrame::empty())),
            mouse: Mutex::new(Cell::new(MouseReport::empty())),
            selective: Mutex::new(Cell::new(SelectiveReport {
                surface_switch: true,
                button_switch: true,
            })),
            mode: Mutex::new(Cell::new(ModeReport {
                mode: config::DEFAULT_INPUT_MODE,
            })),
            capabilities: CapabilitiesReport {
                max_touches: N as u8,
                pad_type: config::PAD_TYPE,
            },
        }
    }

    pub fn digitizer(&self) -> ContactFrame<N> {
        self.digitizer.lock(|c| c.get())
    }

    pub(crate) fn set_digitizer(&self, frame: ContactFrame<N>) {
        self.digitizer.lock(|c| c.set(frame));
    }

    pub fn mouse(&self) -> MouseReport {
        self.mouse.lock(|c| c.get())
    }

    pub(crate) fn set_mouse(&self, report: MouseReport) {
        self.mouse.lock(|c| c.set(report));
    }

    pub fn selective(&self) -> SelectiveReport {
        self.selective.lock(|c| c.get())
    }

    pub(crate) fn set_selective(&self, report: SelectiveReport) {
        debug!(
            "Setting selective reporting to: {}, {}",
            report.surface_switch,
            report.button_switch
        );
        self.selective.lock(|c| c.set(report));
    }

    pub fn mode(&self) -> ModeReport {
        self.mode.lock(|c| c.get())
    }

    pub(crate) fn set_mode(&self, mode: InputMode) {
        self.mode.lock(|c| c.set(ModeReport { mode }));
    }

    pub fn capabilities(&self) -> CapabilitiesReport {
        self.capabilities
    }

    pub fn certification(&self) -> CertificationReport {
        CertificationReport
    }

    /// Serialise the report with `report_id` for a host `GET_REPORT`.
    pub fn get_report(&self, report_id: u8, buf: &mut [u8]) -> Result<usize, Error> {
        let written = match report_id {
            REPORT_ID_DIGITIZER => self.digitizer().serialize(buf),
            REPORT_ID_MOUSE => self.mouse().serialize(buf),
            REPORT_ID_FEATURE_SELECTIVE => self.selective().serialize(buf),
            REPORT_ID_FEATURE_MODE => self.mode().serialize(buf),
            REPORT_ID_FEATURE_CAPABILITIES => self.capabilities.serialize(buf),
            REPORT_ID_FEATURE_CERTIFICATION => self.certification().serialize(buf),
            _ => {
                error!("Invalid report ID {} requested", report_id);
                return Err(Error::UnsupportedRequest);
            }
        };

        if written == 0 {
            return Err(Error::BufferOverflow);
        }
        Ok(written)
    }
}

impl<const N: usize> Default for ReportStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
