//! Burst aggregation: single-finger sensor updates in, one multi-finger
//! digitizer frame out per scan.
//!
//! The sensor raises one data-ready event per finger. Each event also
//! carries the number of fingers it currently sees, so a frame is
//! complete once that many updates have arrived. Owned by the sensor
//! context; nothing else touches the session.

use crate::error::Error;
use crate::hid::feature::SelectiveReport;
use crate::hid::ptp::ContactFrame;
use crate::sensor::{FingerUpdate, ScanClock};

/// State of the burst currently being accumulated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregationSession<const N: usize> {
    pub present_contacts: u8,
    pub received_contacts: u8,
    /// One bit per slot of `partial` updated in this burst.
    pub contacts_to_send: u8,
    pub partial: ContactFrame<N>,
}

impl<const N: usize> AggregationSession<N> {
    pub const fn new() -> Self {
        Self {
            present_contacts: 0,
            received_contacts: 0,
            contacts_to_send: 0,
            partial: ContactFrame::empty(),
        }
    }
}

impl<const N: usize> Default for AggregationSession<N> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FrameAggregator<C, const N: usize> {
    session: AggregationSession<N>,
    clock: C,
    /// Live-mode generation the session was built under.
    generation: u8,
}

impl<C: ScanClock, const N: usize> FrameAggregator<C, N> {
    const CAPACITY_OK: () = assert!(N >= 2 && N <= 5, "finger capacity must be 2..=5");

    pub fn new(clock: C) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;
        Self {
            session: AggregationSession::new(),
            clock,
            generation: 0,
        }
    }

    pub fn session(&self) -> &AggregationSession<N> {
        &self.session
    }

    /// Drop the burst in progress and every buffered contact.
    pub fn reset(&mut self) {
        self.session = AggregationSession::new();
    }

    /// Discard the session if the live mode changed since it was started.
    pub(crate) fn sync_generation(&mut self, generation: u8) {
        if self.generation != generation {
            self.generation = generation;
            self.reset();
        }
    }

    /// Fold one finger update into the session, publishing a frame when
    /// the burst is complete (or immediately, as an empty frame, while
    /// surface reporting is off).
    ///
    /// A new contact arriving with every slot taken is dropped with
    /// [`Error::CapacityExceeded`]; it still counts toward the burst so
    /// the remaining fingers are published.
    pub fn ingest_finger_update<F>(
        &mut self,
        update: FingerUpdate,
        selective: SelectiveReport,
        publish: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(ContactFrame<N>),
    {
        let buttons = if selective.button_switch {
            update.buttons
        } else {
            0
        };

        if !selective.surface_switch {
            self.reset();
            publish(ContactFrame::neutral(update.scan_time, buttons));
            return Ok(());
        }

        let s = &mut self.session;
        // Zero means the driver has not fetched the count yet.
        if update.total_present != 0 {
            s.present_contacts = update.total_present;
        }
        s.partial.set_buttons(buttons);
        s.partial.scan_time = update.scan_time;

        let stored = s.partial.set_finger(update.contact);
        match stored {
            Ok(slot) => s.contacts_to_send |= 1 << slot,
            Err(e) => warn!(
                "Contact {} dropped: {}",
                update.contact.contact_id,
                e
            ),
        }
        s.received_contacts = s.received_contacts.saturating_add(1);

        trace!(
            "total contacts: {}, received contacts: {}, bitmap contacts {}",
            s.present_contacts,
            s.received_contacts,
            s.contacts_to_send
        );

        if s.present_contacts != 0 && s.received_contacts >= s.present_contacts {
            if s.partial.scan_time == 0 {
                self.refresh_scan_time();
            }
            publish(self.take_frame());
        }

        stored.map(|_| ())
    }

    /// Compact the buffered contacts to those still touching.
    pub fn clear_lifted_fingers(&mut self) {
        let s = &mut self.session;
        let keep = s.partial.tip_mask();
        s.contacts_to_send = s.partial.retain_slots(keep, s.contacts_to_send);
        if s.partial.contact_count == 0 {
            s.partial.scan_time = 0;
        }
    }

    /// Stamp the buffered frame from the free-running scan clock.
    pub fn refresh_scan_time(&mut self) {
        let now = self.clock.now_100us();
        self.session.partial.refresh_scan_time(now);
    }

    /// Build the outgoing frame from the contacts updated in this burst
    /// and start a new, empty burst. Only `present_contacts` carries over.
    fn take_frame(&mut self) -> ContactFrame<N> {
        let s = &mut self.session;
        s.partial.retain_slots(s.contacts_to_send, 0);
        let frame = s.partial;

        *s = AggregationSession {
            present_contacts: s.present_contacts,
            ..AggregationSession::new()
        };
        frame
    }
}
