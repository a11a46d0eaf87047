//! Raw key notifications in; transcript lines and (when armed) log rows out.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::destination::{Destination, DestinationResolver};
use crate::error::CaptureError;
use crate::event::{now_seconds, Clock, KeyEvent, KeyRepr, RawKey};
use crate::session::{DestinationChoice, SessionController, SessionState};
use crate::transcript::TranscriptMirror;
use crate::writer::EventLog;

/// Source of key notifications that only delivers keys while the controlling
/// surface has input focus. The pipeline never checks focus itself.
pub trait KeySource {
    fn next_key(&mut self) -> Option<RawKey>;
}

impl KeySource for VecDeque<RawKey> {
    fn next_key(&mut self) -> Option<RawKey> {
        self.pop_front()
    }
}

/// Where a dispatched event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    TranscriptOnly,
    Persisted,
}

/// Result of draining a [`KeySource`].
#[derive(Debug, Default)]
pub struct PumpReport {
    pub dispatched: usize,
    pub persisted: usize,
    /// First durable-write failure; later events were transcript-only.
    pub failure: Option<CaptureError>,
}

pub struct CapturePipeline<L, R> {
    session: SessionController<L, R>,
    mirror: TranscriptMirror,
    clock: Box<dyn Clock>,
    last_stamp: Option<NaiveDateTime>,
}

impl<L: EventLog, R: DestinationResolver> CapturePipeline<L, R> {
    pub fn new(session: SessionController<L, R>, clock: impl Clock + 'static) -> Self {
        Self {
            session,
            mirror: TranscriptMirror::new(),
            clock: Box::new(clock),
            last_stamp: None,
        }
    }

    pub fn session(&self) -> &SessionController<L, R> {
        &self.session
    }

    pub fn mirror(&self) -> &TranscriptMirror {
        &self.mirror
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.session.destination()
    }

    /// Second-granular wall clock, held non-decreasing across calls even if the
    /// host clock steps back.
    fn stamp(&mut self) -> NaiveDateTime {
        let now = now_seconds(self.clock.as_ref());
        let stamp = match self.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    pub fn on_raw_event(&mut self, raw: &RawKey) -> KeyEvent {
        KeyEvent::new(self.stamp(), KeyRepr::from_raw(raw))
    }

    /// Mirror `event` unconditionally, then persist it if armed. A write failure
    /// forces the session unarmed and is returned once; the event stays in the
    /// transcript and is not retried.
    pub fn dispatch(&mut self, event: &KeyEvent) -> Result<Dispatched, CaptureError> {
        self.mirror.append_event(event.transcript_line());
        match self.session.persist(event) {
            Ok(true) => Ok(Dispatched::Persisted),
            Ok(false) => Ok(Dispatched::TranscriptOnly),
            Err(err) => {
                let at = event.timestamp;
                Err(self.session.on_write_failure(err, &mut self.mirror, at))
            }
        }
    }

    pub fn capture(&mut self, raw: &RawKey) -> Result<Dispatched, CaptureError> {
        let event = self.on_raw_event(raw);
        self.dispatch(&event)
    }

    /// Dispatch every key `source` currently has, in arrival order.
    pub fn pump(&mut self, source: &mut impl KeySource) -> PumpReport {
        let mut report = PumpReport::default();
        while let Some(raw) = source.next_key() {
            report.dispatched += 1;
            match self.capture(&raw) {
                Ok(Dispatched::Persisted) => report.persisted += 1,
                Ok(Dispatched::TranscriptOnly) => {}
                Err(err) => {
                    if report.failure.is_none() {
                        report.failure = Some(err);
                    }
                }
            }
        }
        report
    }

    pub fn arm(&mut self, choice: DestinationChoice) -> Result<(), CaptureError> {
        let at = self.stamp();
        self.session.arm(choice, &mut self.mirror, at)
    }

    pub fn disarm(&mut self) -> bool {
        let at = self.stamp();
        self.session.disarm(&mut self.mirror, at)
    }

    pub fn select_destination(&mut self, path: &Path) -> Result<&Destination, CaptureError> {
        self.session.select_destination(path)
    }

    /// Append the current transcript to the destination as a manual-save block.
    pub fn save_transcript(&mut self, choice: &DestinationChoice) -> Result<PathBuf, CaptureError> {
        let at = self.stamp();
        let lines = self.mirror.saveable_lines();
        self.session.save_block(&lines, choice, at)
    }

    pub fn clear_transcript(&mut self) {
        self.mirror.clear();
    }
}
