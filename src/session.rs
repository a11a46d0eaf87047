//! Armed/unarmed state machine that owns the active destination and gates
//! every durable write.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::destination::{Destination, DestinationResolver};
use crate::error::CaptureError;
use crate::event::{format_timestamp, KeyEvent};
use crate::transcript::TranscriptMirror;
use crate::writer::EventLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unarmed,
    Armed,
}

/// Where to look for a destination when none is active yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationChoice {
    /// Only use the active destination; fail with `NoDestination` otherwise.
    ActiveOnly,
    /// Operator-picked path.
    Explicit(PathBuf),
    /// Operator accepted the generated default.
    GenerateDefault,
}

pub fn started_marker(at: NaiveDateTime) -> String {
    format!("--- Logging started at {} ---", format_timestamp(at))
}

pub fn stopped_marker(at: NaiveDateTime) -> String {
    format!("--- Logging stopped at {} ---", format_timestamp(at))
}

pub struct SessionController<L, R> {
    state: SessionState,
    destination: Option<Destination>,
    log: L,
    resolver: R,
}

impl<L: EventLog, R: DestinationResolver> SessionController<L, R> {
    pub fn new(log: L, resolver: R) -> Self {
        Self {
            state: SessionState::Unarmed,
            destination: None,
            log,
            resolver,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether closing the app should ask for confirmation first.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Armed
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    fn resolve(&self, choice: &DestinationChoice) -> Result<Destination, CaptureError> {
        match choice {
            DestinationChoice::ActiveOnly => Err(CaptureError::NoDestination),
            DestinationChoice::Explicit(path) => self.resolver.resolve(path),
            DestinationChoice::GenerateDefault => self.resolver.generate_default(),
        }
    }

    fn ensure_header(&mut self, destination: &mut Destination) -> Result<(), CaptureError> {
        if !destination.header_written() {
            self.log.write_header(destination)?;
        }
        Ok(())
    }

    /// Start persisting events. Resolution, probe, and header failures leave
    /// the session unarmed; a candidate that fails the probe is discarded.
    pub fn arm(
        &mut self,
        choice: DestinationChoice,
        mirror: &mut TranscriptMirror,
        at: NaiveDateTime,
    ) -> Result<(), CaptureError> {
        if self.is_active() {
            return Ok(());
        }
        let mut candidate = match self.destination.take() {
            Some(active) => active,
            None => self.resolve(&choice).inspect_err(|err| {
                warn!(error = %err, "destination resolution failed; staying unarmed");
            })?,
        };
        if let Err(err) = self.log.probe(&candidate) {
            warn!(path = %candidate.path().display(), error = %err, "write probe failed; destination discarded");
            return Err(err);
        }
        if let Err(err) = self.ensure_header(&mut candidate) {
            warn!(path = %candidate.path().display(), error = %err, "header write failed; destination discarded");
            return Err(err);
        }
        info!(path = %candidate.path().display(), "session armed");
        self.destination = Some(candidate);
        self.state = SessionState::Armed;
        mirror.append_marker(started_marker(at));
        Ok(())
    }

    /// Stop persisting. Returns whether a transition happened; repeated calls
    /// are silent no-ops.
    pub fn disarm(&mut self, mirror: &mut TranscriptMirror, at: NaiveDateTime) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = SessionState::Unarmed;
        mirror.append_marker(stopped_marker(at));
        info!("session disarmed");
        true
    }

    /// Forced disarm after a failed durable write. The destination is kept;
    /// the error is handed back so the caller can surface it once.
    pub fn on_write_failure(
        &mut self,
        err: CaptureError,
        mirror: &mut TranscriptMirror,
        at: NaiveDateTime,
    ) -> CaptureError {
        warn!(error = %err, "durable write failed; disarming");
        self.disarm(mirror, at);
        err
    }

    /// Append `event` to the active destination if armed. `Ok(false)` means the
    /// session was not persisting.
    pub fn persist(&mut self, event: &KeyEvent) -> Result<bool, CaptureError> {
        if !self.is_active() {
            return Ok(false);
        }
        let Some(destination) = self.destination.as_ref() else {
            return Ok(false);
        };
        self.log.append(event, destination)?;
        Ok(true)
    }

    /// Switch to an operator-chosen file. On failure the previous destination
    /// stays active.
    pub fn select_destination(&mut self, path: &Path) -> Result<&Destination, CaptureError> {
        let mut candidate = self.resolver.resolve(path)?;
        self.ensure_header(&mut candidate)?;
        info!(path = %candidate.path().display(), armed = self.is_active(), "destination selected");
        Ok(&*self.destination.insert(candidate))
    }

    /// Active destination, resolving one from `choice` when there is none.
    pub fn ensure_destination(
        &mut self,
        choice: &DestinationChoice,
    ) -> Result<&Destination, CaptureError> {
        if self.destination.is_none() {
            let mut candidate = self.resolve(choice)?;
            self.ensure_header(&mut candidate)?;
            info!(path = %candidate.path().display(), "destination resolved for save");
            self.destination = Some(candidate);
        }
        self.destination.as_ref().ok_or(CaptureError::NoDestination)
    }

    /// Append `lines` as one manual-save block regardless of the armed state.
    pub fn save_block(
        &mut self,
        lines: &[String],
        choice: &DestinationChoice,
        at: NaiveDateTime,
    ) -> Result<PathBuf, CaptureError> {
        self.ensure_destination(choice)?;
        let Some(destination) = self.destination.as_ref() else {
            return Err(CaptureError::NoDestination);
        };
        self.log.flush_block(lines, destination, at)?;
        info!(path = %destination.path().display(), lines = lines.len(), "transcript saved");
        Ok(destination.path().to_path_buf())
    }
}
