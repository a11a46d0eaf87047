//! Consent-gated key recorder: a transcript of every key this terminal sees,
//! and an append-only CSV log of the ones typed while logging is armed.

pub mod app;
pub mod config;
pub mod destination;
pub mod error;
pub mod event;
pub mod keymap;
pub mod pipeline;
pub mod session;
pub mod telemetry;
pub mod terminal_restore;
pub mod transcript;
pub mod ui;
pub mod writer;

pub use app::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic, App,
};
pub use destination::{Destination, DestinationResolver, FsDestinationResolver};
pub use error::{CaptureError, FailureKind};
pub use event::{Clock, KeyEvent, KeyRepr, RawKey, SystemClock};
pub use pipeline::{CapturePipeline, Dispatched, KeySource, PumpReport};
pub use session::{DestinationChoice, SessionController, SessionState};
pub use transcript::{LineKind, TranscriptLine, TranscriptMirror};
pub use writer::{CsvLogWriter, EventLog};
