use std::collections::VecDeque;
use std::env;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::logging::{log_debug, log_debug_content};
use crate::config::AppConfig;
use crate::destination::FsDestinationResolver;
use crate::error::{CaptureError, FailureKind};
use crate::event::{KeyRepr, RawKey, SystemClock};
use crate::keymap::{classify, Action, Input};
use crate::pipeline::CapturePipeline;
use crate::session::{DestinationChoice, SessionController};
use crate::transcript::TranscriptMirror;
use crate::writer::CsvLogWriter;

pub type Recorder = CapturePipeline<CsvLogWriter, FsDestinationResolver>;

/// What a destination prompt was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Arm,
    Save,
    Select,
}

/// Modal prompts. While one is open, keys feed it and are not captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// "Create a default log file?" (y/n)
    ConfirmDefault { purpose: Purpose },
    /// Free-text path entry.
    PathEntry { purpose: Purpose, buffer: String },
    /// "Logging is still active. Stop logging and exit?" (y/n)
    ConfirmQuit,
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::ConfirmDefault { .. } => " Log file ",
            Prompt::PathEntry { .. } => " Choose log file ",
            Prompt::ConfirmQuit => " Logging active ",
        }
    }

    pub fn body(&self, default_dir: &str) -> String {
        match self {
            Prompt::ConfirmDefault { .. } => format!(
                "No log file chosen. Create a default log file in {default_dir}? (y/n)"
            ),
            Prompt::PathEntry { buffer, .. } => {
                format!("Path (Enter to confirm, Esc to cancel):\n> {buffer}")
            }
            Prompt::ConfirmQuit => "Logging is still active. Stop logging and exit? (y/n)".into(),
        }
    }
}

/// Interactive front-end state around the capture pipeline.
pub struct App {
    recorder: Recorder,
    default_dir: PathBuf,
    status: String,
    prompt: Option<Prompt>,
    pending: VecDeque<RawKey>,
    focused: bool,
    should_quit: bool,
    needs_redraw: bool,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let resolver = FsDestinationResolver::new(config.documents_root());
        let default_dir = resolver.default_dir();
        let session = SessionController::new(CsvLogWriter::new(), resolver);
        let mut app = Self {
            recorder: CapturePipeline::new(session, SystemClock),
            default_dir,
            status: "Ready. Get consent before logging; press F2 to start.".into(),
            prompt: None,
            pending: VecDeque::new(),
            focused: true,
            should_quit: false,
            needs_redraw: true,
        };
        let chosen = match config.log_file.clone() {
            Some(path) => app.select_path(path),
            None => false,
        };
        if config.arm {
            // A rejected --log-file leaves the session unarmed; the generated
            // default is only for runs that named no file.
            match (&config.log_file, chosen) {
                (Some(_), true) => {
                    app.arm(DestinationChoice::ActiveOnly);
                }
                (Some(_), false) => {
                    let status = format!("{} Logging not started.", app.status);
                    app.set_status(status);
                }
                (None, _) => {
                    app.arm(DestinationChoice::GenerateDefault);
                }
            }
        }
        app
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn transcript(&self) -> &TranscriptMirror {
        self.recorder.mirror()
    }

    pub fn status_text(&self) -> &str {
        &self.status
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn default_dir(&self) -> &std::path::Path {
        &self.default_dir
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    pub fn set_focus(&mut self, focused: bool) {
        if self.focused != focused {
            self.focused = focused;
            log_debug(&format!("focus changed: focused={focused}"));
            self.request_redraw();
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.request_redraw();
    }

    fn report_failure(&mut self, err: &CaptureError, suffix: &str) {
        log_debug(&format!("{}: {err}", err.headline()));
        let message = match err.kind() {
            FailureKind::NoDestination => {
                "Logging requires a writable log file. Choose a file first (F4).".to_string()
            }
            _ => format!("{}: {err}.{suffix}", err.headline()),
        };
        self.set_status(message);
    }

    /// Route one terminal key press: prompts first, then controls, then capture.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            if key.kind != KeyEventKind::Release {
                self.handle_prompt_key(key);
            }
            return;
        }
        match classify(&key) {
            Input::Control(action) => self.handle_action(action),
            Input::Key(raw) => {
                self.pending.push_back(raw);
                self.flush_pending();
            }
            Input::Ignored => {}
        }
    }

    fn flush_pending(&mut self) {
        for raw in &self.pending {
            log_debug_content(&format!("key: {}", KeyRepr::from_raw(raw)));
        }
        let report = self.recorder.pump(&mut self.pending);
        if let Some(err) = report.failure {
            self.report_failure(&err, " Logging stopped.");
        }
        if report.dispatched > 0 {
            self.request_redraw();
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        log_debug(&format!("action: {action:?}"));
        match action {
            Action::Arm => self.start_flow(Purpose::Arm),
            Action::Disarm => {
                if self.recorder.disarm() {
                    self.set_status("Logging stopped.");
                } else {
                    self.set_status("Logging is not running.");
                }
            }
            Action::ChooseFile => self.open_prompt(Prompt::PathEntry {
                purpose: Purpose::Select,
                buffer: String::new(),
            }),
            Action::SavePreview => self.start_flow(Purpose::Save),
            Action::ClearPreview => {
                self.recorder.clear_transcript();
                self.set_status("Preview cleared.");
            }
            Action::Quit => {
                if self.recorder.is_active() {
                    self.open_prompt(Prompt::ConfirmQuit);
                } else {
                    self.should_quit = true;
                }
            }
        }
    }

    fn open_prompt(&mut self, prompt: Prompt) {
        self.prompt = Some(prompt);
        self.request_redraw();
    }

    /// Arm or save: reuse the active destination, otherwise ask before
    /// generating the default.
    fn start_flow(&mut self, purpose: Purpose) {
        if purpose == Purpose::Arm && self.recorder.is_active() {
            self.set_status("Already logging.");
            return;
        }
        if self.recorder.destination().is_some() {
            self.run(purpose, DestinationChoice::ActiveOnly);
        } else {
            self.open_prompt(Prompt::ConfirmDefault { purpose });
        }
    }

    fn run(&mut self, purpose: Purpose, choice: DestinationChoice) -> bool {
        match purpose {
            Purpose::Arm => self.arm(choice),
            Purpose::Save => self.save(choice),
            Purpose::Select => match choice {
                DestinationChoice::Explicit(path) => self.select_path(path),
                _ => false,
            },
        }
    }

    fn arm(&mut self, choice: DestinationChoice) -> bool {
        match self.recorder.arm(choice) {
            Ok(()) => {
                let path = self
                    .recorder
                    .destination()
                    .map(|d| d.path().display().to_string())
                    .unwrap_or_default();
                self.set_status(format!("Logging to {path}"));
                true
            }
            Err(err) => {
                self.report_failure(&err, " Choose another file (F4).");
                false
            }
        }
    }

    fn save(&mut self, choice: DestinationChoice) -> bool {
        match self.recorder.save_transcript(&choice) {
            Ok(path) => {
                self.set_status(format!("Preview appended to {}", path.display()));
                true
            }
            Err(err) => {
                self.report_failure(&err, "");
                false
            }
        }
    }

    fn select_path(&mut self, path: PathBuf) -> bool {
        match self.recorder.select_destination(&path) {
            Ok(dest) => {
                let message = format!("Log file set to {}", dest.path().display());
                self.set_status(message);
                true
            }
            Err(err) => {
                self.report_failure(&err, " Previous choice kept.");
                false
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        self.request_redraw();
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.cancel_prompt(&prompt);
            return;
        }
        match prompt {
            Prompt::ConfirmDefault { purpose } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    if !self.run(purpose, DestinationChoice::GenerateDefault) {
                        // Default failed; offer a manual choice instead.
                        self.prompt = Some(Prompt::PathEntry {
                            purpose,
                            buffer: String::new(),
                        });
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.prompt = Some(Prompt::PathEntry {
                        purpose,
                        buffer: String::new(),
                    });
                }
                KeyCode::Esc => self.cancel_prompt(&prompt),
                _ => self.prompt = Some(prompt),
            },
            Prompt::PathEntry {
                purpose,
                mut buffer,
            } => match key.code {
                KeyCode::Enter => {
                    let trimmed = buffer.trim();
                    if trimmed.is_empty() {
                        self.cancel_prompt(&Prompt::PathEntry { purpose, buffer });
                    } else {
                        let path = expand_home(trimmed);
                        if !self.run(purpose, DestinationChoice::Explicit(path)) {
                            self.prompt = Some(Prompt::PathEntry { purpose, buffer });
                        }
                    }
                }
                KeyCode::Esc => self.cancel_prompt(&Prompt::PathEntry { purpose, buffer }),
                KeyCode::Backspace => {
                    buffer.pop();
                    self.prompt = Some(Prompt::PathEntry { purpose, buffer });
                }
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    buffer.push(ch);
                    self.prompt = Some(Prompt::PathEntry { purpose, buffer });
                }
                _ => self.prompt = Some(Prompt::PathEntry { purpose, buffer }),
            },
            Prompt::ConfirmQuit => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.recorder.disarm();
                    self.should_quit = true;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.set_status("Still logging.");
                }
                _ => self.prompt = Some(Prompt::ConfirmQuit),
            },
        }
    }

    fn cancel_prompt(&mut self, prompt: &Prompt) {
        match prompt {
            Prompt::ConfirmDefault { purpose } | Prompt::PathEntry { purpose, .. }
                if *purpose != Purpose::Select =>
            {
                self.report_failure(&CaptureError::NoDestination, "");
            }
            Prompt::ConfirmQuit => self.set_status("Still logging."),
            _ => self.set_status("File choice cancelled."),
        }
    }
}

/// `~/x` → `$HOME/x`.
fn expand_home(input: &str) -> PathBuf {
    match input.strip_prefix("~/") {
        Some(rest) => env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| PathBuf::from(input)),
        None => PathBuf::from(input),
    }
}
