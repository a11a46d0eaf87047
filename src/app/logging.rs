use crate::config::AppConfig;
use chrono::Local;
use std::{
    env, fs,
    io::Write,
    panic,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, OnceLock},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
static DEBUG_LOG: OnceLock<Mutex<DebugLog>> = OnceLock::new();

/// Path to the temp debug log, rotated between runs.
pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("keyscribe_tui.log")
}

/// Path to the crash log (location only unless content logging is on).
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("keyscribe_crash.log")
}

/// Size-capped append file. When the next line would cross the cap the file
/// is truncated and writing starts over.
struct CappedFile {
    path: PathBuf,
    file: fs::File,
    max_bytes: u64,
    written: u64,
}

impl CappedFile {
    fn open(path: PathBuf, max_bytes: u64) -> Option<Self> {
        let mut written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if written > max_bytes {
            let _ = fs::remove_file(&path);
            written = 0;
        }
        let file = open_append(&path)?;
        Some(Self {
            path,
            file,
            max_bytes,
            written,
        })
    }

    fn write_line(&mut self, line: &str) {
        let len = line.len() as u64;
        if self.written.saturating_add(len) > self.max_bytes {
            match fs::File::create(&self.path) {
                Ok(file) => {
                    self.file = file;
                    self.written = 0;
                }
                Err(_) => return,
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.written = self.written.saturating_add(len);
        }
    }
}

fn open_append(path: &Path) -> Option<fs::File> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()
}

#[derive(Default)]
struct DebugLog {
    enabled: bool,
    content_enabled: bool,
    sink: Option<CappedFile>,
}

impl DebugLog {
    fn configure(&mut self, enabled: bool, content_enabled: bool) {
        self.enabled = enabled;
        self.content_enabled = enabled && content_enabled;
        self.sink = if enabled {
            CappedFile::open(log_file_path(), LOG_MAX_BYTES)
        } else {
            None
        };
    }
}

fn debug_log() -> MutexGuard<'static, DebugLog> {
    DEBUG_LOG
        .get_or_init(|| Mutex::new(DebugLog::default()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Configure the debug log from CLI flags or environment.
pub fn init_logging(config: &AppConfig) {
    debug_log().configure(config.logging_enabled(), config.log_content);
}

/// Write a debug line to the temp log; the terminal itself is never touched.
pub fn log_debug(msg: &str) {
    let mut log = debug_log();
    if !log.enabled {
        return;
    }
    let line = format!("[{}] {msg}\n", stamp());
    if let Some(sink) = log.sink.as_mut() {
        sink.write_line(&line);
    }
}

/// Write a line that carries captured key content. Dropped unless
/// `--log-content` is set.
pub fn log_debug_content(msg: &str) {
    if !debug_log().content_enabled {
        return;
    }
    log_debug(msg);
}

/// Append a crash entry. The panic payload may echo typed text, so it is only
/// kept when content logging is on.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    let (enabled, content_enabled) = {
        let log = debug_log();
        (log.enabled, log.content_enabled)
    };
    if !enabled {
        return;
    }
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if content_enabled {
        info.payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string())
    } else {
        "payload omitted (log-content disabled)".to_string()
    };
    let line = format!(
        "[{}] panic at {location}: {payload} (v{})\n",
        stamp(),
        env!("CARGO_PKG_VERSION")
    );
    if let Some(mut crash) = CappedFile::open(crash_log_path(), CRASH_LOG_MAX_BYTES) {
        crash.write_line(&line);
    }
}

#[cfg(test)]
pub(crate) fn set_logging_for_tests(enabled: bool, content_enabled: bool) {
    debug_log().configure(enabled, content_enabled);
}
