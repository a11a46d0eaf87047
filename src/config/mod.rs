//! Command-line parsing and validation helpers.

#[cfg(test)]
mod tests;
mod validation;

use clap::Parser;
use std::path::PathBuf;

use crate::destination::documents_root;

/// CLI options for the keyscribe recorder.
#[derive(Debug, Parser, Clone)]
#[command(
    about = "Keyscribe: consent-based key recorder (logs only while this terminal is focused)",
    author,
    version
)]
pub struct AppConfig {
    /// Log file to append captured keys to (CSV)
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Root folder for generated logs (a `keylogs` folder is created inside)
    #[arg(long = "documents-dir", env = "KEYSCRIBE_DOCUMENTS_DIR", value_name = "DIR")]
    pub documents_dir: Option<PathBuf>,

    /// Start logging immediately (consent given on the command line)
    #[arg(long = "arm", default_value_t = false)]
    pub arm: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "KEYSCRIBE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "KEYSCRIBE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow captured key content in the debug log
    #[arg(
        long = "log-content",
        env = "KEYSCRIBE_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

impl AppConfig {
    /// Root used for the generated default log file.
    pub fn documents_root(&self) -> PathBuf {
        self.documents_dir.clone().unwrap_or_else(documents_root)
    }

    pub fn logging_enabled(&self) -> bool {
        self.logs && !self.no_logs
    }
}
