//! Interactive front-end state and the debug log it writes to.

mod logging;
mod state;
#[cfg(test)]
mod tests;

#[cfg(test)]
pub(crate) use logging::set_logging_for_tests;
pub use logging::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
pub use state::{App, Prompt, Purpose, Recorder};
