//! Keyscribe entrypoint: parse flags, set up logging, run the full-screen recorder.

use anyhow::Result;
use keyscribe::{
    config::AppConfig, init_logging, log_debug, log_file_path, telemetry::init_tracing, ui, App,
};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    log_debug("=== Keyscribe started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let mut app = App::new(&config);
    let result = ui::run_app(&mut app);

    log_debug("=== Keyscribe exiting ===");
    if let Err(ref e) = result {
        log_debug(&format!("Exit with error: {e:#}"));
    }
    result
}
