//! Logging setup for simulation runs.
//!
//! The crate logs through the `log` facade; nothing is printed unless the
//! embedding program (or a test) routes it somewhere. These helpers install a
//! log4rs stderr appender and stay reconfigurable afterwards, so a batch
//! harness can silence a sweep and re-enable output for a single replication.

use crate::error::DialysisError;
use log::LevelFilter;
use log4rs::Handle;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::sync::OnceLock;

static LOG_HANDLE: OnceLock<Handle> = OnceLock::new();

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} [{t}] {m}{n}";

fn build_config(level: LevelFilter) -> Result<Config, DialysisError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    Ok(config)
}

/// Routes `log` output to stderr at the given level. Safe to call repeatedly;
/// later calls adjust the level of the already-installed logger.
///
/// # Errors
/// Returns [`DialysisError::LoggingError`] if another logger was installed
/// outside this module.
pub fn set_log_level(level: LevelFilter) -> Result<(), DialysisError> {
    let config = build_config(level)?;
    match LOG_HANDLE.get() {
        Some(handle) => handle.set_config(config),
        None => {
            let handle = log4rs::init_config(config)?;
            let _ = LOG_HANDLE.set(handle);
        }
    }
    Ok(())
}

/// Enables stderr logging at `Info`.
pub fn enable_logging() -> Result<(), DialysisError> {
    set_log_level(LevelFilter::Info)
}

/// Turns all log output off without uninstalling the logger.
pub fn disable_logging() -> Result<(), DialysisError> {
    set_log_level(LevelFilter::Off)
}
