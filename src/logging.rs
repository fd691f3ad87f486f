/*!
 * Stderr logger for hosts that do not install their own `log` backend.
 *
 * Library code only uses the `log` macros; installing this logger is the
 * host's choice.
 */

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

use crate::app_config::SyncConfig;

// @struct: Colored, timestamped stderr logger
pub struct SyncLogger {
    level: LevelFilter,
}

impl SyncLogger {
    // @creates: New logger with specified level
    pub fn new(level: LevelFilter) -> Self {
        SyncLogger { level }
    }

    // @initializes: Global logger
    pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(SyncLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @initializes: Global logger at the configured level
    pub fn init_from_config(config: &SyncConfig) -> Result<(), SetLoggerError> {
        Self::init(config.log_level.into())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }

    /// Render a record as a single line without color codes
    pub fn format_line(record: &Record) -> String {
        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        format!("{} {:<5} [{}] {}", now, record.level(), record.target(), record.args())
    }
}

impl Log for SyncLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{}\x1B[0m", color, Self::format_line(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
