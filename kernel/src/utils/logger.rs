/*
 * Simulator Logging
 *
 * Backend for the `log` facade. Records go to stderr as `[LEVEL] message`
 * so they never mix with the shell's own output on stdout.
 *
 * The level is chosen once at startup; the shell raises it to Debug with -v
 * to trace dispatches and queue transitions.
 */

use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// Logger writing to stderr
struct SimLogger;

impl log::Log for SimLogger {
    /// Checks the record against the global max level.
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimLogger = SimLogger;

/// Install the logger with the given maximum level
///
/// Fails if another logger was installed first.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
