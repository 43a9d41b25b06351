//! stderr logger for the demo programs
//!
//! Demo output on stdout must stay byte-exact, so every log record goes to
//! stderr. Records carry the emitting pid: after a fork, parent and child
//! write to the same terminal.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

pub struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(std::process::id(), record);
        // Nowhere left to report a failed log write.
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn format_record(pid: u32, record: &Record) -> String {
    format!(
        "[{:>5}] {} (pid {}): {}\n",
        record.level(),
        record.target(),
        pid,
        record.args()
    )
}

pub static STDERR_LOGGER: StderrLogger = StderrLogger;

/// Install the stderr logger at `level`.
///
/// Calling this twice keeps the first logger and only updates the level.
pub fn init(level: LevelFilter) {
    if log::set_logger(&STDERR_LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn record_format_has_level_target_and_pid() {
        assert_eq!(
            format_record(
                7,
                &Record::builder()
                    .level(Level::Info)
                    .target("osdemos::fork_demo")
                    .args(format_args!("child 42 exited"))
                    .build()
            ),
            "[ INFO] osdemos::fork_demo (pid 7): child 42 exited\n"
        );
    }

    #[test]
    fn init_twice_only_changes_level() {
        init(LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        init(LevelFilter::Warn);
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
