//! Logging (C11, §4.11). Mirrors the station's existing log-prefix
//! convention; every self-check outcome, rejection, and restart request
//! logged by the manager goes through whatever this initializes.

use flexi_logger::{DeferredNow, FileSpec, Logger, LoggerHandle, WriteMode};
use log::{LevelFilter, Record};
use std::io::Write;
use std::thread;

/// Initializes the process-wide logger at `level`, writing to `directory`.
pub fn init_logger(level: LevelFilter, directory: &str) -> Result<LoggerHandle, Box<dyn std::error::Error>> {
    let handle = Logger::try_with_str(level.to_string())?
        .log_to_file(FileSpec::default().directory(directory).suppress_timestamp())
        .append()
        .write_mode(WriteMode::BufferAndFlush)
        .format(log_format)
        .start()?;
    Ok(handle)
}

fn log_format(w: &mut dyn Write, now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
    write!(
        w,
        "{} [{:<5}] [{}:{}] [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.file().unwrap_or("<unknown>"),
        record.line().unwrap_or(0),
        thread::current().name().unwrap_or("<unnamed>"),
        &record.args()
    )
}
