//! Logger module
//!
//! Provides logging utilities for the asset server including:
//! - Console banner and shutdown messages
//! - Access logging with multiple formats
//! - Error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.logging.is_debug(),
    )
}

/// Write to access log
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Startup banner. Always on stdout, regardless of log file settings.
pub fn print_banner(port: u16) {
    println!("Server running at http://localhost:{port}/");
    println!("Open http://localhost:{port}/index.html in your browser");
    println!("Press Ctrl+C to stop the server");
}

pub fn print_shutdown() {
    println!("\nServer stopped.");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_debug(message: &str) {
    if writer::get().is_some_and(writer::LogWriter::debug_enabled) {
        write_error(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
