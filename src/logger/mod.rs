//! Logger module
//!
//! Provides logging utilities for the file share server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use crate::config::{LogLevel, LoggingConfig};
use crate::state::AppState;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
        config.level,
    )
}

fn enabled(level: LogLevel) -> bool {
    writer::get().map_or(level <= LogLevel::Info, |w| w.enabled(level))
}

/// Write to info/access log
fn write_info(message: &str) {
    if !enabled(LogLevel::Info) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(level: LogLevel, message: &str) {
    if !enabled(level) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, base_url: &str, state: &AppState, file_count: usize) {
    let config = &state.config;
    write_info("======================================");
    write_info(&format!("Sharing files from: {}", state.root().display()));
    write_info(&format!("Found {file_count} files to share"));
    write_info(&format!("Server started at: {base_url}/"));
    write_info(&format!("Listening on: {addr}"));
    write_info(&format!(
        "Started: {}",
        state.started_at().format("%Y-%m-%d %H:%M:%S %z")
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("Use Ctrl+C to stop.");
    write_info("======================================");
}

pub fn log_shutdown(active_connections: usize) {
    write_info(&format!(
        "Shutting down, {active_connections} connection(s) still finishing"
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(LogLevel::Warn, &format!("[WARN] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(LogLevel::Warn, &format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_debug(message: &str) {
    if !enabled(LogLevel::Debug) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(&format!("[DEBUG] {message}")),
        None => println!("[DEBUG] {message}"),
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}
