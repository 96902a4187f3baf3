//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Leveled debug/info/warn/error messages
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Message severity, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" | "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("Unknown log level '{other}'")),
        }
    }
}

static MIN_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

pub fn set_level(level: Level) {
    MIN_LEVEL.store(level as u8, Ordering::Relaxed);
}

fn enabled(level: Level) -> bool {
    level as u8 >= MIN_LEVEL.load(Ordering::Relaxed)
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )?;

    match config.logging.level.parse::<Level>() {
        Ok(level) => set_level(level),
        Err(e) => log_warning(&format!("{e}, using 'info'")),
    }
    if !format::KNOWN_FORMATS.contains(&config.logging.access_log_format.as_str()) {
        log_warning(&format!(
            "Unknown access log format '{}', using 'combined'",
            config.logging.access_log_format
        ));
    }
    Ok(())
}

/// Write to info/access log
fn write_info(message: &str) {
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

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    if !enabled(Level::Info) {
        return;
    }
    write_info("======================================");
    write_info("fileprobe started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Base directory: {}", config.storage.base_dir.display()));
    write_info(&format!("Vendor file: {}", config.storage.vendor_file.display()));
    write_info(&format!("Log level: {}", config.logging.level));
    match config.server.workers {
        Some(workers) => write_info(&format!("Worker threads: {workers}")),
        None => write_info("Worker threads: CPU cores"),
    }
    if let Some(max) = config.performance.max_connections {
        write_info(&format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

/// Log formatted access log entry
///
/// Access lines bypass the level filter; `logging.access_log` controls them.
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    match writer::get() {
        Some(w) => w.write_access(&entry.format(format)),
        None => println!("{}", entry.format(format)),
    }
}
