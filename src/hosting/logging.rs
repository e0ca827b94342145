//! Logging sink consumed by the hosting layer
//!
//! The host emits lifecycle diagnostics through [`LogSink`] only; the
//! concrete backend is supplied by the embedding application.

use std::error::Error;
use std::fmt;

/// Severity of a host diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Sink for host lifecycle diagnostics
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>);
}

/// Default sink forwarding to the `log` facade
pub struct FacadeLogSink;

impl LogSink for FacadeLogSink {
    fn log(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>) {
        let level = match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        };
        match error {
            Some(error) => log::log!(level, "{}: {}", message, error),
            None => log::log!(level, "{}", message),
        }
    }
}

/// Sink discarding every message
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn log(&self, _level: LogLevel, _message: &str, _error: Option<&(dyn Error + 'static)>) {}
}
