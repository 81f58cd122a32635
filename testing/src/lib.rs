//! Shared test fixtures for the configuration migration workspace.
//!
//! Provides collaborator doubles used across crates:
//! - [`RecordingLog`]: a `LogSink` that keeps every call for assertions
//! - [`FailingFileSystem`]: a `FileSystem` whose operations all fail
//!
//! Sample legacy and current documents live in [`fixtures`].

pub mod fixtures;

pub use fixtures::*;
use cm_core::{FileSystem, LogContext, LogSink};
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub component: &'static str,
    pub message: String,
    pub cause: Option<String>,
}

/// `LogSink` that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLog {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(LogLevel::Info)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(LogLevel::Error)
    }

    fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    /// True if any message, at any level, contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(needle))
    }

    /// True if an error message or its cause contains `needle`.
    pub fn contains_error(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| {
            e.level == LogLevel::Error
                && (e.message.contains(needle)
                    || e.cause.as_deref().is_some_and(|c| c.contains(needle)))
        })
    }

    fn push(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

impl LogSink for RecordingLog {
    fn info(&self, ctx: &LogContext, message: &str) {
        tracing::debug!(component = ctx.component, "{}", message);
        self.push(LogEntry {
            level: LogLevel::Info,
            component: ctx.component,
            message: message.to_string(),
            cause: None,
        });
    }

    fn error(&self, ctx: &LogContext, message: &str, cause: &dyn std::error::Error) {
        tracing::debug!(component = ctx.component, error = %cause, "{}", message);
        self.push(LogEntry {
            level: LogLevel::Error,
            component: ctx.component,
            message: message.to_string(),
            cause: Some(cause.to_string()),
        });
    }
}

/// `FileSystem` whose every operation fails with `PermissionDenied`.
/// Only `exists` answers, with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct FailingFileSystem {
    exists: bool,
}

impl FailingFileSystem {
    /// Every path reports as present.
    pub fn existing() -> Self {
        Self { exists: true }
    }

    /// Every path reports as absent.
    pub fn missing() -> Self {
        Self { exists: false }
    }

    fn fail<T>(path: &Path) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("simulated failure on {}", path.display()),
        ))
    }
}

impl FileSystem for FailingFileSystem {
    fn exists(&self, _path: &Path) -> bool {
        self.exists
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        Self::fail(path)
    }

    fn write(&self, path: &Path, _contents: &[u8]) -> io::Result<()> {
        Self::fail(path)
    }

    fn create_new_file(&self, path: &Path) -> io::Result<bool> {
        Self::fail(path)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        Self::fail(path)
    }

    fn copy(&self, from: &Path, _to: &Path) -> io::Result<()> {
        Self::fail(from)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        Self::fail(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_log_keeps_order_and_levels() {
        let log = RecordingLog::default();
        let ctx = LogContext::new("recovery");
        let cause = io::Error::other("disk full");

        log.info(&ctx, "first");
        log.error(&ctx, "second", &cause);

        assert_eq!(log.infos(), vec!["first".to_string()]);
        assert_eq!(log.errors(), vec!["second".to_string()]);
        assert!(log.contains("second"));
        assert!(log.contains_error("disk full"));
        assert!(!log.contains_error("first"));
        assert_eq!(log.entries()[1].component, "recovery");
    }

    #[test]
    fn test_failing_file_system() {
        let fs = FailingFileSystem::existing();
        assert!(fs.exists(Path::new("/x")));
        let err = fs.read_to_string(Path::new("/x/version")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!FailingFileSystem::missing().exists(Path::new("/x")));
    }
}
