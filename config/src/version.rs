//! # Version Tracking
//!
//! Persists the last-seen product marker in the context directory and
//! classifies the current run against it.
//!
//! Two marker files live side by side:
//!
//! | File                 | Question answered                          |
//! |----------------------|--------------------------------------------|
//! | `version`            | fresh install, unchanged, minor or major?  |
//! | `required-extension` | were required extensions installed for it? |
//!
//! Both hold `"<version>-<releaseTime>"` and are compared by string
//! equality. The stored `version` marker is only parsed to read its major
//! component once it is known to differ.

use cm_core::{FileSystem, LogContext, LogSink, UpdateClassification, Version, VersionMarker};
use errors::ConfigError;
use std::path::{Path, PathBuf};

pub const VERSION_FILE: &str = "version";
pub const REQUIRED_EXTENSION_FILE: &str = "required-extension";

/// Previous major versions below this are upgrades from the legacy format.
pub const DEFAULT_MAJOR_THRESHOLD: u64 = 5;

/// One marker file.
pub struct MarkerStore<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> MarkerStore<'a> {
    pub fn new(fs: &'a dyn FileSystem, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.fs.exists(&self.path)
    }

    /// Stored marker with surrounding whitespace removed.
    pub fn read(&self) -> Result<String, ConfigError> {
        self.fs
            .read_to_string(&self.path)
            .map(|text| text.trim().to_string())
            .map_err(|e| ConfigError::io(&self.path, e))
    }

    pub fn write(&self, marker: &str) -> Result<(), ConfigError> {
        if !self.exists() {
            self.fs
                .create_new_file(&self.path)
                .map_err(|e| ConfigError::io(&self.path, e))?;
        }
        self.fs
            .write(&self.path, marker.as_bytes())
            .map_err(|e| ConfigError::io(&self.path, e))
    }
}

/// Classifies runs against the markers of one context directory.
pub struct VersionTracker<'a> {
    fs: &'a dyn FileSystem,
    context_dir: PathBuf,
    log: &'a dyn LogSink,
    major_threshold: u64,
}

impl<'a> VersionTracker<'a> {
    pub fn new(fs: &'a dyn FileSystem, context_dir: impl Into<PathBuf>, log: &'a dyn LogSink) -> Self {
        Self {
            fs,
            context_dir: context_dir.into(),
            log,
            major_threshold: DEFAULT_MAJOR_THRESHOLD,
        }
    }

    pub fn with_major_threshold(mut self, threshold: u64) -> Self {
        self.major_threshold = threshold;
        self
    }

    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    fn store(&self, name: &str) -> MarkerStore<'a> {
        MarkerStore::new(self.fs, self.context_dir.join(name))
    }

    fn context(&self) -> LogContext {
        LogContext::new("version").with_config_dir(&self.context_dir)
    }

    /// Compares `current` with the stored marker, recording `current` unless
    /// `read_only` is set.
    ///
    /// An equal marker is never rewritten. The stored marker is written over
    /// before it is parsed, so an unparseable old marker still gets replaced.
    pub fn classify(
        &self,
        current: &VersionMarker,
        read_only: bool,
    ) -> Result<UpdateClassification, ConfigError> {
        let store = self.store(VERSION_FILE);
        let current = current.to_string();

        if !store.exists() {
            if !read_only {
                store.write(&current)?;
            }
            tracing::debug!(marker = %current, read_only, "No version marker, fresh install");
            return Ok(UpdateClassification::Fresh);
        }

        let stored = store.read()?;
        if stored == current {
            return Ok(UpdateClassification::Unchanged);
        }

        if !read_only {
            store.write(&current)?;
        }

        let previous =
            Version::parse_marker(&stored).ok_or_else(|| ConfigError::InvalidVersion {
                marker: stored.clone(),
            })?;

        let classification = if previous.major < self.major_threshold {
            UpdateClassification::MajorUpgrade { previous }
        } else {
            UpdateClassification::MinorUpgrade { previous }
        };
        tracing::info!(
            from = %stored,
            to = %current,
            classification = %classification,
            "Version changed"
        );
        Ok(classification)
    }

    /// [`Self::classify`] that logs any failure and returns `default`.
    pub fn classify_or(
        &self,
        current: &VersionMarker,
        read_only: bool,
        default: UpdateClassification,
    ) -> UpdateClassification {
        match self.classify(current, read_only) {
            Ok(classification) => classification,
            Err(e) => {
                self.log
                    .error(&self.context(), "Failed to classify installation", &e);
                default
            }
        }
    }

    /// Records that required extensions were installed for `current`.
    pub fn update_required_extension(&self, current: &VersionMarker) {
        let store = self.store(REQUIRED_EXTENSION_FILE);
        if let Err(e) = store.write(&current.to_string()) {
            self.log.error(&self.context(), REQUIRED_EXTENSION_FILE, &e);
        }
    }

    /// True only when the extension marker exists and equals `current`.
    pub fn is_required_extension(&self, current: &VersionMarker) -> bool {
        let store = self.store(REQUIRED_EXTENSION_FILE);
        if !store.exists() {
            return false;
        }
        match store.read() {
            Ok(written) => written == current.to_string(),
            Err(e) => {
                self.log.error(&self.context(), REQUIRED_EXTENSION_FILE, &e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFileSystem;
    use tempfile::TempDir;
    use testing::{FailingFileSystem, RecordingLog};

    fn marker(version: &str) -> VersionMarker {
        VersionMarker::new(version, "1700000000000")
    }

    fn read_marker(dir: &TempDir, name: &str) -> String {
        std::fs::read_to_string(dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_fresh_install_writes_marker() {
        let dir = TempDir::new().unwrap();
        let log = RecordingLog::default();
        let tracker = VersionTracker::new(&StdFileSystem, dir.path(), &log);

        let result = tracker.classify(&marker("6.0.0.1"), false).unwrap();

        assert_eq!(result, UpdateClassification::Fresh);
        assert_eq!(read_marker(&dir, VERSION_FILE), "6.0.0.1-1700000000000");
    }

    #[test]
    fn test_fresh_install_read_only_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let log = RecordingLog::default();
        let tracker = VersionTracker::new(&StdFileSystem, dir.path(), &log);

        let result = tracker.classify(&marker("6.0.0.1"), true).unwrap();

        assert_eq!(result, UpdateClassification::Fresh);
        assert!(!dir.path().join(VERSION_FILE).exists());
    }

    #[test]
    fn test_unchanged_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), "6.0.0.1-1700000000000\n").unwrap();
        let log = RecordingLog::default();
        let tracker = VersionTracker::new(&StdFileSystem, dir.path(), &log);

        let result = tracker.classify(&marker("6.0.0.1"), false).unwrap();

        assert_eq!(result, UpdateClassification::Unchanged);
        assert_eq!(read_marker(&dir, VERSION_FILE), "6.0.0.1-1700000000000\n");
    }

    #[test]
    fn test_marker_equality_ignores_only_surrounding_whitespace() {
        let dir = TempDir::new().unwrap();
        let log = RecordingLog::default();
        let tracker = VersionTracker::new(&StdFileSystem, dir.path(), &log);

        std::fs::write(dir.path().join(VERSION_FILE), "  6.0.0.1-1700000000000\r\n").unwrap();
        let result = tracker.classify(&marker("6.0.0.1"), true).unwrap();
        assert_eq!(result, UpdateClassification::Unchanged);

        // Same version, other release time: still a plain string mismatch.
        std::fs::write(dir.path().join(VERSION_FILE), "6.0.0.1-1700000000001").unwrap();
        let result = tracker.classify(&marker("6.0.0.1"), true).unwrap();
        assert!(matches!(result, UpdateClassification::MinorUpgrade { .. }));
    }

    #[test]
    fn test_upgrade_from_four_is_major() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), "4.5.2.018-1500000000000").unwrap();
        let log = RecordingLog::default();
        let tracker = VersionTracker::new(&StdFileSystem, dir.path(), &log);

        let result = tracker.classify(&marker("6.0.0.1"), false).unwrap();

        assert!(result.needs_migration());
        assert_eq!(result.previous().unwrap().major, 4);
        assert_eq!(read_marker(&dir, VERSION_FILE), "6.0.0.1-1700000000000");
    }

    #[test]
    fn test_upgrade_from_five_is_minor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), "5.3.7.47-1611064498000").unwrap();
        let log = RecordingLog::default();
        let tracker = VersionTracker::new(&StdFileSystem, dir.path(), &log);

        let result = tracker.classify(&marker("6.0.0.1"), true).unwrap();

        match result {
            UpdateClassification::MinorUpgrade { previous } => {
                assert_eq!(previous.to_string(), "5.3.7.47");
            }
            other => panic!("expected minor upgrade, got {other}"),
        }
        assert_eq!(read_marker(&dir, VERSION_FILE), "5.3.7.47-1611064498000");
    }

    #[test]
    fn test_custom_threshold() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), "5.3.7.47-1").unwrap();
        let log = RecordingLog::default();
        let tracker =
            VersionTracker::new(&StdFileSystem, dir.path(), &log).with_major_threshold(6);

        let result = tracker.classify(&marker("6.0.0.1"), true).unwrap();

        assert_eq!(result.as_str(), "new-from4");
    }

    #[test]
    fn test_invalid_stored_marker_is_replaced_then_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(VERSION_FILE), "garbage").unwrap();
        let log = RecordingLog::default();
        let tracker = VersionTracker::new(&StdFileSystem, dir.path(), &log);

        let err = tracker.classify(&marker("6.0.0.1"), false).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidVersion { ref marker } if marker == "garbage"));
        assert_eq!(read_marker(&dir, VERSION_FILE), "6.0.0.1-1700000000000");
    }

    #[test]
    fn test_classify_or_swallows_io_errors() {
        let log = RecordingLog::default();
        let fs = FailingFileSystem::existing();
        let tracker = VersionTracker::new(&fs, "/opt/lucee/context", &log);

        let result =
            tracker.classify_or(&marker("6.0.0.1"), false, UpdateClassification::Unchanged);

        assert_eq!(result, UpdateClassification::Unchanged);
        assert!(log.contains_error("simulated failure"));
    }

    #[test]
    fn test_required_extension_round() {
        let dir = TempDir::new().unwrap();
        let log = RecordingLog::default();
        let tracker = VersionTracker::new(&StdFileSystem, dir.path(), &log);
        let current = marker("6.0.0.1");

        assert!(!tracker.is_required_extension(&current));
        tracker.update_required_extension(&current);
        assert!(tracker.is_required_extension(&current));
        assert!(!tracker.is_required_extension(&marker("6.0.0.2")));
        assert!(log.errors().is_empty());
    }

    #[test]
    fn test_required_extension_failures_are_logged() {
        let log = RecordingLog::default();
        let fs = FailingFileSystem::existing();
        let tracker = VersionTracker::new(&fs, "/ctx", &log);

        tracker.update_required_extension(&marker("6.0.0.1"));
        assert!(!tracker.is_required_extension(&marker("6.0.0.1")));

        assert_eq!(log.errors(), vec![REQUIRED_EXTENSION_FILE; 2]);
    }
}
