//! # Recovering Loader
//!
//! Loads a configuration document and never gives up on a malformed one:
//! the bad file is quarantined next to itself, a default is materialized
//! from the bundled template, and the load is retried exactly once.
//!
//! Quarantined copies are named `lucee-<kind>.<N>.buggy` with the smallest
//! free `N`, so repeated corruption never overwrites earlier evidence.
//! The probe is not atomic across processes; callers serialize access to a
//! configuration directory.

use crate::document::{DocumentFormat, JsonDocumentReader, unwrap_legacy_root};
use crate::resources::{ResourceWriter, Resources};
use crate::xml::XmlDocumentReader;
use cm_core::{ConfigKind, DocumentReader, FileSystem, LogContext, LogSink, Tree};
use errors::ConfigError;
use std::path::{Path, PathBuf};

/// First unused quarantine path for `kind` in `dir`, probing from 1.
pub fn quarantine_path(fs: &dyn FileSystem, dir: &Path, kind: ConfigKind) -> PathBuf {
    let mut n = 1;
    loop {
        let candidate = dir.join(kind.quarantine_name(n));
        if !fs.exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

pub struct RecoveringLoader<'a> {
    fs: &'a dyn FileSystem,
    log: &'a dyn LogSink,
    resources: Resources,
    legacy: XmlDocumentReader,
    current: JsonDocumentReader,
}

impl<'a> RecoveringLoader<'a> {
    pub fn new(fs: &'a dyn FileSystem, log: &'a dyn LogSink) -> Self {
        Self {
            fs,
            log,
            resources: Resources::bundled(),
            legacy: XmlDocumentReader::default(),
            current: JsonDocumentReader,
        }
    }

    /// Replaces the templates used to regenerate defaults.
    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = resources;
        self
    }

    /// Reads and parses `path`, choosing the reader by file name. Errors
    /// propagate.
    pub fn load_document(&self, path: &Path) -> Result<Tree, ConfigError> {
        let text = self
            .fs
            .read_to_string(path)
            .map_err(|e| ConfigError::io(path, e))?;

        match DocumentFormat::detect(path) {
            DocumentFormat::Legacy => Ok(unwrap_legacy_root(self.legacy.parse(path, &text)?)),
            DocumentFormat::Current => self.current.parse(path, &text),
        }
    }

    /// Loads `path`, replacing it with the `kind` default when it cannot be
    /// read. Only a failure to load the regenerated default is returned.
    pub fn load(&self, path: &Path, kind: ConfigKind) -> Result<Tree, ConfigError> {
        let cause = match self.load_document(path) {
            Ok(tree) => return Ok(tree),
            Err(e) => e,
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let ctx = LogContext::new("recovery").with_config_dir(dir);

        if self.fs.exists(path) {
            self.quarantine(&ctx, path, dir, kind, &cause)?;
        } else {
            tracing::debug!(path = %path.display(), %kind, "Config file missing, creating default");
            if !self.fs.exists(dir) {
                self.fs
                    .create_dir_all(dir)
                    .map_err(|e| ConfigError::io(dir, e))?;
            }
        }

        ResourceWriter::new(self.fs, &self.resources, self.log).create_config_file(kind, path)?;
        self.load_document(path)
    }

    fn quarantine(
        &self,
        ctx: &LogContext,
        path: &Path,
        dir: &Path,
        kind: ConfigKind,
        cause: &ConfigError,
    ) -> Result<PathBuf, ConfigError> {
        self.log.info(
            ctx,
            &format!(
                "Config file [{}] was not valid and has been replaced",
                path.display()
            ),
        );
        self.log.error(ctx, "Invalid config file", cause);

        let bug_file = quarantine_path(self.fs, dir, kind);
        self.fs
            .copy(path, &bug_file)
            .map_err(|e| ConfigError::io(&bug_file, e))?;
        self.fs
            .delete(path)
            .map_err(|e| ConfigError::io(path, e))?;

        self.log.info(
            ctx,
            &format!(
                "Invalid config file [{}] saved as [{}]",
                path.display(),
                bug_file.display()
            ),
        );
        Ok(bug_file)
    }
}
