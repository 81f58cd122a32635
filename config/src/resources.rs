//! # Bundled Resources
//!
//! Default configuration templates compiled into the binary, and helpers
//! that materialize them on disk.
//!
//! Templates are addressed by resource path, e.g.
//! `/resource/config/server.json`, and copied byte-for-byte.

use cm_core::{ConfigKind, FileSystem, LogContext, LogSink};
use errors::ConfigError;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const BUNDLED: &[(&str, &[u8])] = &[
    (
        "/resource/config/server.json",
        include_bytes!("../resource/config/server.json") as &[u8],
    ),
    (
        "/resource/config/web.json",
        include_bytes!("../resource/config/web.json") as &[u8],
    ),
];

/// Lookup table of resource path to content.
#[derive(Debug, Clone)]
pub struct Resources {
    entries: HashMap<String, Cow<'static, [u8]>>,
}

impl Resources {
    /// The templates shipped with this crate.
    pub fn bundled() -> Self {
        Self {
            entries: BUNDLED
                .iter()
                .map(|(path, bytes)| ((*path).to_string(), Cow::Borrowed(*bytes)))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with(mut self, path: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) -> Self {
        self.entries.insert(path.into(), bytes.into());
        self
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(|bytes| bytes.as_ref())
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Writes resources to disk through a `FileSystem`.
pub struct ResourceWriter<'a> {
    fs: &'a dyn FileSystem,
    resources: &'a Resources,
    log: &'a dyn LogSink,
}

impl<'a> ResourceWriter<'a> {
    pub fn new(fs: &'a dyn FileSystem, resources: &'a Resources, log: &'a dyn LogSink) -> Self {
        Self { fs, resources, log }
    }

    fn context(file: &Path) -> LogContext {
        let ctx = LogContext::new("resources");
        match file.parent() {
            Some(dir) => ctx.with_config_dir(dir),
            None => ctx,
        }
    }

    /// Replaces `file` with the content of `resource`.
    pub fn create_file_from_resource(&self, resource: &str, file: &Path) -> Result<(), ConfigError> {
        self.log.info(
            &Self::context(file),
            &format!("Write file: [{}]", file.display()),
        );

        let bytes = self
            .resources
            .get(resource)
            .ok_or_else(|| ConfigError::ResourceNotFound {
                resource: resource.to_string(),
            })?;

        if self.fs.exists(file) {
            self.fs
                .delete(file)
                .map_err(|e| ConfigError::io(file, e))?;
        }
        self.fs
            .write(file, bytes)
            .map_err(|e| ConfigError::io(file, e))
    }

    /// Like [`Self::create_file_from_resource`] but only logs failures.
    pub fn create_file_from_resource_or_log(&self, resource: &str, file: &Path) -> bool {
        match self.create_file_from_resource(resource, file) {
            Ok(()) => true,
            Err(e) => {
                self.log.error(
                    &Self::context(file),
                    &format!("Failed to write [{}] from [{}]", file.display(), resource),
                    &e,
                );
                false
            }
        }
    }

    /// Materializes the default document for `kind` at `file`.
    pub fn create_config_file(&self, kind: ConfigKind, file: &Path) -> Result<(), ConfigError> {
        self.create_file_from_resource(&kind.template_resource(), file)
    }

    /// Materializes `src_path + name` into `dir`, creating `dir` if needed.
    /// Existing files are only replaced when `do_new` is set.
    pub fn create(&self, src_path: &str, name: &str, dir: &Path, do_new: bool) -> PathBuf {
        if !self.fs.exists(dir) {
            if let Err(e) = self.fs.create_dir_all(dir) {
                self.log.error(
                    &LogContext::new("resources").with_config_dir(dir),
                    &format!("Failed to create directory [{}]", dir.display()),
                    &e,
                );
            }
        }

        let file = dir.join(name);
        if do_new || !self.fs.exists(&file) {
            self.create_file_from_resource_or_log(&format!("{src_path}{name}"), &file);
        }
        file
    }

    pub fn create_all(&self, src_path: &str, names: &[&str], dir: &Path, do_new: bool) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| self.create(src_path, name, dir, do_new))
            .collect()
    }

    /// Deletes `dir/name` if present; failures are logged.
    pub fn delete(&self, dir: &Path, name: &str) {
        let file = dir.join(name);
        if !self.fs.exists(&file) {
            return;
        }
        let ctx = LogContext::new("resources").with_config_dir(dir);
        self.log
            .info(&ctx, &format!("Delete file: [{}]", file.display()));
        if let Err(e) = self.fs.delete(&file) {
            self.log
                .error(&ctx, &format!("Failed to delete [{}]", file.display()), &e);
        }
    }

    pub fn delete_all(&self, dir: &Path, names: &[&str]) {
        for name in names {
            self.delete(dir, name);
        }
    }
}
