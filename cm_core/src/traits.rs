//! Collaborator traits for the configuration migration tool

use crate::tree::Tree;
use errors::ConfigError;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem capability used by the loader, the version tracker and the
/// migration engine.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replaces the file's content atomically, creating it if needed.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Creates an empty file. Returns `false` if it already existed.
    fn create_new_file(&self, path: &Path) -> io::Result<bool>;

    fn delete(&self, path: &Path) -> io::Result<()>;

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Reads document text into a tree.
pub trait DocumentReader: Send + Sync {
    /// `path` is only used to label errors.
    fn parse(&self, path: &Path, text: &str) -> Result<Tree, ConfigError>;
}

/// Produces the bytes of a document from a tree.
pub trait DocumentWriter: Send + Sync {
    fn serialize(&self, tree: &Tree) -> Result<Vec<u8>, ConfigError>;
}

/// Context handed to every log call in place of ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    pub component: &'static str,
    pub config_dir: Option<PathBuf>,
}

impl LogContext {
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            config_dir: None,
        }
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }
}

/// Logging sink for human-readable recovery and tracking messages.
pub trait LogSink: Send + Sync {
    fn info(&self, ctx: &LogContext, message: &str);

    fn error(&self, ctx: &LogContext, message: &str, cause: &dyn std::error::Error);
}
