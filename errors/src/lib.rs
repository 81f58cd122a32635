//! # Configuration Migration Errors
//!
//! Error taxonomy shared by the loader, the version tracker and the
//! migration engine.
//!
//! - `Parse`: a legacy or current document could not be read into a tree
//! - `Io`: a filesystem operation failed
//! - `Serialization`: the output document could not be produced
//! - `ResourceNotFound`: a bundled template is missing
//! - `InvalidVersion`: a stored version marker could not be parsed

use std::path::Path;
use thiserror::Error;

/// Errors raised while loading, tracking or migrating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("File [{resource}] does not exist.")]
    ResourceNotFound { resource: String },

    #[error("Invalid version marker: {marker}")]
    InvalidVersion { marker: String },
}

impl ConfigError {
    pub fn parse(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// True when a document was read but could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
