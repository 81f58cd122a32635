//! # Document Formats
//!
//! Format detection by file name and the current-format (JSON) codec.
//!
//! Detection is by suffix, case-insensitive: `.xml` and `.xml.cfm` are the
//! legacy markup; every other name is read as the current JSON format.

use cm_core::{DocumentReader, DocumentWriter, Tree};
use errors::ConfigError;
use std::path::Path;

/// Root element that wraps every legacy document.
pub const LEGACY_ROOT_ELEMENT: &str = "cfLuceeConfiguration";

const LEGACY_SUFFIXES: &[&str] = &[".xml.cfm", ".xml"];

/// Serialization of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// XML markup read through the legacy reader.
    Legacy,
    /// JSON, the current format.
    Current,
}

impl DocumentFormat {
    pub fn detect(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if LEGACY_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            Self::Legacy
        } else {
            Self::Current
        }
    }
}

/// Strips the legacy root element, mirroring how the reader wraps the
/// document. A document without it yields an empty tree.
pub fn unwrap_legacy_root(mut document: Tree) -> Tree {
    match document.remove(LEGACY_ROOT_ELEMENT) {
        Some(value) => value.into_tree().unwrap_or_default(),
        None => Tree::new(),
    }
}

/// Reads the current JSON format. The top level must be an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentReader;

impl DocumentReader for JsonDocumentReader {
    fn parse(&self, path: &Path, text: &str) -> Result<Tree, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ConfigError::parse(path, e))?;

        Tree::from_json(value)
            .ok_or_else(|| ConfigError::parse(path, "top level is not an object"))
    }
}

/// Writes the current JSON format as UTF-8.
#[derive(Debug, Clone, Copy)]
pub struct JsonDocumentWriter {
    pretty: bool,
}

impl JsonDocumentWriter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for JsonDocumentWriter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DocumentWriter for JsonDocumentWriter {
    fn serialize(&self, tree: &Tree) -> Result<Vec<u8>, ConfigError> {
        let result = if self.pretty {
            serde_json::to_vec_pretty(tree)
        } else {
            serde_json::to_vec(tree)
        };
        result.map_err(|e| ConfigError::Serialization {
            reason: e.to_string(),
        })
    }
}
