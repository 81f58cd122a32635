//! # Migration Engine
//!
//! Reads a legacy document, runs the section tables over it, prunes empty
//! containers and writes the result in the current format.
//!
//! ## Failure semantics
//!
//! Unlike [`crate::recovery`], the engine assumes a well-formed source:
//! parse, IO and serialization errors propagate unchanged. The legacy file
//! is only ever read. Nothing is rolled back; the destination is written in
//! one atomic step at the very end, so a failed run leaves it untouched.

use crate::document::{JsonDocumentWriter, unwrap_legacy_root};
use crate::editor::prune_empty;
use crate::sections::{CacheTypes, sections};
use crate::xml::XmlDocumentReader;
use cm_core::{DocumentReader, DocumentWriter, FileSystem, LogContext, LogSink, Tree};
use errors::ConfigError;
use serde::Serialize;
use std::path::Path;

/// Rules that changed the tree, per section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub name: &'static str,
    pub changes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub sections: Vec<SectionReport>,
    /// Whether the final prune removed any empty container.
    pub pruned: bool,
}

impl MigrationReport {
    pub fn total_changes(&self) -> usize {
        self.sections.iter().map(|s| s.changes).sum()
    }
}

pub struct MigrationEngine<'a> {
    fs: &'a dyn FileSystem,
    log: &'a dyn LogSink,
    reader: Box<dyn DocumentReader + 'a>,
    writer: Box<dyn DocumentWriter + 'a>,
    cache_types: CacheTypes,
}

impl<'a> MigrationEngine<'a> {
    /// Engine reading legacy XML and writing pretty JSON.
    pub fn new(fs: &'a dyn FileSystem, log: &'a dyn LogSink) -> Self {
        Self {
            fs,
            log,
            reader: Box::new(XmlDocumentReader::default()),
            writer: Box::new(JsonDocumentWriter::default()),
            cache_types: CacheTypes::default(),
        }
    }

    pub fn with_reader(mut self, reader: impl DocumentReader + 'a) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn with_writer(mut self, writer: impl DocumentWriter + 'a) -> Self {
        self.writer = Box::new(writer);
        self
    }

    pub fn with_cache_types(mut self, cache_types: CacheTypes) -> Self {
        self.cache_types = cache_types;
        self
    }

    /// Translates `old_path` into a new document at `new_path`, replacing
    /// any file already there.
    pub fn migrate(&self, old_path: &Path, new_path: &Path) -> Result<MigrationReport, ConfigError> {
        let text = self
            .fs
            .read_to_string(old_path)
            .map_err(|e| ConfigError::io(old_path, e))?;
        let mut root = unwrap_legacy_root(self.reader.parse(old_path, &text)?);

        let report = self.translate(&mut root);
        let bytes = self.writer.serialize(&root)?;

        if let Some(parent) = new_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !self.fs.exists(parent) {
                self.fs
                    .create_dir_all(parent)
                    .map_err(|e| ConfigError::io(parent, e))?;
            }
        }
        self.fs
            .write(new_path, &bytes)
            .map_err(|e| ConfigError::io(new_path, e))?;

        tracing::info!(
            from = %old_path.display(),
            to = %new_path.display(),
            changes = report.total_changes(),
            "Configuration migrated"
        );
        let ctx = LogContext::new("migration").with_config_dir(
            new_path.parent().unwrap_or_else(|| Path::new("")),
        );
        self.log.info(
            &ctx,
            &format!(
                "Translated config file [{}] into [{}]",
                old_path.display(),
                new_path.display()
            ),
        );
        Ok(report)
    }

    /// Restructures an already unwrapped legacy root in place.
    pub fn translate(&self, root: &mut Tree) -> MigrationReport {
        let sections = sections(&self.cache_types)
            .iter()
            .map(|section| {
                let changes = section.apply(root);
                tracing::debug!(section = section.name, changes, "Section migrated");
                SectionReport {
                    name: section.name,
                    changes,
                }
            })
            .collect();

        MigrationReport {
            sections,
            pruned: prune_empty(root),
        }
    }
}
