//! # Configuration Migration
//!
//! Keeps a Lucee configuration directory usable across product upgrades.
//!
//! This crate provides:
//! - Version tracking through the `version` and `required-extension` markers
//! - Recovering loads that quarantine broken documents and fall back to the
//!   bundled defaults
//! - Translation of legacy (pre-5) documents into the flat current layout
//! - Settings for the tool itself: file (TOML/YAML), environment variables,
//!   precedence (CLI > env > file > defaults) and validation
//!
//! Filesystem access and log output go through the [`cm_core::FileSystem`]
//! and [`cm_core::LogSink`] seams; [`StdFileSystem`] and [`TracingLogSink`]
//! are the production implementations.

pub mod document;
pub mod editor;
pub mod file_loader;
pub mod fs;
pub mod loader;
pub mod log;
pub mod migration;
pub mod precedence;
pub mod recovery;
pub mod resources;
pub mod rules;
pub mod sections;
pub mod settings;
pub mod validator;
pub mod version;
pub mod xml;

pub use document::{DocumentFormat, JsonDocumentReader, JsonDocumentWriter, unwrap_legacy_root};
pub use file_loader::{SettingsFileError, load_from_file, load_from_toml, load_from_yaml};
pub use fs::StdFileSystem;
pub use loader::load_from_env;
pub use log::TracingLogSink;
pub use migration::{MigrationEngine, MigrationReport, SectionReport};
pub use precedence::merge_settings;
pub use recovery::{RecoveringLoader, quarantine_path};
pub use resources::{ResourceWriter, Resources};
pub use rules::{ListOrder, Location, MigrationRule};
pub use sections::{CacheTypes, Section, sections};
pub use settings::{
    CacheSettings, ObservabilitySettings, OutputSettings, PathSettings, ProductSettings, Settings,
    UpgradeSettings,
};
pub use self::validator::validate_settings;
pub use version::{
    DEFAULT_MAJOR_THRESHOLD, MarkerStore, REQUIRED_EXTENSION_FILE, VERSION_FILE, VersionTracker,
};
pub use xml::XmlDocumentReader;
