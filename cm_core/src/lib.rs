//! # Configuration Migration Core
//!
//! Shared types and traits for the configuration migration tool.
//!
//! This crate provides:
//! - The generic configuration tree (`Tree`, `Value`, `Scalar`, `Key`)
//! - Version markers and update classification
//! - Collaborator traits for documents, the filesystem and logging
//!
//! # Best Practices
//!
//! - Uses Rust Edition 2024
//! - Keys are case-insensitive and keep the spelling they were first
//!   inserted with

pub mod traits;
pub mod tree;
pub mod types;

pub use traits::{DocumentReader, DocumentWriter, FileSystem, LogContext, LogSink};
pub use tree::{Key, Scalar, Tree, Value};
pub use types::{ConfigKind, UpdateClassification, Version, VersionMarker};
