//! Core types and configuration for samefile.
//!
//! This crate provides the data model shared by the scanner and the
//! duplicate-detection pipeline: file descriptors, the cheap equality
//! trait, SHA-256 digests, duplicate groups and the final report.

mod config;
mod digest;
mod error;
mod file;
mod report;

pub use config::{DEFAULT_EXTENSIONS, FinderConfig, FinderConfigBuilder};
pub use digest::{DIGEST_LEN, Digest};
pub use error::{ConfigError, HashError, ScanError};
pub use file::{FileDescriptor, FileTrait, extension_of};
pub use report::{DuplicateGroup, DuplicateReport};
