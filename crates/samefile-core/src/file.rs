//! File descriptors and the cheap equality trait used to prune hashing.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A candidate file produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Length in bytes.
    pub size: u64,
    /// Lowercase final suffix of the file name (empty if none).
    pub extension: CompactString,
}

impl FileDescriptor {
    /// Create a descriptor, deriving the extension from the path.
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            size,
            extension,
        }
    }

    /// Equality trait of this file.
    pub fn file_trait(&self, extension_sensitive: bool) -> FileTrait {
        FileTrait::of(self, extension_sensitive)
    }
}

/// Cheap, non-content equality key.
///
/// Two files with equal traits are hash candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTrait {
    pub size: u64,
    /// Present only in extension-sensitive mode.
    pub extension: Option<CompactString>,
}

impl FileTrait {
    /// Derive the trait of a descriptor.
    pub fn of(file: &FileDescriptor, extension_sensitive: bool) -> Self {
        Self {
            size: file.size,
            extension: extension_sensitive.then(|| file.extension.clone()),
        }
    }
}

/// Lowercase text after the last `.` of the file name.
///
/// `photo.JPG` -> `jpg`, `archive.tar.gz` -> `gz`, `README` -> ``,
/// `name.` -> ``, `.jpg` -> `jpg`.
pub fn extension_of(path: &Path) -> CompactString {
    let Some(name) = path.file_name() else {
        return CompactString::default();
    };
    let name = name.to_string_lossy();
    match name.rsplit_once('.') {
        Some((_, ext)) => CompactString::new(ext.to_lowercase()),
        None => CompactString::default(),
    }
}
