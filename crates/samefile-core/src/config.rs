//! Duplicate finder configuration.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Extensions scanned when none are configured: common JPEG and camera RAW suffixes.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "nef", "raf", "dng", "arw", "crw", "cr2", "cr3",
];

/// Configuration for a duplicate-finding run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct FinderConfig {
    /// Root directory to scan.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Allow-list of file extensions, matched case-insensitively.
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Whether the extension participates in the equality trait.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub extension_sensitive: bool,

    /// Follow symbolic links while walking.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Number of threads for walking (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Bounded mailbox size of every pipeline stage.
    #[builder(default = "1024")]
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Maximum number of files read for hashing at the same time.
    #[builder(default = "64")]
    #[serde(default = "default_max_concurrent_hashes")]
    pub max_concurrent_hashes: usize,

    /// Read chunk size when streaming file content into the digest.
    #[builder(default = "64 * 1024")]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Log grouper progress every N files (0 = never).
    #[builder(default = "100")]
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_max_concurrent_hashes() -> usize {
    64
}

fn default_chunk_size() -> usize {
    64 * 1024
}

fn default_progress_interval() -> u64 {
    100
}

impl FinderConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(ref extensions) = self.extensions {
            if extensions.is_empty() {
                return Err("Extension allow-list cannot be empty".to_string());
            }
        }
        for (name, value) in [
            ("channel_capacity", self.channel_capacity),
            ("max_concurrent_hashes", self.max_concurrent_hashes),
            ("chunk_size", self.chunk_size),
        ] {
            if value == Some(0) {
                return Err(format!("{name} must be greater than zero"));
            }
        }
        Ok(())
    }
}

impl FinderConfig {
    /// Create a new config builder.
    pub fn builder() -> FinderConfigBuilder {
        FinderConfigBuilder::default()
    }

    /// Create a config with defaults for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: default_extensions(),
            extension_sensitive: true,
            follow_symlinks: false,
            threads: 0,
            channel_capacity: default_channel_capacity(),
            max_concurrent_hashes: default_max_concurrent_hashes(),
            chunk_size: default_chunk_size(),
            progress_interval: default_progress_interval(),
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check an already-built config (e.g. after manual field edits).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("Root path cannot be empty".into()));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "Extension allow-list cannot be empty".into(),
            ));
        }
        if self.channel_capacity == 0 || self.max_concurrent_hashes == 0 || self.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "Capacities and chunk size must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Check whether a (lowercase) extension is in the allow-list.
    ///
    /// Configured entries may carry a leading dot and any case.
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
