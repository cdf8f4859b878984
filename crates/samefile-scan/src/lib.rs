//! Directory scanning engine for samefile.
//!
//! This crate walks a directory tree with jwalk and produces a lazy,
//! possibly very large sequence of candidate files filtered by an
//! extension allow-list.
//!
//! - **Lazy** - descriptors are produced as the walk progresses
//! - **Fail-fast** - the first traversal error ends the sequence
//! - **Backpressure** - [`feed`] blocks while the consumer's mailbox is full
//!
//! # Example
//!
//! ```rust,no_run
//! use samefile_scan::{FinderConfig, Scanner};
//!
//! let config = FinderConfig::new("/path/to/photos");
//! for file in Scanner::new(config).walk() {
//!     let file = file.unwrap();
//!     println!("{} ({} bytes)", file.path.display(), file.size);
//! }
//! ```

mod scanner;

pub use scanner::{FileMessage, Scanner, Walk, feed};

// Re-export core types for convenience
pub use samefile_core::{FileDescriptor, FinderConfig, ScanError};
