//! Concurrent duplicate detection pipeline for samefile.
//!
//! Four stages run as independent tasks connected by bounded channels:
//!
//! 1. **Scanner** - walks the tree and streams candidate files
//! 2. **Trait grouper** - buckets files by size (and optionally extension)
//!    and requests hashing only once a bucket has a second member
//! 3. **Hasher** - streams requested files through SHA-256 concurrently
//! 4. **Aggregator** - groups files by digest and builds the report
//!
//! A graceful `Terminate` signal cascades from the scanner; the hasher holds
//! it back until every in-flight read has completed, so the report never
//! misses a result. A traversal failure instead cascades `Abort`, which the
//! hasher forwards immediately and the run ends without a report.
//!
//! ```rust,no_run
//! use samefile_analyze::{DuplicateFinder, FinderConfig};
//!
//! # async fn example() -> Result<(), samefile_analyze::PipelineError> {
//! let finder = DuplicateFinder::new(FinderConfig::new("/path/to/photos"));
//! let report = finder.run().await?;
//!
//! println!("Found {} duplicate groups", report.group_count());
//! for group in &report.groups {
//!     println!("{}: {} files", group.digest, group.count());
//! }
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod digester;
mod error;
mod finder;
mod grouper;
mod hasher;
mod progress;
mod protocol;

pub use aggregator::Aggregator;
pub use digester::{ContentDigester, DEFAULT_CHUNK_SIZE, Sha256Digester};
pub use error::PipelineError;
pub use finder::DuplicateFinder;
pub use grouper::{Requests, TraitGrouper};
pub use hasher::Hasher;
pub use progress::ProgressEvent;
pub use protocol::{HashMessage, ResultMessage, RunStats};

// Re-export core types
pub use samefile_core::{
    Digest, DuplicateGroup, DuplicateReport, FileDescriptor, FinderConfig, ScanError,
};
