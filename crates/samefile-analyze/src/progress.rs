//! Progress events broadcast while the pipeline runs.

/// Observational progress snapshot from one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Emitted by the grouper every `progress_interval` files.
    Grouped {
        /// Files processed so far.
        files_processed: u64,
        /// Hashing requests emitted so far.
        hash_requests: u64,
    },
    /// Emitted by the hasher after each completed read.
    Hashed {
        /// Digests computed so far.
        hashes_completed: u64,
        /// Reads that failed so far.
        hash_failures: u64,
        /// Requests still being read.
        in_flight: usize,
    },
}
