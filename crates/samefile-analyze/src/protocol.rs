//! Messages exchanged between pipeline stages.
//!
//! Every edge carries payloads plus two distinct end-of-stream signals:
//! `Terminate` (graceful, downstream drains its work first) and `Abort`
//! (failure, forwarded immediately).

use samefile_core::{Digest, FileDescriptor};

use crate::PipelineError;

/// Counters carried along with the termination signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Candidate files seen by the grouper.
    pub files_scanned: u64,
    /// Hashing requests the grouper emitted.
    pub hash_requests: u64,
    /// Requests whose file could not be read.
    pub hash_failures: u64,
}

/// Grouper -> hasher.
#[derive(Debug)]
pub enum HashMessage {
    /// Compute the digest of this file.
    Hash(FileDescriptor),
    /// No more requests; forward once in-flight work has drained.
    Terminate(RunStats),
    /// Upstream failed; forward immediately.
    Abort(PipelineError),
}

/// Hasher -> aggregator.
#[derive(Debug)]
pub enum ResultMessage {
    /// A file and its content digest.
    Hashed(Digest, FileDescriptor),
    /// Every dispatched request has completed.
    Terminate(RunStats),
    /// The run failed; no report.
    Abort(PipelineError),
}
