//! Pipeline error types.

use samefile_core::ScanError;
use thiserror::Error;

/// Errors that end a pipeline run without a report.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The directory walk failed; the run was aborted.
    #[error("Scan aborted: {0}")]
    Traversal(#[from] ScanError),

    /// A stage stopped without sending a termination signal.
    #[error("Pipeline stage '{stage}' stopped unexpectedly")]
    StageFailed { stage: &'static str },
}

impl PipelineError {
    pub(crate) fn stage(stage: &'static str) -> Self {
        Self::StageFailed { stage }
    }
}
