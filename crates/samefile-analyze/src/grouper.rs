//! Trait grouper: buckets candidates by (size, extension) and requests
//! hashing only once a bucket has a second member.

use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};

use samefile_core::{FileDescriptor, FileTrait};
use samefile_scan::FileMessage;

use crate::progress::ProgressEvent;
use crate::protocol::{HashMessage, RunStats};
use crate::PipelineError;

/// Hashing requests produced by one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requests {
    /// First file with this trait; nothing to hash yet.
    None,
    /// First collision: both the earlier file and the new one.
    Pair(FileDescriptor, FileDescriptor),
    /// Bucket already hashed; only the new file.
    Single(FileDescriptor),
}

impl Requests {
    /// Number of hashing requests.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Single(_) => 1,
            Self::Pair(..) => 2,
        }
    }

    /// Whether the file needs no hashing yet.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl IntoIterator for Requests {
    type Item = FileDescriptor;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<FileDescriptor>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        let pair = match self {
            Self::None => [None, None],
            Self::Single(f) => [Some(f), None],
            Self::Pair(first, second) => [Some(first), Some(second)],
        };
        pair.into_iter().flatten()
    }
}

/// Owns the trait buckets for one run.
#[derive(Debug)]
pub struct TraitGrouper {
    extension_sensitive: bool,
    seen: HashMap<FileTrait, Vec<FileDescriptor>>,
    processed: u64,
    hash_requests: u64,
    progress_interval: u64,
    progress_tx: Option<broadcast::Sender<ProgressEvent>>,
}

impl TraitGrouper {
    /// Create a grouper.
    pub fn new(extension_sensitive: bool) -> Self {
        Self {
            extension_sensitive,
            seen: HashMap::new(),
            processed: 0,
            hash_requests: 0,
            progress_interval: 100,
            progress_tx: None,
        }
    }

    /// Log progress every `interval` files (0 disables).
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Broadcast progress events to `tx`.
    pub fn with_progress(mut self, tx: broadcast::Sender<ProgressEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Files processed so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Hashing requests emitted so far.
    pub fn hash_requests(&self) -> u64 {
        self.hash_requests
    }

    /// Record a candidate and return the hashing requests it triggers.
    pub fn observe(&mut self, file: FileDescriptor) -> Requests {
        let key = FileTrait::of(&file, self.extension_sensitive);
        self.processed += 1;

        let bucket = self.seen.entry(key).or_default();
        bucket.push(file);
        let requests = match bucket.len() {
            1 => Requests::None,
            2 => Requests::Pair(bucket[0].clone(), bucket[1].clone()),
            n => Requests::Single(bucket[n - 1].clone()),
        };
        self.hash_requests += requests.len() as u64;

        if self.progress_interval > 0 && self.processed % self.progress_interval == 0 {
            info!("Processed {} files", self.processed);
            self.report_progress();
        }

        requests
    }

    fn report_progress(&self) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(ProgressEvent::Grouped {
                files_processed: self.processed,
                hash_requests: self.hash_requests,
            });
        }
    }

    fn stats(&self) -> RunStats {
        RunStats {
            files_scanned: self.processed,
            hash_requests: self.hash_requests,
            hash_failures: 0,
        }
    }

    /// Drive the grouper until the scanner finishes or fails.
    ///
    /// Always ends by sending `Terminate` or `Abort` to the hasher, unless the
    /// hasher is already gone.
    pub async fn run(
        mut self,
        mut inbox: mpsc::Receiver<FileMessage>,
        hasher: mpsc::Sender<HashMessage>,
    ) -> Result<RunStats, PipelineError> {
        loop {
            match inbox.recv().await {
                Some(FileMessage::File(file)) => {
                    for request in self.observe(file) {
                        hasher
                            .send(HashMessage::Hash(request))
                            .await
                            .map_err(|_| PipelineError::stage("hasher"))?;
                    }
                }
                Some(FileMessage::Done) => {
                    let stats = self.stats();
                    info!("Finished searching, scanned {} files.", self.processed);
                    self.report_progress();
                    hasher
                        .send(HashMessage::Terminate(stats))
                        .await
                        .map_err(|_| PipelineError::stage("hasher"))?;
                    return Ok(stats);
                }
                Some(FileMessage::Failed(err)) => {
                    error!("Failure, exiting. {err}");
                    hasher
                        .send(HashMessage::Abort(PipelineError::Traversal(err)))
                        .await
                        .map_err(|_| PipelineError::stage("hasher"))?;
                    return Ok(self.stats());
                }
                None => {
                    error!("Scanner stopped without signalling completion");
                    hasher
                        .send(HashMessage::Abort(PipelineError::stage("scanner")))
                        .await
                        .map_err(|_| PipelineError::stage("hasher"))?;
                    return Ok(self.stats());
                }
            }
        }
    }
}
