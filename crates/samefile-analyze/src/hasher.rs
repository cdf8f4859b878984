//! Hasher stage: reads requested files concurrently and gates shutdown on
//! the number of reads still in flight.
//!
//! The inbox is only polled while fewer than `max_concurrent` reads are
//! outstanding, so a backlog stays in the bounded mailbox and throttles the
//! stages upstream.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, warn};

use samefile_core::{Digest, FileDescriptor, HashError};

use crate::digester::ContentDigester;
use crate::progress::ProgressEvent;
use crate::protocol::{HashMessage, ResultMessage, RunStats};
use crate::PipelineError;

type HashOutcome = Result<(Digest, FileDescriptor), HashError>;

/// Owns the in-flight reads of one run.
pub struct Hasher<D> {
    digester: Arc<D>,
    max_concurrent: usize,
    in_flight: usize,
    reading: HashMap<task::Id, PathBuf>,
    shutdown_requested: bool,
    termination_forwarded: bool,
    stats: RunStats,
    completed: u64,
    progress_tx: Option<broadcast::Sender<ProgressEvent>>,
}

impl<D: ContentDigester> Hasher<D> {
    /// Create a hasher allowing `max_concurrent` simultaneous reads.
    pub fn new(digester: Arc<D>, max_concurrent: usize) -> Self {
        Self {
            digester,
            max_concurrent: max_concurrent.max(1),
            in_flight: 0,
            reading: HashMap::new(),
            shutdown_requested: false,
            termination_forwarded: false,
            stats: RunStats::default(),
            completed: 0,
            progress_tx: None,
        }
    }

    /// Broadcast progress events to `tx`.
    pub fn with_progress(mut self, tx: broadcast::Sender<ProgressEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Drive the hasher until termination has been forwarded or the run aborted.
    pub async fn run(
        mut self,
        mut inbox: mpsc::Receiver<HashMessage>,
        results: mpsc::Sender<ResultMessage>,
    ) -> Result<RunStats, PipelineError> {
        let mut reads: JoinSet<HashOutcome> = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                Some(joined) = reads.join_next_with_id(), if self.in_flight > 0 => {
                    let outcome = self.joined(joined);
                    self.complete(outcome, &results).await?;
                }

                message = inbox.recv(),
                    if !self.shutdown_requested && self.in_flight < self.max_concurrent =>
                match message {
                    Some(HashMessage::Hash(file)) => self.dispatch(file, &mut reads),
                    Some(HashMessage::Terminate(stats)) => {
                        debug!(in_flight = self.in_flight, "termination requested");
                        self.stats.files_scanned = stats.files_scanned;
                        self.stats.hash_requests = stats.hash_requests;
                        self.shutdown_requested = true;
                    }
                    Some(HashMessage::Abort(reason)) => {
                        return self.abort(reason, &mut reads, &results).await;
                    }
                    None => {
                        error!("Grouper stopped without signalling completion");
                        return self
                            .abort(PipelineError::stage("grouper"), &mut reads, &results)
                            .await;
                    }
                },

                else => return Err(PipelineError::stage("hasher")),
            }

            if self.forward_termination_if_drained(&results).await? {
                return Ok(self.stats);
            }
        }
    }

    fn dispatch(&mut self, file: FileDescriptor, reads: &mut JoinSet<HashOutcome>) {
        self.in_flight += 1;
        let digester = Arc::clone(&self.digester);
        let path = file.path.clone();

        let handle = reads.spawn(async move {
            match digester.digest(&file.path).await {
                Ok(digest) => Ok((digest, file)),
                Err(source) => Err(HashError::new(file.path, source)),
            }
        });
        self.reading.insert(handle.id(), path);
    }

    /// Resolve a finished read task, attributing a panicked read to its file.
    fn joined(&mut self, joined: Result<(task::Id, HashOutcome), JoinError>) -> HashOutcome {
        match joined {
            Ok((id, outcome)) => {
                self.reading.remove(&id);
                outcome
            }
            Err(e) => {
                let path = self.reading.remove(&e.id()).unwrap_or_default();
                Err(HashError::new(path, std::io::Error::other(e.to_string())))
            }
        }
    }

    async fn complete(
        &mut self,
        outcome: HashOutcome,
        results: &mpsc::Sender<ResultMessage>,
    ) -> Result<(), PipelineError> {
        self.in_flight -= 1;

        match outcome {
            Ok((digest, file)) => {
                self.completed += 1;
                results
                    .send(ResultMessage::Hashed(digest, file))
                    .await
                    .map_err(|_| PipelineError::stage("aggregator"))?;
            }
            Err(err) => {
                // Dropped from the run; does not stop the pipeline
                self.stats.hash_failures += 1;
                error!("{err}");
            }
        }

        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(ProgressEvent::Hashed {
                hashes_completed: self.completed,
                hash_failures: self.stats.hash_failures,
                in_flight: self.in_flight,
            });
        }
        Ok(())
    }

    /// Forward `Terminate` once, after shutdown was requested and every read finished.
    async fn forward_termination_if_drained(
        &mut self,
        results: &mpsc::Sender<ResultMessage>,
    ) -> Result<bool, PipelineError> {
        if !self.shutdown_requested || self.in_flight > 0 || self.termination_forwarded {
            return Ok(self.termination_forwarded);
        }
        self.termination_forwarded = true;
        debug!(
            completed = self.completed,
            failed = self.stats.hash_failures,
            "hashing drained, forwarding termination"
        );
        results
            .send(ResultMessage::Terminate(self.stats))
            .await
            .map_err(|_| PipelineError::stage("aggregator"))?;
        Ok(true)
    }

    /// Forward `Abort` without waiting for outstanding reads, then cancel them.
    async fn abort(
        &mut self,
        reason: PipelineError,
        reads: &mut JoinSet<HashOutcome>,
        results: &mpsc::Sender<ResultMessage>,
    ) -> Result<RunStats, PipelineError> {
        if self.in_flight > 0 {
            warn!(in_flight = self.in_flight, "aborting with hashing still in flight");
        }
        self.termination_forwarded = true;
        results
            .send(ResultMessage::Abort(reason))
            .await
            .map_err(|_| PipelineError::stage("aggregator"))?;
        reads.abort_all();
        Ok(self.stats)
    }
}
