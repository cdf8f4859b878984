//! Pipeline wiring: scanner -> grouper -> hasher -> aggregator.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use samefile_core::{DuplicateReport, FileDescriptor, FinderConfig, ScanError};
use samefile_scan::{Scanner, feed};

use crate::aggregator::Aggregator;
use crate::digester::{ContentDigester, Sha256Digester};
use crate::grouper::TraitGrouper;
use crate::hasher::Hasher;
use crate::progress::ProgressEvent;
use crate::PipelineError;

/// Duplicate file finder running the four-stage pipeline.
pub struct DuplicateFinder<D = Sha256Digester> {
    config: FinderConfig,
    digester: Arc<D>,
    progress_tx: broadcast::Sender<ProgressEvent>,
}

impl DuplicateFinder<Sha256Digester> {
    /// Create a finder hashing with SHA-256.
    pub fn new(config: FinderConfig) -> Self {
        let digester = Sha256Digester::new(config.chunk_size);
        Self::with_digester(config, digester)
    }
}

impl<D: ContentDigester> DuplicateFinder<D> {
    /// Create a finder with a custom digester.
    pub fn with_digester(config: FinderConfig, digester: D) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            config,
            digester: Arc::new(digester),
            progress_tx,
        }
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress_tx.subscribe()
    }

    /// Scan the configured root and report duplicate groups.
    pub async fn run(&self) -> Result<DuplicateReport, PipelineError> {
        info!(
            "Scanning {} for duplicates of files: {:?}",
            self.config.root.display(),
            self.config.extensions
        );
        let scanner = Scanner::new(self.config.clone());
        self.run_pipeline(move || scanner.walk()).await
    }

    /// Run the pipeline over an arbitrary candidate sequence.
    ///
    /// The sequence is consumed on a blocking thread; the first `Err` aborts the run.
    pub async fn run_with_source<I>(&self, source: I) -> Result<DuplicateReport, PipelineError>
    where
        I: IntoIterator<Item = Result<FileDescriptor, ScanError>> + Send + 'static,
    {
        self.run_pipeline(move || source).await
    }

    async fn run_pipeline<F, I>(&self, make_source: F) -> Result<DuplicateReport, PipelineError>
    where
        F: FnOnce() -> I + Send + 'static,
        I: IntoIterator<Item = Result<FileDescriptor, ScanError>>,
    {
        let capacity = self.config.channel_capacity.max(1);
        let (file_tx, file_rx) = mpsc::channel(capacity);
        let (hash_tx, hash_rx) = mpsc::channel(capacity);
        let (result_tx, result_rx) = mpsc::channel(capacity);

        let scan = tokio::task::spawn_blocking(move || feed(make_source(), &file_tx));

        let grouper = TraitGrouper::new(self.config.extension_sensitive)
            .with_progress_interval(self.config.progress_interval)
            .with_progress(self.progress_tx.clone());
        let grouper = tokio::spawn(grouper.run(file_rx, hash_tx));

        let hasher = Hasher::new(Arc::clone(&self.digester), self.config.max_concurrent_hashes)
            .with_progress(self.progress_tx.clone());
        let hasher = tokio::spawn(hasher.run(hash_rx, result_tx));

        let aggregator = tokio::spawn(Aggregator::new().run(result_rx));

        let outcome = match aggregator.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("aggregator task failed: {e}");
                Err(PipelineError::stage("aggregator"))
            }
        };

        join_stage("grouper", grouper).await;
        join_stage("hasher", hasher).await;
        if let Err(e) = scan.await {
            error!("scanner task failed: {e}");
        }

        outcome
    }
}

/// Await a stage task, logging (not propagating) its failure.
///
/// The aggregator's outcome already reflects any upstream failure.
async fn join_stage<T>(name: &str, handle: JoinHandle<Result<T, PipelineError>>) {
    match handle.await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => error!("{name} stage failed: {e}"),
        Err(e) => error!("{name} task failed: {e}"),
    }
}
