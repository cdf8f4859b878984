//! Aggregator: collects digests and builds the duplicate report at shutdown.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::info;

use samefile_core::{Digest, DuplicateGroup, DuplicateReport, FileDescriptor};

use crate::protocol::{ResultMessage, RunStats};
use crate::PipelineError;

/// Digest -> files sharing it, in arrival order.
#[derive(Debug, Default)]
pub struct Aggregator {
    by_digest: HashMap<Digest, Vec<FileDescriptor>>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one hashed file.
    pub fn add(&mut self, digest: Digest, file: FileDescriptor) {
        self.by_digest.entry(digest).or_default().push(file);
    }

    /// Number of distinct digests seen.
    pub fn digest_count(&self) -> usize {
        self.by_digest.len()
    }

    /// Consume the mapping and keep only digests shared by two or more files.
    pub fn finish(self, stats: RunStats) -> DuplicateReport {
        let groups = self
            .by_digest
            .into_iter()
            .filter_map(|(digest, files)| DuplicateGroup::new(digest, files))
            .collect();

        let mut report = DuplicateReport::new(groups);
        report.files_scanned = stats.files_scanned;
        report.hash_requests = stats.hash_requests;
        report.hash_failures = stats.hash_failures;

        info!(
            "Found {} conflicts, total of {} files.",
            report.group_count(),
            report.duplicated_files()
        );
        for group in &report.groups {
            let paths: Vec<_> = group.paths().map(|p| p.display().to_string()).collect();
            info!("Hash: {}: [{}]", group.digest, paths.join(", "));
        }

        report
    }

    /// Collect results until the hasher terminates or aborts the run.
    pub async fn run(
        mut self,
        mut inbox: mpsc::Receiver<ResultMessage>,
    ) -> Result<DuplicateReport, PipelineError> {
        while let Some(message) = inbox.recv().await {
            match message {
                ResultMessage::Hashed(digest, file) => self.add(digest, file),
                ResultMessage::Terminate(stats) => return Ok(self.finish(stats)),
                ResultMessage::Abort(reason) => return Err(reason),
            }
        }
        Err(PipelineError::stage("hasher"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn file(path: &str) -> FileDescriptor {
        FileDescriptor::new(path, 100)
    }

    #[test]
    fn test_finish_filters_singletons() {
        let x = Digest::of_bytes(b"X");
        let y = Digest::of_bytes(b"Y");

        let mut aggregator = Aggregator::new();
        aggregator.add(x, file("/a.jpg"));
        aggregator.add(y, file("/c.jpg"));
        aggregator.add(x, file("/b.jpg"));
        assert_eq!(aggregator.digest_count(), 2);

        let report = aggregator.finish(RunStats::default());
        assert_eq!(report.group_count(), 1);
        assert_eq!(report.groups[0].digest, x);
        let paths: Vec<_> = report.groups[0].paths().collect();
        assert_eq!(paths, vec![Path::new("/a.jpg"), Path::new("/b.jpg")]);
    }

    #[test]
    fn test_finish_carries_stats() {
        let stats = RunStats {
            files_scanned: 10,
            hash_requests: 4,
            hash_failures: 1,
        };
        let report = Aggregator::new().finish(stats);
        assert!(!report.has_duplicates());
        assert_eq!(report.files_scanned, 10);
        assert_eq!(report.hash_requests, 4);
        assert_eq!(report.hash_failures, 1);
    }

    #[tokio::test]
    async fn test_run_until_terminate() {
        let (tx, rx) = mpsc::channel(8);
        let d = Digest::of_bytes(b"X");
        tx.send(ResultMessage::Hashed(d, file("/a.jpg"))).await.unwrap();
        tx.send(ResultMessage::Hashed(d, file("/b.jpg"))).await.unwrap();
        tx.send(ResultMessage::Terminate(RunStats::default())).await.unwrap();

        let report = Aggregator::new().run(rx).await.unwrap();
        assert_eq!(report.duplicated_files(), 2);
    }

    #[tokio::test]
    async fn test_run_abort_yields_no_report() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(ResultMessage::Hashed(Digest::of_bytes(b"X"), file("/a.jpg")))
            .await
            .unwrap();
        tx.send(ResultMessage::Abort(PipelineError::stage("scanner")))
            .await
            .unwrap();

        let err = Aggregator::new().run(rx).await.unwrap_err();
        assert!(matches!(err, PipelineError::StageFailed { stage: "scanner" }));
    }

    #[tokio::test]
    async fn test_run_closed_channel_is_stage_failure() {
        let (tx, rx) = mpsc::channel::<ResultMessage>(1);
        drop(tx);
        assert!(matches!(
            Aggregator::new().run(rx).await,
            Err(PipelineError::StageFailed { stage: "hasher" })
        ));
    }
}
