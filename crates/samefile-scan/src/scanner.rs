//! JWalk-based lazy directory scanner.

use std::path::{Path, PathBuf};

use jwalk::{DirEntry, Parallelism, WalkDir};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use samefile_core::{FileDescriptor, FinderConfig, ScanError, extension_of};

/// Messages the scanner pushes into the trait grouper's mailbox.
#[derive(Debug)]
pub enum FileMessage {
    /// A candidate file.
    File(FileDescriptor),
    /// The walk ended successfully.
    Done,
    /// The walk failed; no further files will arrive.
    Failed(ScanError),
}

type EntryResult = Result<DirEntry<((), ())>, jwalk::Error>;

/// Directory scanner filtering by an extension allow-list.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: FinderConfig,
}

impl Scanner {
    /// Create a new scanner.
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Lazily walk the configured root.
    ///
    /// Yields every non-directory entry whose extension is allowed. The first
    /// error ends the sequence.
    pub fn walk(&self) -> Walk {
        let root = match self.resolve_root() {
            Ok(root) => root,
            Err(err) => return Walk::failed(self.config.clone(), err),
        };

        let parallelism = match self.config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: std::time::Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(&root)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(self.config.follow_symlinks)
            .min_depth(1);

        debug!(root = %root.display(), "starting directory walk");

        Walk {
            config: self.config.clone(),
            entries: Some(Box::new(walker.into_iter())),
            pending_error: None,
        }
    }

    /// Canonicalize the root and verify it is a directory.
    fn resolve_root(&self) -> Result<PathBuf, ScanError> {
        let root = self
            .config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&self.config.root, e))?;
        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }
        Ok(root)
    }
}

/// Lazy sequence of candidate files produced by [`Scanner::walk`].
pub struct Walk {
    config: FinderConfig,
    entries: Option<Box<dyn Iterator<Item = EntryResult>>>,
    pending_error: Option<ScanError>,
}

impl Walk {
    fn failed(config: FinderConfig, err: ScanError) -> Self {
        Self {
            config,
            entries: None,
            pending_error: Some(err),
        }
    }

    /// Turn a walker entry into a descriptor, or `None` if it is filtered out.
    fn describe(&self, entry: DirEntry<((), ())>) -> Option<Result<FileDescriptor, ScanError>> {
        if entry.file_type().is_dir() {
            return None;
        }

        let path = entry.path();
        let extension = extension_of(&path);
        if !self.config.allows_extension(&extension) {
            return None;
        }

        // Resolves symlinks; a broken link surfaces as NotFound.
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => return Some(Err(ScanError::io(&path, e))),
        };
        if metadata.is_dir() {
            return None;
        }

        Some(Ok(FileDescriptor {
            path,
            size: metadata.len(),
            extension,
        }))
    }
}

impl Iterator for Walk {
    type Item = Result<FileDescriptor, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err));
        }

        loop {
            let entry = match self.entries.as_mut()?.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    self.entries = None;
                    return Some(Err(walk_error(err)));
                }
            };

            match self.describe(entry) {
                Some(Ok(file)) => return Some(Ok(file)),
                Some(Err(err)) => {
                    self.entries = None;
                    return Some(Err(err));
                }
                None => continue,
            }
        }
    }
}

fn walk_error(err: jwalk::Error) -> ScanError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let message = err.to_string();
    match err.into_io_error() {
        Some(source) => ScanError::io(path, source),
        None => ScanError::Walk { path, message },
    }
}

/// Push a candidate sequence into the grouper's mailbox.
///
/// Blocks while the mailbox is full. Ends with [`FileMessage::Done`] or, on the
/// first error, [`FileMessage::Failed`]. Must run outside the async runtime
/// (e.g. in `spawn_blocking`). Returns the number of files sent.
pub fn feed<I>(source: I, tx: &mpsc::Sender<FileMessage>) -> u64
where
    I: IntoIterator<Item = Result<FileDescriptor, ScanError>>,
{
    let mut sent = 0;
    for item in source {
        match item {
            Ok(file) => {
                if tx.blocking_send(FileMessage::File(file)).is_err() {
                    debug!("grouper mailbox closed, stopping scan");
                    return sent;
                }
                sent += 1;
            }
            Err(err) => {
                warn!(error = %err, "scan failed after {sent} files");
                let _ = tx.blocking_send(FileMessage::Failed(err));
                return sent;
            }
        }
    }
    let _ = tx.blocking_send(FileMessage::Done);
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();
        // A directory that looks like an image must not be yielded
        fs::create_dir(root.join("album.jpg")).unwrap();

        fs::write(root.join("a.jpg"), "hello").unwrap();
        fs::write(root.join("dir1/B.JPG"), "world world").unwrap();
        fs::write(root.join("dir1/subdir/c.nef"), "raw").unwrap();
        fs::write(root.join("dir1/notes.txt"), "ignored").unwrap();
        fs::write(root.join("README"), "ignored").unwrap();

        temp
    }

    fn collect(config: FinderConfig) -> Vec<FileDescriptor> {
        Scanner::new(config)
            .walk()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_walk_filters_by_extension() {
        let temp = create_test_tree();
        let mut files = collect(FinderConfig::new(temp.path()));
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"a.jpg".to_string()));
        assert!(names.contains(&"B.JPG".to_string()));
        assert!(names.contains(&"c.nef".to_string()));

        let upper = files.iter().find(|f| f.path.ends_with("B.JPG")).unwrap();
        assert_eq!(upper.extension, "jpg");
        assert_eq!(upper.size, 11);
        assert!(upper.path.is_absolute());
    }

    #[test]
    fn test_walk_custom_allow_list() {
        let temp = create_test_tree();
        let config = FinderConfig::builder()
            .root(temp.path())
            .extensions(vec!["TXT".to_string()])
            .build()
            .unwrap();

        let files = collect(config);
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("notes.txt"));
    }

    #[test]
    fn test_walk_empty_directory() {
        let temp = TempDir::new().unwrap();
        assert!(collect(FinderConfig::new(temp.path())).is_empty());
    }

    #[test]
    fn test_walk_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let mut walk = Scanner::new(FinderConfig::new(temp.path().join("gone"))).walk();
        assert!(matches!(walk.next(), Some(Err(ScanError::NotFound { .. }))));
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_walk_root_is_file_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.jpg");
        fs::write(&file, "x").unwrap();

        let mut walk = Scanner::new(FinderConfig::new(&file)).walk();
        assert!(matches!(walk.next(), Some(Err(ScanError::NotADirectory { .. }))));
        assert!(walk.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_ends_walk() {
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(temp.path().join("missing.jpg"), temp.path().join("link.jpg"))
            .unwrap();

        let results: Vec<_> = Scanner::new(FinderConfig::new(temp.path())).walk().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ScanError::NotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_file_uses_target_size() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("real.bin"), "0123456789").unwrap();
        std::os::unix::fs::symlink(temp.path().join("real.bin"), temp.path().join("link.jpg"))
            .unwrap();

        let files = collect(FinderConfig::new(temp.path()));
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 10);
    }

    #[test]
    fn test_feed_appends_done() {
        let (tx, mut rx) = mpsc::channel(1);
        let source = vec![
            Ok(FileDescriptor::new("/a.jpg", 1)),
            Ok(FileDescriptor::new("/b.jpg", 2)),
        ];

        let handle = std::thread::spawn(move || feed(source, &tx));

        assert!(matches!(rx.blocking_recv(), Some(FileMessage::File(f)) if f.size == 1));
        assert!(matches!(rx.blocking_recv(), Some(FileMessage::File(f)) if f.size == 2));
        assert!(matches!(rx.blocking_recv(), Some(FileMessage::Done)));
        assert!(rx.blocking_recv().is_none());
        assert_eq!(handle.join().unwrap(), 2);
    }

    #[test]
    fn test_feed_stops_at_first_error() {
        let (tx, mut rx) = mpsc::channel(8);
        let source = vec![
            Ok(FileDescriptor::new("/a.jpg", 1)),
            Err(ScanError::NotFound {
                path: PathBuf::from("/broken.jpg"),
            }),
            Ok(FileDescriptor::new("/never.jpg", 3)),
        ];

        assert_eq!(feed(source, &tx), 1);
        drop(tx);

        assert!(matches!(rx.blocking_recv(), Some(FileMessage::File(_))));
        assert!(matches!(rx.blocking_recv(), Some(FileMessage::Failed(_))));
        assert!(rx.blocking_recv().is_none());
    }
}
