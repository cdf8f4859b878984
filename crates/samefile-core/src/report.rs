//! Duplicate groups and the final report.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Digest, FileDescriptor};

/// Files sharing one content digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Digest shared by all files in this group.
    pub digest: Digest,

    /// Size of each file in bytes.
    pub size: u64,

    /// Member files in arrival order.
    pub files: Vec<FileDescriptor>,
}

impl DuplicateGroup {
    /// Build a group from files known to share `digest`.
    ///
    /// Returns `None` for fewer than two files.
    pub fn new(digest: Digest, files: Vec<FileDescriptor>) -> Option<Self> {
        if files.len() < 2 {
            return None;
        }
        let size = files[0].size;
        Some(Self {
            digest,
            size,
            files,
        })
    }

    /// Get the number of duplicate files.
    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// Wasted space: size * (count - 1).
    pub fn wasted_bytes(&self) -> u64 {
        self.size * self.files.len().saturating_sub(1) as u64
    }

    /// Paths of all members.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    /// Check whether `path` is a member of this group.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

/// Results of one duplicate-detection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Groups sorted by wasted space descending, then by digest.
    pub groups: Vec<DuplicateGroup>,

    /// Number of candidate files seen by the grouper.
    pub files_scanned: u64,

    /// Number of hashing requests dispatched.
    pub hash_requests: u64,

    /// Number of files whose content could not be read.
    pub hash_failures: u64,
}

impl DuplicateReport {
    /// Build a report, ordering groups deterministically.
    pub fn new(mut groups: Vec<DuplicateGroup>) -> Self {
        groups.sort_by(|a, b| {
            b.wasted_bytes()
                .cmp(&a.wasted_bytes())
                .then_with(|| a.digest.cmp(&b.digest))
        });
        Self {
            groups,
            ..Default::default()
        }
    }

    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Number of duplicate groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of files across all groups.
    pub fn duplicated_files(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::count).sum()
    }

    /// Space that could be reclaimed by keeping one file per group.
    pub fn total_wasted_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_bytes).sum()
    }

    /// Find the group containing `path`.
    pub fn group_of(&self, path: &Path) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.contains(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, size: u64) -> FileDescriptor {
        FileDescriptor::new(path, size)
    }

    #[test]
    fn test_group_requires_two_files() {
        let digest = Digest::of_bytes(b"x");
        assert!(DuplicateGroup::new(digest, vec![]).is_none());
        assert!(DuplicateGroup::new(digest, vec![file("/a.jpg", 1)]).is_none());
        assert!(DuplicateGroup::new(digest, vec![file("/a.jpg", 1), file("/b.jpg", 1)]).is_some());
    }

    #[test]
    fn test_report_ordering() {
        let small = DuplicateGroup::new(
            Digest::new([1; 32]),
            vec![file("/s1.jpg", 10), file("/s2.jpg", 10)],
        )
        .unwrap();
        let big = DuplicateGroup::new(
            Digest::new([2; 32]),
            vec![file("/b1.jpg", 1000), file("/b2.jpg", 1000), file("/b3.jpg", 1000)],
        )
        .unwrap();

        let report = DuplicateReport::new(vec![small, big]);
        assert_eq!(report.groups[0].digest, Digest::new([2; 32]));
        assert_eq!(report.group_count(), 2);
        assert_eq!(report.duplicated_files(), 5);
        assert_eq!(report.total_wasted_space(), 2000 + 10);
        assert!(report.group_of(Path::new("/s2.jpg")).is_some());
        assert!(report.group_of(Path::new("/nope.jpg")).is_none());
    }
}
