use samefile_core::{
    Digest, DuplicateGroup, DuplicateReport, FileDescriptor, FinderConfig, extension_of,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_digest_creation_and_hex() {
    let bytes = [0xab; 32];
    let digest = Digest::new(bytes);

    let hex = digest.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert!(hex.starts_with("ab"));

    assert_eq!(digest, Digest::new(bytes));
    assert_ne!(digest, Digest::new([0xcd; 32]));
}

#[test]
fn test_digest_serializes_as_hex_string() {
    let digest = Digest::of_bytes(b"content X");
    let json = serde_json::to_string(&digest).unwrap();
    assert_eq!(json, format!("\"{}\"", digest.to_hex()));

    let back: Digest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, digest);
    assert!(serde_json::from_str::<Digest>("\"not-a-digest\"").is_err());
}

#[test]
fn test_file_descriptor_from_path() {
    let file = FileDescriptor::new("/photos/IMG_0001.CR2", 25_000_000);
    assert_eq!(file.extension, "cr2");
    assert_eq!(file.size, 25_000_000);
    assert_eq!(file.path, PathBuf::from("/photos/IMG_0001.CR2"));
}

#[test]
fn test_extension_boundaries() {
    assert_eq!(extension_of(Path::new("noext")), "");
    assert_eq!(extension_of(Path::new("dir.d/noext")), "");
    assert_eq!(extension_of(Path::new("multi.part.JPEG")), "jpeg");
}

#[test]
fn test_duplicate_group_properties() {
    let files = vec![
        FileDescriptor::new("/path/a.jpg", 4096),
        FileDescriptor::new("/path/b.jpg", 4096),
        FileDescriptor::new("/other/c.jpg", 4096),
    ];

    let group = DuplicateGroup::new(Digest::new([0xaa; 32]), files).unwrap();

    assert_eq!(group.count(), 3);
    assert_eq!(group.size, 4096);
    assert_eq!(group.wasted_bytes(), 8192);
    assert_eq!(group.paths().count(), 3);
    assert!(group.contains(Path::new("/other/c.jpg")));
}

#[test]
fn test_empty_report() {
    let report = DuplicateReport::default();
    assert!(!report.has_duplicates());
    assert_eq!(report.group_count(), 0);
    assert_eq!(report.duplicated_files(), 0);
    assert_eq!(report.total_wasted_space(), 0);
}

#[test]
fn test_config_from_toml_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("samefile.toml");
    fs::write(
        &path,
        "extensions = [\"jpg\"]\nextension_sensitive = false\nmax_concurrent_hashes = 4\n",
    )
    .unwrap();

    let config = FinderConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.extensions, vec!["jpg"]);
    assert!(!config.extension_sensitive);
    assert_eq!(config.max_concurrent_hashes, 4);

    assert!(FinderConfig::from_toml_file(temp.path().join("missing.toml")).is_err());
}
