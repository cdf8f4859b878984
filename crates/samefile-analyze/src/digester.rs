//! Streaming content digests.

use std::future::Future;
use std::io;
use std::path::Path;

use sha2::{Digest as _, Sha256};
use tokio::io::AsyncReadExt;

use samefile_core::Digest;

/// Default read chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Computes the content digest of a file.
///
/// Implementations must be deterministic: equal bytes yield equal digests.
pub trait ContentDigester: Send + Sync + 'static {
    /// Read `path` to the end and return its digest.
    fn digest(&self, path: &Path) -> impl Future<Output = io::Result<Digest>> + Send;
}

/// SHA-256 digester streaming the file in bounded chunks.
#[derive(Debug, Clone, Copy)]
pub struct Sha256Digester {
    chunk_size: usize,
}

impl Sha256Digester {
    /// Create a digester reading `chunk_size` bytes at a time.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Chunk size used for reads.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Default for Sha256Digester {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ContentDigester for Sha256Digester {
    async fn digest(&self, path: &Path) -> io::Result<Digest> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = file.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(Digest::new(hasher.finalize().into()))
    }
}
