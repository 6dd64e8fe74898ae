//! Blob storage for generated datasets.
//!
//! The producer writes each dataset under a fresh random name and the
//! workers stream it back; names are opaque keys to the store. Failures are
//! surfaced as plain `io::Error` values because the pipeline's contract is
//! to recover from them locally (skip the cycle, abandon the activation,
//! leak the dataset) rather than propagate.

pub mod fs;
pub mod memory;

pub use fs::FsBlobStore;
pub use memory::MemBlobStore;

use std::io::{self, BufRead, Write};

/// Storage for named blobs of line-oriented decimal text.
pub trait BlobStore: Send + Sync {
    /// Create a blob for writing. An existing blob with the same name is
    /// truncated.
    ///
    /// # Errors
    ///
    /// Any backend I/O failure.
    fn create(&self, name: &str) -> io::Result<Box<dyn Write + Send>>;

    /// Open an existing blob for buffered reading.
    ///
    /// # Errors
    ///
    /// Any backend I/O failure, including a missing blob.
    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead + Send>>;

    /// Delete a blob.
    ///
    /// # Errors
    ///
    /// Any backend I/O failure, including a missing blob.
    fn delete(&self, name: &str) -> io::Result<()>;
}
