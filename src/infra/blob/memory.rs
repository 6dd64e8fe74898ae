//! In-memory blob store for tests and hermetic runs.

use std::collections::HashMap;
use std::io::{self, BufRead, Cursor, Write};
use std::sync::Arc;

use parking_lot::RwLock;

use super::BlobStore;

type BlobMap = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// Blob store keeping everything in a shared map. Writers buffer locally and
/// commit the blob on flush or drop; readers get a snapshot of the bytes at
/// open time.
#[derive(Debug, Default, Clone)]
pub struct MemBlobStore {
    blobs: BlobMap,
}

impl MemBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a blob directly, bypassing the writer path. Test convenience.
    pub fn put(&self, name: &str, bytes: impl Into<Vec<u8>>) {
        self.blobs.write().insert(name.to_owned(), bytes.into());
    }

    /// Whether a blob with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.blobs.read().contains_key(name)
    }

    /// Number of stored blobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// True when no blobs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

/// Writer that commits its buffer into the shared map.
struct MemWriter {
    name: String,
    buf: Vec<u8>,
    blobs: BlobMap,
}

impl MemWriter {
    fn commit(&mut self) {
        self.blobs
            .write()
            .insert(self.name.clone(), self.buf.clone());
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemWriter {
    fn drop(&mut self) {
        self.commit();
    }
}

impl BlobStore for MemBlobStore {
    fn create(&self, name: &str) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(MemWriter {
            name: name.to_owned(),
            buf: Vec::new(),
            blobs: Arc::clone(&self.blobs),
        }))
    }

    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead + Send>> {
        let bytes = self
            .blobs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no blob `{name}`")))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn delete(&self, name: &str) -> io::Result<()> {
        self.blobs
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no blob `{name}`")))
    }
}
