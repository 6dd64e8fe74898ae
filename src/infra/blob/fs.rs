//! Filesystem-backed blob store.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::BlobStore;

/// Blob store rooted at a base directory. Blob names may carry a logical
/// subdirectory (the producer uses `f/`), which is created on first write.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    base: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }

    /// The root directory of this store.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl BlobStore for FsBlobStore {
    fn create(&self, name: &str) -> io::Result<Box<dyn Write + Send>> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn open(&self, name: &str) -> io::Result<Box<dyn BufRead + Send>> {
        let file = File::open(self.path_for(name))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn delete(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.path_for(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn create_write_open_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        {
            let mut w = store.create("f/abcdef.txt").unwrap();
            writeln!(w, "1.250000").unwrap();
            writeln!(w, "-0.500000").unwrap();
            w.flush().unwrap();
        }

        let mut contents = String::new();
        store
            .open("f/abcdef.txt")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "1.250000\n-0.500000\n");

        store.delete("f/abcdef.txt").unwrap();
        assert!(store.open("f/abcdef.txt").is_err());
    }

    #[test]
    fn open_missing_blob_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(store.open("f/nothere.txt").is_err());
    }

    #[test]
    fn delete_missing_blob_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(store.delete("f/nothere.txt").is_err());
    }
}
