//! Infrastructure adapters for external collaborators.

pub mod blob;
pub mod sink;

pub use blob::{BlobStore, FsBlobStore, MemBlobStore};
pub use sink::{ConsensusSink, MemorySink, StdoutSink};
