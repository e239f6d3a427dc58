//! Store adapter traits and reference implementations.
//!
//! The pipeline only ever talks to the record store and the document store
//! through [`RecordStore`] and [`ArtifactStore`]; production backends
//! (relational databases, object storage) implement these traits outside
//! this crate.

mod artifact;
pub mod memory;
mod record;

pub use artifact::{ArtifactStore, document_key};
pub use memory::{InMemoryArtifactStore, InMemoryRecordStore};
pub use record::RecordStore;
