//! Storage collaborators: the backing store contract and the snapshot store.
//!
//! The relational store that holds the corpus is an external engine; the
//! cache only needs the narrow bulk-row contract captured by
//! [`BackingStore`]. The [`SnapshotStore`] persists each in-memory index as a
//! named binary artifact under a directory so that subsequent opens can skip
//! the rebuild.
//!
//! # Example
//!
//! ```
//! use kopis::store::BackingStore;
//! use kopis::store::memory::MemoryBackingStore;
//! use kopis::store::snapshot::SnapshotStore;
//! use kopis::corpus::Document;
//!
//! # fn main() -> kopis::error::Result<()> {
//! let mut store = MemoryBackingStore::new();
//! store.add_document(Document::new(1, "doc1", "dir1/doc1"));
//!
//! let dir = tempfile::tempdir().unwrap();
//! let snapshots = SnapshotStore::new(dir.path())?;
//! snapshots.save("documents", &store.list_documents()?)?;
//! # Ok(())
//! # }
//! ```

pub mod backing;
pub mod memory;
pub mod snapshot;

pub use backing::{AssociationRow, BackingStore, MentionRow};
pub use memory::{MemoryBackingStore, StoreStats};
pub use snapshot::SnapshotStore;
