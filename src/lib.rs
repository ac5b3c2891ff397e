//! # Kopis
//!
//! An in-memory entity and mention analytics cache for document corpora.
//!
//! Kopis sits in front of a relational backing store that holds documents,
//! named-entity mentions and the canonical entities that aggregate them. On
//! open it prefetches the whole corpus into purpose-built indices, persists
//! those indices as binary snapshots so later opens skip the rebuild, and
//! answers two families of query from memory:
//!
//! - Set algebra over document/entity association ("every document that
//!   mentions all of these entities")
//! - Windowed co-occurrence ("every entity mentioned within N positions of a
//!   mention of one of these entities"), by mention index or text offset
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Cold load builds indices once and snapshots them to disk
//! - Warm load never touches the backing store for snapshotted artifacts
//! - Corrupt or stale snapshots fall back to a rebuild, never a crash
//! - Pluggable backing store behind a narrow trait

pub mod cache;
pub mod corpus;
pub mod error;
pub mod proximity;
pub mod store;

pub mod prelude {}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
