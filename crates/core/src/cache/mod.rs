//! SQLite-backed cache storage organized in versioned generations.
//!
//! This module provides the persistent cache store the worker reads and
//! writes, using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named generations created at install time or lazily on first write
//! - Entries keyed by a SHA-256 hash of the normalized request
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod generation;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use generation::{CacheGeneration, GenerationKind, GenerationSet};
pub use store::CacheStore;
