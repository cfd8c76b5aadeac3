//! Hierarchical key/value store backends for Hive.
//!
//! A store is a tree of nodes. Each node holds named, typed values and named
//! child nodes. Callers open a node to get a [`Handle`], read and write values
//! through the handle, then close it.
//!
//! # Storage Backends
//!
//! All backends implement the [`KeyStore`] trait:
//!
//! - [`InMemoryKeyStore`] -- `BTreeMap` tree for tests and embedding, with
//!   handle counting and per-node permission ceilings
//! - [`FileKeyStore`] -- the in-memory tree persisted as a framed snapshot
//!   file after every mutation
//!
//! # Design Rules
//!
//! 1. Opening never creates nodes; [`KeyStore::create_node`] is separate.
//! 2. Rights are checked per handle on every read and write.
//! 3. Reads have a query mode (size only) and a fill mode (copy into a
//!    caller buffer); a short buffer fails with the required size.
//! 4. Each call is atomic on its own. Nothing spans calls.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod handle;
pub mod memory;
pub mod path;
pub mod traits;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use file::{FileKeyStore, FileStoreConfig, SyncMode};
pub use handle::{Handle, ValueInfo};
pub use memory::InMemoryKeyStore;
pub use traits::KeyStore;
pub use tree::{Node, StoredValue};
