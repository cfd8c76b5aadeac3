//! Scoped, typed access to one node of a Hive key store.
//!
//! A [`KeyAccessor`] opens a node when constructed and closes it when
//! dropped. In between it reads and writes values by name, encoding
//! fixed-size scalars, single strings and string sequences.
//!
//! Access rights are part of the accessor's type:
//!
//! ```no_run
//! use hive_key::{ReadKey, WriteKey};
//! use hive_store::{InMemoryKeyStore, KeyStore};
//!
//! let store = InMemoryKeyStore::new();
//! store.create_node(store.root(), "Software\\App").unwrap();
//!
//! let key = WriteKey::open(&store, store.root(), "Software\\App").unwrap();
//! assert!(key.set_value("Port", 8080u32));
//! drop(key);
//!
//! let key = ReadKey::open(&store, store.root(), "Software\\App").unwrap();
//! assert_eq!(key.get_value::<u32>("Port"), Some(8080));
//! ```
//!
//! # Failure reporting
//!
//! - Opening fails with [`KeyError::Open`], and no accessor exists.
//! - Reads return `None` for every failure: missing value, wrong kind,
//!   wrong size or store error.
//! - Writes return `false` on failure.
//!
//! [`KeyAccessor::last_status`] reports the store status of the most recent
//! read or write for callers that need to tell those cases apart.

pub mod accessor;
pub mod config;
pub mod error;

pub use accessor::{KeyAccessor, ReadKey, ReadWriteKey, WriteKey};
pub use config::AccessorConfig;
pub use error::{KeyError, KeyResult};
pub use hive_types::{AccessPolicy, ReadOnly, ReadWrite, WriteOnly};
