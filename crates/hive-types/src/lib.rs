//! Foundation types for Hive, a typed accessor over hierarchical key/value
//! configuration stores.
//!
//! Every other Hive crate depends on `hive-types`. Nothing here touches a
//! store; these are the tags, masks and byte encodings that the store API and
//! the accessor agree on.
//!
//! # Key Types
//!
//! - [`ValueKind`] — storage type tag attached to every stored value
//! - [`KindMask`] — set of kinds a read is willing to accept
//! - [`AccessRights`] — rights requested when opening a node
//! - [`AccessPolicy`] — type-level rights, fixed per accessor type
//! - [`Scalar`] — fixed-size values with an explicit kind tag
//! - [`StatusCode`] — numeric status reported by store operations
//! - [`codec`] — text and multi-text buffer encoding

pub mod access;
pub mod codec;
pub mod error;
pub mod kind;
pub mod scalar;
pub mod status;

pub use access::{AccessPolicy, AccessRights, ReadOnly, ReadWrite, WriteOnly};
pub use codec::{decode_multi_text, decode_text, encode_multi_text, encode_text};
pub use error::TypeError;
pub use kind::{KindMask, RawValue, ValueKind};
pub use scalar::Scalar;
pub use status::StatusCode;
