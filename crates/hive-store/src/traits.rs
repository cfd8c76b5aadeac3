use hive_types::{AccessRights, KindMask, ValueKind};

use crate::error::StoreResult;
use crate::handle::{Handle, ValueInfo};

/// Hierarchical key/value store.
///
/// All implementations must satisfy these invariants:
/// - `open` never creates nodes and fails with `NodeNotFound` for a missing
///   path.
/// - A handle opened with [`AccessRights::Read`] cannot write and one opened
///   with [`AccessRights::Write`] cannot read.
/// - Every issued handle is released by exactly one successful `close`.
/// - Each call is atomic; no isolation is promised across calls.
pub trait KeyStore: Send + Sync {
    /// The predefined root node. Always open, read-write, never closed.
    fn root(&self) -> Handle;

    /// Open the node at `path` below `parent` with `rights`.
    fn open(&self, parent: Handle, path: &str, rights: AccessRights) -> StoreResult<Handle>;

    /// Release a handle returned by [`KeyStore::open`].
    fn close(&self, handle: Handle) -> StoreResult<()>;

    /// Query mode: report the kind and size of a value without copying it.
    fn query_value(&self, handle: Handle, name: &str, accept: KindMask) -> StoreResult<ValueInfo>;

    /// Fill mode: copy a value into `buf`.
    ///
    /// Fails with `BufferTooSmall { required }` if `buf` is shorter than the
    /// value. On success the returned `len` is the number of bytes written,
    /// which may be less than `buf.len()`.
    fn read_value(
        &self,
        handle: Handle,
        name: &str,
        accept: KindMask,
        buf: &mut [u8],
    ) -> StoreResult<ValueInfo>;

    /// Create or overwrite a value. The previous kind, if any, is discarded.
    fn write_value(&self, handle: Handle, name: &str, kind: ValueKind, data: &[u8])
        -> StoreResult<()>;

    /// Create the node at `path` below `parent`, including missing
    /// intermediate nodes. Existing nodes are left untouched.
    fn create_node(&self, parent: Handle, path: &str) -> StoreResult<()>;
}
