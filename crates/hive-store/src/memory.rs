use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use hive_types::{AccessRights, KindMask, ValueKind};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::handle::{Handle, ValueInfo};
use crate::path::{display_path, split_path, validate_value_name};
use crate::traits::KeyStore;
use crate::tree::{Node, StoredValue};

#[derive(Clone, Debug)]
struct OpenNode {
    path: Vec<String>,
    rights: AccessRights,
}

#[derive(Debug)]
struct HandleTable {
    next: u64,
    open: HashMap<Handle, OpenNode>,
}

/// In-memory, tree-based key store.
///
/// Intended for tests and embedding. The node tree lives behind a `RwLock`
/// and the handle table behind a `Mutex`; the two are never held together.
/// Handles record the node path and the rights they were opened with.
pub struct InMemoryKeyStore {
    tree: RwLock<Node>,
    handles: Mutex<HandleTable>,
}

impl InMemoryKeyStore {
    /// Create a store holding only an empty root node.
    pub fn new() -> Self {
        Self::from_tree(Node::new())
    }

    /// Create a store over an existing tree.
    pub fn from_tree(root: Node) -> Self {
        Self {
            tree: RwLock::new(root),
            handles: Mutex::new(HandleTable {
                next: 1,
                open: HashMap::new(),
            }),
        }
    }

    /// Number of handles issued and not yet closed. The root is not counted.
    ///
    /// Still counts after a panic poisoned the handle table.
    pub fn open_handle_count(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .open
            .len()
    }

    /// Clone of the whole tree.
    pub fn snapshot(&self) -> StoreResult<Node> {
        Ok(self.read_tree()?.clone())
    }

    /// Replace the whole tree with `root`.
    ///
    /// Open handles keep their paths and rights; a handle whose node is gone
    /// from `root` fails with `NodeNotFound` on its next use.
    pub fn restore(&self, root: Node) -> StoreResult<()> {
        *self.write_tree()? = root;
        Ok(())
    }

    /// Total number of values held anywhere in the tree.
    pub fn total_values(&self) -> usize {
        self.tree
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .total_values()
    }

    /// Limit the rights any future open of the node at `path` may request.
    ///
    /// Handles already open keep the rights they were granted.
    pub fn set_permissions(&self, path: &str, ceiling: Option<AccessRights>) -> StoreResult<()> {
        let segments = split_path(path)?;
        let mut tree = self.write_tree()?;
        let node = tree
            .descend_mut(&segments)
            .ok_or_else(|| StoreError::NodeNotFound {
                path: display_path(&segments),
            })?;
        node.permissions = ceiling;
        Ok(())
    }

    fn read_tree(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Node>> {
        self.tree
            .read()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))
    }

    fn write_tree(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Node>> {
        self.tree
            .write()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))
    }

    fn resolve(&self, handle: Handle) -> StoreResult<OpenNode> {
        if handle.is_root() {
            return Ok(OpenNode {
                path: Vec::new(),
                rights: AccessRights::ReadWrite,
            });
        }
        let table = self
            .handles
            .lock()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))?;
        table
            .open
            .get(&handle)
            .cloned()
            .ok_or(StoreError::InvalidHandle(handle))
    }

    fn resolve_with(&self, handle: Handle, needed: AccessRights) -> StoreResult<OpenNode> {
        let node = self.resolve(handle)?;
        if !node.rights.covers(needed) {
            return Err(StoreError::AccessDenied {
                path: display_path(&node.path),
                requested: needed,
            });
        }
        Ok(node)
    }

    fn lookup(&self, handle: Handle, name: &str, accept: KindMask) -> StoreResult<StoredValue> {
        let open = self.resolve_with(handle, AccessRights::Read)?;
        let tree = self.read_tree()?;
        let node = tree
            .descend(&open.path)
            .ok_or_else(|| StoreError::NodeNotFound {
                path: display_path(&open.path),
            })?;
        let value = node
            .values
            .get(name)
            .ok_or_else(|| StoreError::ValueNotFound {
                name: name.to_string(),
            })?;
        if !accept.contains(value.kind) {
            return Err(StoreError::KindMismatch {
                name: name.to_string(),
                expected: accept,
                actual: value.kind,
            });
        }
        Ok(value.clone())
    }
}

impl Default for InMemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject integer kinds whose byte length does not match the kind.
pub(crate) fn check_kind_len(name: &str, kind: ValueKind, data: &[u8]) -> StoreResult<()> {
    let expected = match kind {
        ValueKind::U32 => 4,
        ValueKind::U64 => 8,
        _ => return Ok(()),
    };
    if data.len() != expected {
        return Err(StoreError::InvalidData {
            name: name.to_string(),
            reason: format!("{kind} needs {expected} bytes, got {}", data.len()),
        });
    }
    Ok(())
}

impl KeyStore for InMemoryKeyStore {
    fn root(&self) -> Handle {
        Handle::ROOT
    }

    fn open(&self, parent: Handle, path: &str, rights: AccessRights) -> StoreResult<Handle> {
        let base = self.resolve(parent)?;
        let mut full = base.path;
        full.extend(split_path(path)?);

        {
            let tree = self.read_tree()?;
            let node = tree.descend(&full).ok_or_else(|| StoreError::NodeNotFound {
                path: display_path(&full),
            })?;
            if let Some(ceiling) = node.permissions {
                if !ceiling.covers(rights) {
                    return Err(StoreError::AccessDenied {
                        path: display_path(&full),
                        requested: rights,
                    });
                }
            }
        }

        let mut table = self
            .handles
            .lock()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))?;
        let handle = Handle::from_raw(table.next);
        table.next += 1;
        debug!(%handle, path = %display_path(&full), %rights, "node opened");
        table.open.insert(handle, OpenNode { path: full, rights });
        Ok(handle)
    }

    fn close(&self, handle: Handle) -> StoreResult<()> {
        if handle.is_root() {
            return Ok(());
        }
        let mut table = self
            .handles
            .lock()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))?;
        match table.open.remove(&handle) {
            Some(_) => {
                debug!(%handle, "node closed");
                Ok(())
            }
            None => Err(StoreError::InvalidHandle(handle)),
        }
    }

    fn query_value(&self, handle: Handle, name: &str, accept: KindMask) -> StoreResult<ValueInfo> {
        let value = self.lookup(handle, name, accept)?;
        Ok(ValueInfo {
            kind: value.kind,
            len: value.data.len(),
        })
    }

    fn read_value(
        &self,
        handle: Handle,
        name: &str,
        accept: KindMask,
        buf: &mut [u8],
    ) -> StoreResult<ValueInfo> {
        let value = self.lookup(handle, name, accept)?;
        if buf.len() < value.data.len() {
            return Err(StoreError::BufferTooSmall {
                required: value.data.len(),
            });
        }
        buf[..value.data.len()].copy_from_slice(&value.data);
        Ok(ValueInfo {
            kind: value.kind,
            len: value.data.len(),
        })
    }

    fn write_value(
        &self,
        handle: Handle,
        name: &str,
        kind: ValueKind,
        data: &[u8],
    ) -> StoreResult<()> {
        validate_value_name(name)?;
        check_kind_len(name, kind, data)?;
        let open = self.resolve_with(handle, AccessRights::Write)?;
        let mut tree = self.write_tree()?;
        let node = tree
            .descend_mut(&open.path)
            .ok_or_else(|| StoreError::NodeNotFound {
                path: display_path(&open.path),
            })?;
        node.values
            .insert(name.to_string(), StoredValue::new(kind, data.to_vec()));
        Ok(())
    }

    fn create_node(&self, parent: Handle, path: &str) -> StoreResult<()> {
        let base = self.resolve_with(parent, AccessRights::Write)?;
        let mut full = base.path;
        full.extend(split_path(path)?);
        let mut tree = self.write_tree()?;
        let created = tree.create_path(&full);
        if created > 0 {
            debug!(path = %display_path(&full), created, "nodes created");
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyStore")
            .field("value_count", &self.total_values())
            .field("open_handles", &self.open_handle_count())
            .finish()
    }
}
