//! File-backed key store.
//!
//! [`FileKeyStore`] keeps the whole tree in an [`InMemoryKeyStore`] and
//! rewrites a snapshot file after every successful mutation. The snapshot is
//! written to a temporary file in the same directory and renamed over the
//! old one, so a crash leaves either the old or the new snapshot.
//!
//! A mutation whose snapshot cannot be written is rolled back in memory, so
//! a failed write is never observable afterwards.
//!
//! On-disk format:
//! ```text
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (bincode-serialized root Node)]
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hive_types::{AccessRights, KindMask, ValueKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::handle::{Handle, ValueInfo};
use crate::memory::InMemoryKeyStore;
use crate::traits::KeyStore;
use crate::tree::Node;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Flush strategy for snapshot writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// `fsync` the snapshot before renaming it into place.
    EveryWrite,
    /// Rely on OS page-cache buffering.
    #[default]
    OsDefault,
}

/// Configuration for [`FileKeyStore`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    pub sync_mode: SyncMode,
}

/// Key store persisted to a single snapshot file.
pub struct FileKeyStore {
    inner: InMemoryKeyStore,
    path: PathBuf,
    config: FileStoreConfig,
    persist_lock: Mutex<()>,
}

impl FileKeyStore {
    /// Load the store at `path`. A missing file starts an empty store; the
    /// file is created on the first mutation.
    pub fn load(path: impl AsRef<Path>, config: FileStoreConfig) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let root = match fs::read(&path) {
            Ok(bytes) => decode_snapshot(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot; starting empty");
                Node::new()
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            path = %path.display(),
            values = root.total_values(),
            "key store loaded"
        );
        Ok(Self {
            inner: InMemoryKeyStore::from_tree(root),
            path,
            config,
            persist_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &FileStoreConfig {
        &self.config
    }

    /// Number of handles issued and not yet closed.
    pub fn open_handle_count(&self) -> usize {
        self.inner.open_handle_count()
    }

    /// Set a permission ceiling on a node and persist it.
    pub fn set_permissions(&self, path: &str, ceiling: Option<AccessRights>) -> StoreResult<()> {
        self.mutate(|inner| inner.set_permissions(path, ceiling))
    }

    /// Apply `op` to the tree and persist the result.
    ///
    /// Mutations are serialized. If `op` succeeds but the snapshot cannot be
    /// written, the tree is restored to its state before `op`.
    fn mutate<F>(&self, op: F) -> StoreResult<()>
    where
        F: FnOnce(&InMemoryKeyStore) -> StoreResult<()>,
    {
        let _guard = self
            .persist_lock
            .lock()
            .map_err(|e| StoreError::Internal(format!("lock poisoned: {e}")))?;
        let before = self.inner.snapshot()?;
        op(&self.inner)?;
        let after = self.inner.snapshot()?;
        if let Err(e) = self.persist(&after) {
            warn!(path = %self.path.display(), error = %e, "snapshot failed; rolling back");
            self.inner.restore(before)?;
            return Err(e);
        }
        Ok(())
    }

    fn persist(&self, root: &Node) -> StoreResult<()> {
        let framed = encode_snapshot(root)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&framed)?;
        tmp.flush()?;
        if matches!(self.config.sync_mode, SyncMode::EveryWrite) {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "snapshot rename failed");
            StoreError::Io(e.error)
        })?;
        debug!(path = %self.path.display(), len = framed.len(), "snapshot written");
        Ok(())
    }
}

/// Frame a tree as a snapshot file body.
pub fn encode_snapshot(root: &Node) -> StoreResult<Vec<u8>> {
    let payload = bincode::serialize(root).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| StoreError::Serialization("snapshot exceeds 4 GiB".into()))?;
    let crc = crc32fast::hash(&payload);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&length.to_le_bytes());
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Validate and decode a snapshot file body.
pub fn decode_snapshot(bytes: &[u8]) -> StoreResult<Node> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Corrupt(format!(
            "file is {} bytes, shorter than the header",
            bytes.len()
        )));
    }
    let length = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let expected_crc = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != length {
        return Err(StoreError::Corrupt(format!(
            "header says {length} payload bytes, file has {}",
            payload.len()
        )));
    }
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        warn!(expected = expected_crc, actual = actual_crc, "snapshot CRC mismatch");
        return Err(StoreError::Corrupt(format!(
            "CRC mismatch: expected {expected_crc:#010x}, computed {actual_crc:#010x}"
        )));
    }
    bincode::deserialize(payload).map_err(|e| StoreError::Corrupt(e.to_string()))
}

impl KeyStore for FileKeyStore {
    fn root(&self) -> Handle {
        self.inner.root()
    }

    fn open(&self, parent: Handle, path: &str, rights: AccessRights) -> StoreResult<Handle> {
        self.inner.open(parent, path, rights)
    }

    fn close(&self, handle: Handle) -> StoreResult<()> {
        self.inner.close(handle)
    }

    fn query_value(&self, handle: Handle, name: &str, accept: KindMask) -> StoreResult<ValueInfo> {
        self.inner.query_value(handle, name, accept)
    }

    fn read_value(
        &self,
        handle: Handle,
        name: &str,
        accept: KindMask,
        buf: &mut [u8],
    ) -> StoreResult<ValueInfo> {
        self.inner.read_value(handle, name, accept, buf)
    }

    fn write_value(
        &self,
        handle: Handle,
        name: &str,
        kind: ValueKind,
        data: &[u8],
    ) -> StoreResult<()> {
        self.mutate(|inner| inner.write_value(handle, name, kind, data))
    }

    fn create_node(&self, parent: Handle, path: &str) -> StoreResult<()> {
        self.mutate(|inner| inner.create_node(parent, path))
    }
}

impl std::fmt::Debug for FileKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKeyStore")
            .field("path", &self.path)
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileKeyStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::load(dir.path().join("hive.db"), FileStoreConfig::default())
            .unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_starts_empty() {
        let (dir, store) = temp_store();
        assert!(!dir.path().join("hive.db").exists());
        assert!(store.open(store.root(), "x", AccessRights::Read).is_err());
    }

    #[test]
    fn values_survive_reopen() {
        let (dir, store) = temp_store();
        store.create_node(store.root(), "Software/App").unwrap();
        let h = store
            .open(store.root(), "Software/App", AccessRights::Write)
            .unwrap();
        store
            .write_value(h, "Port", ValueKind::U32, &8080u32.to_le_bytes())
            .unwrap();
        store.close(h).unwrap();
        drop(store);

        let reopened =
            FileKeyStore::load(dir.path().join("hive.db"), FileStoreConfig::default()).unwrap();
        let h = reopened
            .open(reopened.root(), "Software\\App", AccessRights::Read)
            .unwrap();
        let mut buf = [0u8; 4];
        reopened
            .read_value(h, "Port", KindMask::FIXED, &mut buf)
            .unwrap();
        assert_eq!(u32::from_le_bytes(buf), 8080);
    }

    #[test]
    fn permissions_survive_reopen() {
        let (dir, store) = temp_store();
        store.create_node(store.root(), "Locked").unwrap();
        store
            .set_permissions("Locked", Some(AccessRights::Read))
            .unwrap();
        drop(store);

        let reopened =
            FileKeyStore::load(dir.path().join("hive.db"), FileStoreConfig::default()).unwrap();
        assert!(matches!(
            reopened.open(reopened.root(), "Locked", AccessRights::Write),
            Err(StoreError::AccessDenied { .. })
        ));
    }

    #[test]
    fn failed_write_does_not_touch_file() {
        let (dir, store) = temp_store();
        store.create_node(store.root(), "k").unwrap();
        let before = fs::read(dir.path().join("hive.db")).unwrap();
        let h = store.open(store.root(), "k", AccessRights::Read).unwrap();
        assert!(store.write_value(h, "v", ValueKind::Binary, &[1]).is_err());
        let after = fs::read(dir.path().join("hive.db")).unwrap();
        assert_eq!(before, after);
    }

    /// Swap the snapshot file for a directory so the rename in `persist` fails.
    fn block_snapshot(dir: &tempfile::TempDir) {
        let path = dir.path().join("hive.db");
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
    }

    #[test]
    fn failed_persist_rolls_back_write() {
        let (dir, store) = temp_store();
        store.create_node(store.root(), "k").unwrap();
        let h = store.open(store.root(), "k", AccessRights::ReadWrite).unwrap();
        store
            .write_value(h, "old", ValueKind::U32, &1u32.to_le_bytes())
            .unwrap();
        block_snapshot(&dir);

        let err = store
            .write_value(h, "n", ValueKind::U32, &7u32.to_le_bytes())
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(matches!(
            store.query_value(h, "n", KindMask::ANY),
            Err(StoreError::ValueNotFound { .. })
        ));
        // Overwrites roll back to the previous bytes.
        assert!(store
            .write_value(h, "old", ValueKind::U32, &2u32.to_le_bytes())
            .is_err());
        let mut buf = [0u8; 4];
        store.read_value(h, "old", KindMask::FIXED, &mut buf).unwrap();
        assert_eq!(u32::from_le_bytes(buf), 1);
        store.close(h).unwrap();
    }

    #[test]
    fn failed_persist_rolls_back_create_and_permissions() {
        let (dir, store) = temp_store();
        store.create_node(store.root(), "k").unwrap();
        block_snapshot(&dir);

        assert!(store.create_node(store.root(), "k/child").is_err());
        assert!(matches!(
            store.open(store.root(), "k/child", AccessRights::Read),
            Err(StoreError::NodeNotFound { .. })
        ));
        assert!(store.set_permissions("k", Some(AccessRights::Read)).is_err());
        let h = store.open(store.root(), "k", AccessRights::Write).unwrap();
        store.close(h).unwrap();
    }

    #[test]
    fn corrupt_crc_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive.db");
        let mut bytes = encode_snapshot(&Node::new()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, &bytes).unwrap();
        let err = FileKeyStore::load(&path, FileStoreConfig::default()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn truncated_snapshot_detected() {
        assert!(matches!(
            decode_snapshot(&[1, 2, 3]),
            Err(StoreError::Corrupt(_))
        ));
        let mut bytes = encode_snapshot(&Node::new()).unwrap();
        bytes.pop();
        assert!(matches!(decode_snapshot(&bytes), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn every_write_sync_mode() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileStoreConfig {
            sync_mode: SyncMode::EveryWrite,
        };
        let store = FileKeyStore::load(dir.path().join("s.db"), config).unwrap();
        store.create_node(store.root(), "a").unwrap();
        assert!(dir.path().join("s.db").exists());
        assert_eq!(store.config().sync_mode, SyncMode::EveryWrite);
    }
}
