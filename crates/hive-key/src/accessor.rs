use std::cell::Cell;
use std::marker::PhantomData;

use hive_store::{Handle, KeyStore, StoreError, StoreResult};
use hive_types::{
    decode_multi_text, decode_text, encode_multi_text, encode_text, AccessPolicy, AccessRights,
    KindMask, RawValue, ReadOnly, ReadWrite, Scalar, StatusCode, ValueKind, WriteOnly,
};
use tracing::{debug, warn};

use crate::config::AccessorConfig;
use crate::error::{KeyError, KeyResult};

/// An open node of a [`KeyStore`], closed when dropped.
///
/// The access policy `P` fixes the rights the node is opened with. The store
/// enforces them: a read through a [`WriteKey`] or a write through a
/// [`ReadKey`] fails like any other store error.
///
/// An accessor is meant for one thread at a time and is not `Sync`.
pub struct KeyAccessor<'s, S: KeyStore + ?Sized, P: AccessPolicy> {
    store: &'s S,
    handle: Handle,
    path: String,
    config: AccessorConfig,
    last_status: Cell<StatusCode>,
    _policy: PhantomData<P>,
}

/// Read-only accessor.
pub type ReadKey<'s, S> = KeyAccessor<'s, S, ReadOnly>;
/// Write-only accessor.
pub type WriteKey<'s, S> = KeyAccessor<'s, S, WriteOnly>;
/// Read-write accessor.
pub type ReadWriteKey<'s, S> = KeyAccessor<'s, S, ReadWrite>;

impl<'s, S: KeyStore + ?Sized, P: AccessPolicy> KeyAccessor<'s, S, P> {
    /// Open `path` below `parent` with the policy's rights.
    ///
    /// Missing nodes are not created.
    pub fn open(store: &'s S, parent: Handle, path: &str) -> KeyResult<Self> {
        Self::open_with_config(store, parent, path, AccessorConfig::default())
    }

    pub fn open_with_config(
        store: &'s S,
        parent: Handle,
        path: &str,
        config: AccessorConfig,
    ) -> KeyResult<Self> {
        Self::open_inner(store, parent, path, path.to_string(), config)
    }

    fn open_inner(
        store: &'s S,
        parent: Handle,
        path: &str,
        shown: String,
        config: AccessorConfig,
    ) -> KeyResult<Self> {
        config.validate()?;
        let handle = store
            .open(parent, path, P::RIGHTS)
            .map_err(|source| {
                let status = source.status();
                debug!(path = %shown, rights = %P::RIGHTS, %status, "open failed");
                KeyError::Open {
                    path: shown.clone(),
                    rights: P::RIGHTS,
                    status,
                    source,
                }
            })?;
        debug!(path = %shown, %handle, rights = %P::RIGHTS, "accessor opened");
        Ok(Self {
            store,
            handle,
            path: shown,
            config,
            last_status: Cell::new(StatusCode::SUCCESS),
            _policy: PhantomData,
        })
    }

    /// Open a node below this one, with its own policy.
    ///
    /// The child inherits this accessor's config and is independent of it:
    /// either may be dropped first.
    pub fn open_child<Q: AccessPolicy>(&self, path: &str) -> KeyResult<KeyAccessor<'s, S, Q>> {
        let shown = if self.path.is_empty() {
            path.to_string()
        } else {
            format!("{}\\{}", self.path, path)
        };
        KeyAccessor::<'s, S, Q>::open_inner(
            self.store,
            self.handle,
            path,
            shown,
            self.config.clone(),
        )
    }

    /// The path this accessor was opened with. Kept for diagnostics only.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn rights(&self) -> AccessRights {
        P::RIGHTS
    }

    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    /// Status of the most recent get or set on this accessor.
    pub fn last_status(&self) -> StatusCode {
        self.last_status.get()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Read a fixed-size value.
    ///
    /// Requests exactly `T::SIZE` bytes and accepts binary, 4-byte and 8-byte
    /// kinds alike. Any failure, including a stored size other than
    /// `T::SIZE`, reads as `None`.
    pub fn get_value<T: Scalar>(&self, name: &str) -> Option<T> {
        let mut buf = vec![0u8; T::SIZE];
        let result = self
            .store
            .read_value(self.handle, name, KindMask::FIXED, &mut buf);
        let info = self.record(name, "read", result)?;
        if info.len != T::SIZE {
            self.reject(name, format_args!("stored {} bytes, wanted {}", info.len, T::SIZE));
            return None;
        }
        match T::from_bytes(&buf) {
            Some(value) => Some(value),
            None => {
                self.reject(name, format_args!("bytes are not a valid value"));
                None
            }
        }
    }

    /// Read a single string. The terminator is not part of the result.
    pub fn get_string(&self, name: &str) -> Option<String> {
        let (_, data) = self.read_variable(name, KindMask::TEXT)?;
        match decode_text(&data) {
            Ok(s) => Some(s),
            Err(e) => {
                self.reject(name, format_args!("{e}"));
                None
            }
        }
    }

    /// Read a string sequence, in stored order.
    ///
    /// A stored empty sequence reads as `Some(vec![])`.
    pub fn get_multi_string(&self, name: &str) -> Option<Vec<String>> {
        let (_, data) = self.read_variable(name, KindMask::MULTI_TEXT)?;
        match decode_multi_text(&data) {
            Ok(items) => Some(items),
            Err(e) => {
                self.reject(name, format_args!("{e}"));
                None
            }
        }
    }

    /// Read a value of any kind without decoding it.
    pub fn get_raw(&self, name: &str) -> Option<RawValue> {
        let (kind, data) = self.read_variable(name, KindMask::ANY)?;
        Some(RawValue::new(kind, data))
    }

    /// Two-phase read: size query, then fill.
    ///
    /// A value that grows between the phases costs one round; rounds are
    /// bounded by `max_read_attempts`. A value that shrinks is returned as
    /// filled.
    fn read_variable(&self, name: &str, accept: KindMask) -> Option<(ValueKind, Vec<u8>)> {
        for attempt in 1..=self.config.max_read_attempts {
            let query = self.store.query_value(self.handle, name, accept);
            let info = self.record(name, "query", query)?;
            let mut buf = vec![0u8; info.len];
            match self.store.read_value(self.handle, name, accept, &mut buf) {
                Ok(filled) => {
                    self.last_status.set(StatusCode::SUCCESS);
                    buf.truncate(filled.len);
                    return Some((filled.kind, buf));
                }
                Err(StoreError::BufferTooSmall { required }) => {
                    self.last_status.set(StatusCode::MORE_DATA);
                    debug!(
                        path = %self.path,
                        name,
                        attempt,
                        queried = info.len,
                        required,
                        "value grew between size query and read"
                    );
                }
                Err(e) => {
                    self.fail(name, "read", &e);
                    return None;
                }
            }
        }
        None
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Write a fixed-size value under `T::KIND`. Returns `true` on success.
    pub fn set_value<T: Scalar>(&self, name: &str, value: T) -> bool {
        let bytes = value.to_bytes();
        debug_assert_eq!(bytes.len(), T::SIZE);
        self.write(name, T::KIND, &bytes)
    }

    /// Write a single string with one trailing terminator.
    pub fn set_string(&self, name: &str, value: &str) -> bool {
        match encode_text(value) {
            Ok(buf) => self.write(name, ValueKind::Text, &buf),
            Err(e) => {
                self.reject(name, format_args!("{e}"));
                false
            }
        }
    }

    /// Write a string sequence. An empty slice writes the one-byte empty
    /// sequence.
    pub fn set_multi_string<T: AsRef<str>>(&self, name: &str, values: &[T]) -> bool {
        match encode_multi_text(values) {
            Ok(buf) => self.write(name, ValueKind::MultiText, &buf),
            Err(e) => {
                self.reject(name, format_args!("{e}"));
                false
            }
        }
    }

    fn write(&self, name: &str, kind: ValueKind, data: &[u8]) -> bool {
        let result = self.store.write_value(self.handle, name, kind, data);
        self.record(name, "write", result).is_some()
    }

    // -----------------------------------------------------------------------
    // Status bookkeeping
    // -----------------------------------------------------------------------

    fn record<R>(&self, name: &str, op: &'static str, result: StoreResult<R>) -> Option<R> {
        match result {
            Ok(r) => {
                self.last_status.set(StatusCode::SUCCESS);
                Some(r)
            }
            Err(e) => {
                self.fail(name, op, &e);
                None
            }
        }
    }

    fn fail(&self, name: &str, op: &'static str, err: &StoreError) {
        let status = err.status();
        self.last_status.set(status);
        debug!(path = %self.path, name, op, %status, error = %err, "value access failed");
    }

    fn reject(&self, name: &str, reason: std::fmt::Arguments<'_>) {
        self.last_status.set(StatusCode::INVALID_DATA);
        debug!(path = %self.path, name, %reason, "value rejected");
    }
}

impl<S: KeyStore + ?Sized, P: AccessPolicy> Drop for KeyAccessor<'_, S, P> {
    fn drop(&mut self) {
        match self.store.close(self.handle) {
            Ok(()) => debug!(path = %self.path, handle = %self.handle, "accessor closed"),
            Err(e) => warn!(
                path = %self.path,
                handle = %self.handle,
                error = %e,
                "failed to close handle"
            ),
        }
    }
}

impl<S: KeyStore + ?Sized, P: AccessPolicy> std::fmt::Debug for KeyAccessor<'_, S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyAccessor")
            .field("path", &self.path)
            .field("handle", &self.handle)
            .field("rights", &P::RIGHTS)
            .finish()
    }
}
