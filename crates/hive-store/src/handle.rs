use hive_types::ValueKind;

/// Opaque reference to an open node.
///
/// Handles are issued by [`KeyStore::open`](crate::KeyStore::open) and stay
/// valid until passed to [`KeyStore::close`](crate::KeyStore::close).
/// [`Handle::ROOT`] is predefined and never needs closing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    pub const ROOT: Handle = Handle(0);

    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Kind and byte length of a stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueInfo {
    pub kind: ValueKind,
    pub len: usize,
}
