use serde::{Deserialize, Serialize};

/// Rights requested when opening a node.
///
/// The store enforces rights; holders of a handle without read rights cannot
/// read values through it, and likewise for writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessRights {
    Read,
    Write,
    ReadWrite,
}

impl AccessRights {
    pub fn allows_read(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn allows_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }

    /// Whether every right in `requested` is also granted by `self`.
    pub fn covers(self, requested: AccessRights) -> bool {
        (!requested.allows_read() || self.allows_read())
            && (!requested.allows_write() || self.allows_write())
    }
}

impl std::fmt::Display for AccessRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::ReadWrite => write!(f, "read-write"),
        }
    }
}

/// Access rights fixed at the type level.
///
/// An accessor type carries its policy as a type parameter, so the rights it
/// opens with cannot be changed per call.
pub trait AccessPolicy {
    const RIGHTS: AccessRights;
}

/// Policy for accessors that only read.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadOnly;

/// Policy for accessors that only write.
#[derive(Clone, Copy, Debug, Default)]
pub struct WriteOnly;

/// Policy for accessors that read and write.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadWrite;

impl AccessPolicy for ReadOnly {
    const RIGHTS: AccessRights = AccessRights::Read;
}

impl AccessPolicy for WriteOnly {
    const RIGHTS: AccessRights = AccessRights::Write;
}

impl AccessPolicy for ReadWrite {
    const RIGHTS: AccessRights = AccessRights::ReadWrite;
}
