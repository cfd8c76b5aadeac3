use serde::{Deserialize, Serialize};

/// Numeric status reported by store operations.
///
/// Values follow the conventional system error numbering used by native
/// configuration stores so that codes stay recognisable in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(pub u32);

impl StatusCode {
    pub const SUCCESS: Self = Self(0);
    pub const NOT_FOUND: Self = Self(2);
    pub const ACCESS_DENIED: Self = Self(5);
    pub const INVALID_HANDLE: Self = Self(6);
    pub const INVALID_DATA: Self = Self(13);
    pub const INVALID_NAME: Self = Self(123);
    pub const MORE_DATA: Self = Self(234);
    pub const IO: Self = Self(1117);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SUCCESS => "success",
            Self::NOT_FOUND => "not found",
            Self::ACCESS_DENIED => "access denied",
            Self::INVALID_HANDLE => "invalid handle",
            Self::INVALID_DATA => "invalid data",
            Self::INVALID_NAME => "invalid name",
            Self::MORE_DATA => "more data is available",
            Self::IO => "I/O failure",
            _ => "unknown status",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.0, self.description())
    }
}
