use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{decode_multi_text, decode_text};
use crate::error::TypeError;

/// Storage type tag of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Opaque fixed-size bytes.
    Binary,
    /// 4-byte little-endian integer.
    U32,
    /// 8-byte little-endian integer.
    U64,
    /// Single NUL-terminated string.
    Text,
    /// Sequence of NUL-terminated strings closed by an empty entry.
    MultiText,
}

impl ValueKind {
    /// Default kind for a fixed-size value of `size` bytes.
    ///
    /// 4 bytes map to [`ValueKind::U32`], 8 bytes to [`ValueKind::U64`],
    /// everything else is [`ValueKind::Binary`].
    pub const fn fixed_for_size(size: usize) -> Self {
        match size {
            4 => Self::U32,
            8 => Self::U64,
            _ => Self::Binary,
        }
    }

    /// The single-kind mask containing only this kind.
    pub const fn mask(self) -> KindMask {
        KindMask(1 << self as u8)
    }

    /// Whether values of this kind have a size fixed by their type.
    pub fn is_fixed(self) -> bool {
        KindMask::FIXED.contains(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Text => "text",
            Self::MultiText => "multi-text",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(Self::Binary),
            "u32" => Ok(Self::U32),
            "u64" => Ok(Self::U64),
            "text" => Ok(Self::Text),
            "multi-text" => Ok(Self::MultiText),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}

/// Set of [`ValueKind`]s a read accepts.
///
/// A read whose stored kind is not in the mask fails as if the value had the
/// wrong type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindMask(u8);

impl KindMask {
    pub const NONE: Self = Self(0);
    /// Binary, 4-byte and 8-byte integers: everything a fixed-size read takes.
    pub const FIXED: Self = Self(
        ValueKind::Binary.mask().0 | ValueKind::U32.mask().0 | ValueKind::U64.mask().0,
    );
    pub const TEXT: Self = ValueKind::Text.mask();
    pub const MULTI_TEXT: Self = ValueKind::MultiText.mask();
    pub const ANY: Self = Self(Self::FIXED.0 | Self::TEXT.0 | Self::MULTI_TEXT.0);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, kind: ValueKind) -> bool {
        self.0 & kind.mask().0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for KindMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds = [
            ValueKind::Binary,
            ValueKind::U32,
            ValueKind::U64,
            ValueKind::Text,
            ValueKind::MultiText,
        ];
        let names: Vec<&str> = kinds
            .iter()
            .filter(|k| self.contains(**k))
            .map(|k| k.as_str())
            .collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// A value read without a type expectation: its kind tag plus raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawValue {
    pub kind: ValueKind,
    pub data: Vec<u8>,
}

impl RawValue {
    pub fn new(kind: ValueKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    /// Human-readable rendering used by tooling.
    ///
    /// Integers print in decimal, text as-is, multi-text one entry per line
    /// and binary as lowercase hex.
    pub fn render(&self) -> String {
        match self.kind {
            ValueKind::U32 if self.data.len() == 4 => {
                let mut b = [0u8; 4];
                b.copy_from_slice(&self.data);
                u32::from_le_bytes(b).to_string()
            }
            ValueKind::U64 if self.data.len() == 8 => {
                let mut b = [0u8; 8];
                b.copy_from_slice(&self.data);
                u64::from_le_bytes(b).to_string()
            }
            ValueKind::Text => match decode_text(&self.data) {
                Ok(s) => s,
                Err(_) => hex::encode(&self.data),
            },
            ValueKind::MultiText => match decode_multi_text(&self.data) {
                Ok(items) => items.join("\n"),
                Err(_) => hex::encode(&self.data),
            },
            _ => hex::encode(&self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_dispatch() {
        assert_eq!(ValueKind::fixed_for_size(4), ValueKind::U32);
        assert_eq!(ValueKind::fixed_for_size(8), ValueKind::U64);
        assert_eq!(ValueKind::fixed_for_size(1), ValueKind::Binary);
        assert_eq!(ValueKind::fixed_for_size(16), ValueKind::Binary);
        assert_eq!(ValueKind::fixed_for_size(0), ValueKind::Binary);
    }

    #[test]
    fn fixed_mask_excludes_text() {
        assert!(KindMask::FIXED.contains(ValueKind::Binary));
        assert!(KindMask::FIXED.contains(ValueKind::U32));
        assert!(KindMask::FIXED.contains(ValueKind::U64));
        assert!(!KindMask::FIXED.contains(ValueKind::Text));
        assert!(!KindMask::FIXED.contains(ValueKind::MultiText));
    }

    #[test]
    fn any_contains_everything() {
        for kind in [
            ValueKind::Binary,
            ValueKind::U32,
            ValueKind::U64,
            ValueKind::Text,
            ValueKind::MultiText,
        ] {
            assert!(KindMask::ANY.contains(kind));
            assert!(!KindMask::NONE.contains(kind));
        }
    }

    #[test]
    fn kind_parse_round_trips_display() {
        let kind: ValueKind = "multi-text".parse().unwrap();
        assert_eq!(kind, ValueKind::MultiText);
        assert_eq!(kind.to_string(), "multi-text");
        assert!("dword".parse::<ValueKind>().is_err());
    }

    #[test]
    fn mask_display() {
        assert_eq!(KindMask::FIXED.to_string(), "binary|u32|u64");
        assert_eq!(KindMask::NONE.to_string(), "none");
    }

    #[test]
    fn render_values() {
        let v = RawValue::new(ValueKind::U32, 42u32.to_le_bytes().to_vec());
        assert_eq!(v.render(), "42");
        let v = RawValue::new(ValueKind::Text, b"hello\0".to_vec());
        assert_eq!(v.render(), "hello");
        let v = RawValue::new(ValueKind::MultiText, b"a\0bb\0\0".to_vec());
        assert_eq!(v.render(), "a\nbb");
        let v = RawValue::new(ValueKind::Binary, vec![0xde, 0xad]);
        assert_eq!(v.render(), "dead");
    }

    #[test]
    fn render_falls_back_to_hex() {
        let v = RawValue::new(ValueKind::U32, vec![0x01, 0x02]);
        assert_eq!(v.render(), "0102");
        let v = RawValue::new(ValueKind::Text, vec![0xff, 0xfe, 0x00]);
        assert_eq!(v.render(), "fffe00");
        let v = RawValue::new(ValueKind::MultiText, b"abc".to_vec());
        assert_eq!(v.render(), "616263");
    }

    #[test]
    fn kind_serde() {
        let json = serde_json::to_string(&ValueKind::U64).unwrap();
        let back: ValueKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ValueKind::U64);
    }
}
