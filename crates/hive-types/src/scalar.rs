//! Fixed-size values.
//!
//! A [`Scalar`] has a byte size known from its type and a storage kind tag.
//! The tag defaults to the size rule in [`ValueKind::fixed_for_size`] but is
//! declared per type, so a same-sized type with different meaning (a 4-byte
//! array, say) can opt out of being stored as an integer.

use crate::kind::ValueKind;

/// A fixed-size value with a little-endian byte encoding.
pub trait Scalar: Copy + Sized {
    /// Encoded size in bytes. Reads request exactly this many bytes.
    const SIZE: usize;

    /// Storage kind written by `set_value`.
    const KIND: ValueKind = ValueKind::fixed_for_size(Self::SIZE);

    /// Encode to exactly [`Self::SIZE`] bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decode from a buffer of exactly [`Self::SIZE`] bytes.
    ///
    /// Returns `None` when the length differs or the bytes are not a valid
    /// value of this type.
    fn from_bytes(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_scalar_le {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn to_bytes(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }

                fn from_bytes(bytes: &[u8]) -> Option<Self> {
                    let arr: [u8; std::mem::size_of::<$ty>()] = bytes.try_into().ok()?;
                    Some(<$ty>::from_le_bytes(arr))
                }
            }
        )*
    };
}

impl_scalar_le!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128, f32, f64);

impl Scalar for bool {
    const SIZE: usize = 1;

    fn to_bytes(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0] => Some(false),
            [1] => Some(true),
            _ => None,
        }
    }
}

/// Byte arrays are opaque blobs whatever their length.
impl<const N: usize> Scalar for [u8; N] {
    const SIZE: usize = N;
    const KIND: ValueKind = ValueKind::Binary;

    fn to_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_kinds_follow_size() {
        assert_eq!(<u32 as Scalar>::KIND, ValueKind::U32);
        assert_eq!(<i32 as Scalar>::KIND, ValueKind::U32);
        assert_eq!(<u64 as Scalar>::KIND, ValueKind::U64);
        assert_eq!(<i64 as Scalar>::KIND, ValueKind::U64);
        assert_eq!(<u16 as Scalar>::KIND, ValueKind::Binary);
        assert_eq!(<u128 as Scalar>::KIND, ValueKind::Binary);
    }

    #[test]
    fn floats_keep_size_rule() {
        assert_eq!(<f32 as Scalar>::KIND, ValueKind::U32);
        assert_eq!(<f64 as Scalar>::KIND, ValueKind::U64);
    }

    #[test]
    fn byte_arrays_are_binary() {
        assert_eq!(<[u8; 4] as Scalar>::KIND, ValueKind::Binary);
        assert_eq!(<[u8; 8] as Scalar>::KIND, ValueKind::Binary);
        assert_eq!(<[u8; 16] as Scalar>::SIZE, 16);
    }

    #[test]
    fn little_endian_encoding() {
        assert_eq!(0x0102_0304u32.to_bytes(), vec![4, 3, 2, 1]);
        assert_eq!(u32::from_bytes(&[4, 3, 2, 1]), Some(0x0102_0304));
    }

    #[test]
    fn wrong_length_rejected() {
        assert_eq!(u32::from_bytes(&[1, 2, 3]), None);
        assert_eq!(u64::from_bytes(&[0; 4]), None);
        assert_eq!(<[u8; 3]>::from_bytes(&[1, 2]), None);
    }

    #[test]
    fn bool_rejects_other_bytes() {
        assert_eq!(bool::from_bytes(&[1]), Some(true));
        assert_eq!(bool::from_bytes(&[0]), Some(false));
        assert_eq!(bool::from_bytes(&[2]), None);
    }

    #[test]
    fn negative_values_survive() {
        let bytes = (-7i64).to_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(i64::from_bytes(&bytes), Some(-7));
    }
}
