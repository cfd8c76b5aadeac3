//! Text and multi-text buffer encoding.
//!
//! Text is stored as its UTF-8 bytes followed by one NUL. Multi-text is each
//! string followed by its own NUL, then one more NUL closing the sequence:
//!
//! ```text
//! ["a", "bb"]  ->  61 00 62 62 00 00
//! []           ->  00
//! ```

use crate::error::TypeError;

fn check_no_nul(s: &str) -> Result<(), TypeError> {
    match s.bytes().position(|b| b == 0) {
        Some(position) => Err(TypeError::InteriorNul { position }),
        None => Ok(()),
    }
}

/// Encode a single string as a NUL-terminated buffer.
pub fn encode_text(s: &str) -> Result<Vec<u8>, TypeError> {
    check_no_nul(s)?;
    let mut buf = Vec::with_capacity(s.len() + 1);
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(buf)
}

/// Decode a text buffer.
///
/// Trailing NULs are stripped; anything before them, including an interior
/// NUL left by another writer, is kept. A buffer with no terminator at all is
/// accepted as-is.
pub fn decode_text(buf: &[u8]) -> Result<String, TypeError> {
    let end = buf.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8(buf[..end].to_vec()).map_err(|e| TypeError::InvalidUtf8(e.to_string()))
}

/// Encode a sequence of strings as a multi-text buffer.
///
/// An empty sequence encodes to the single closing NUL.
pub fn encode_multi_text<S: AsRef<str>>(items: &[S]) -> Result<Vec<u8>, TypeError> {
    let total = 1 + items.iter().map(|s| s.as_ref().len() + 1).sum::<usize>();
    let mut buf = Vec::with_capacity(total);
    for item in items {
        let s = item.as_ref();
        check_no_nul(s)?;
        buf.extend_from_slice(s.as_bytes());
        buf.push(0);
    }
    buf.push(0);
    debug_assert_eq!(buf.len(), total);
    Ok(buf)
}

/// Decode a multi-text buffer into its strings, in stored order.
///
/// Scanning stops one byte before the end of the buffer; that last byte is
/// the sequence terminator. Empty strings in the middle of the sequence are
/// kept. An empty buffer decodes to an empty sequence.
pub fn decode_multi_text(buf: &[u8]) -> Result<Vec<String>, TypeError> {
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    if buf[buf.len() - 1] != 0 {
        return Err(TypeError::Unterminated);
    }
    let limit = buf.len() - 1;
    let mut items = Vec::new();
    let mut pos = 0;
    while pos < limit {
        let len = buf[pos..limit]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(limit - pos);
        let s = std::str::from_utf8(&buf[pos..pos + len])
            .map_err(|e| TypeError::InvalidUtf8(e.to_string()))?;
        items.push(s.to_string());
        pos += len + 1;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn text_has_single_terminator() {
        assert_eq!(encode_text("hello").unwrap(), b"hello\0".to_vec());
        assert_eq!(encode_text("").unwrap(), vec![0]);
    }

    #[test]
    fn text_decode_strips_terminator() {
        assert_eq!(decode_text(b"hello\0").unwrap(), "hello");
        assert_eq!(decode_text(b"hello\0\0").unwrap(), "hello");
        assert_eq!(decode_text(b"hello").unwrap(), "hello");
        assert_eq!(decode_text(b"").unwrap(), "");
        assert_eq!(decode_text(b"\0").unwrap(), "");
    }

    #[test]
    fn text_decode_keeps_interior_nul() {
        assert_eq!(decode_text(b"a\0b\0").unwrap(), "a\0b");
        assert_eq!(decode_text(b"a\0\0b").unwrap(), "a\0\0b");
    }

    #[test]
    fn interior_nul_rejected() {
        assert_eq!(
            encode_text("a\0b"),
            Err(TypeError::InteriorNul { position: 1 })
        );
        assert_eq!(
            encode_multi_text(&["ok", "x\0"]),
            Err(TypeError::InteriorNul { position: 1 })
        );
    }

    #[test]
    fn multi_text_layout() {
        let buf = encode_multi_text(&["a", "bb", "ccc"]).unwrap();
        assert_eq!(buf, b"a\0bb\0ccc\0\0".to_vec());
        assert_eq!(buf.len(), 2 + 3 + 4 + 1);
    }

    #[test]
    fn empty_sequence_is_one_byte() {
        let empty: [&str; 0] = [];
        assert_eq!(encode_multi_text(&empty).unwrap(), vec![0]);
        assert_eq!(decode_multi_text(&[0]).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn empty_entries_in_the_middle_survive() {
        let buf = encode_multi_text(&["a", "", "b"]).unwrap();
        assert_eq!(buf, b"a\0\0b\0\0".to_vec());
        assert_eq!(decode_multi_text(&buf).unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn unterminated_multi_text_rejected() {
        assert_eq!(decode_multi_text(b"abc"), Err(TypeError::Unterminated));
    }

    #[test]
    fn single_terminator_without_closing_entry() {
        // "a\0" has no closing empty entry; the last NUL is taken as the
        // sequence terminator and "a" is still returned.
        assert_eq!(decode_multi_text(b"a\0").unwrap(), vec!["a"]);
    }

    #[test]
    fn invalid_utf8_rejected() {
        assert!(matches!(
            decode_multi_text(&[0xff, 0, 0]),
            Err(TypeError::InvalidUtf8(_))
        ));
        assert!(matches!(decode_text(&[0xc3, 0]), Err(TypeError::InvalidUtf8(_))));
    }

    proptest! {
        #[test]
        fn multi_text_preserves_order_and_count(items in prop::collection::vec("\\PC{0,12}", 0..8)) {
            let buf = encode_multi_text(&items).unwrap();
            prop_assert_eq!(*buf.last().unwrap(), 0u8);
            let decoded = decode_multi_text(&buf).unwrap();
            prop_assert_eq!(decoded, items);
        }
    }
}
