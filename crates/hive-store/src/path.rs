//! Node path and value name validation.
//!
//! Paths use `\` or `/` as separators. Empty segments are ignored, so an
//! empty path names the parent node itself.

use crate::error::{StoreError, StoreResult};

/// Maximum length of one node name segment, in bytes.
pub const MAX_NODE_NAME_LEN: usize = 255;

/// Maximum length of a value name, in bytes.
pub const MAX_VALUE_NAME_LEN: usize = 16_383;

/// Split a relative path into validated segments.
pub fn split_path(path: &str) -> StoreResult<Vec<String>> {
    path.split(['\\', '/'])
        .filter(|s| !s.is_empty())
        .map(|segment| {
            if segment.len() > MAX_NODE_NAME_LEN {
                return Err(StoreError::InvalidName {
                    name: segment.to_string(),
                    reason: format!("node name exceeds {MAX_NODE_NAME_LEN} bytes"),
                });
            }
            if segment.contains('\0') {
                return Err(StoreError::InvalidName {
                    name: segment.to_string(),
                    reason: "node name contains NUL".into(),
                });
            }
            Ok(segment.to_string())
        })
        .collect()
}

/// Validate a value name. The empty name is the node's default value.
pub fn validate_value_name(name: &str) -> StoreResult<()> {
    if name.len() > MAX_VALUE_NAME_LEN {
        return Err(StoreError::InvalidName {
            name: name.chars().take(32).collect(),
            reason: format!("value name exceeds {MAX_VALUE_NAME_LEN} bytes"),
        });
    }
    if name.contains('\0') {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
            reason: "value name contains NUL".into(),
        });
    }
    Ok(())
}

/// Render segments for diagnostics.
pub fn display_path(segments: &[String]) -> String {
    if segments.is_empty() {
        "\\".to_string()
    } else {
        segments.join("\\")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_separators_accepted() {
        assert_eq!(
            split_path("Software\\Vendor/App").unwrap(),
            vec!["Software", "Vendor", "App"]
        );
    }

    #[test]
    fn empty_segments_ignored() {
        assert_eq!(split_path("/a//b/").unwrap(), vec!["a", "b"]);
        assert!(split_path("").unwrap().is_empty());
    }

    #[test]
    fn long_segment_rejected() {
        let long = "x".repeat(MAX_NODE_NAME_LEN + 1);
        assert!(matches!(
            split_path(&long),
            Err(StoreError::InvalidName { .. })
        ));
    }

    #[test]
    fn value_name_rules() {
        assert!(validate_value_name("").is_ok());
        assert!(validate_value_name("Install Dir").is_ok());
        assert!(validate_value_name("bad\0name").is_err());
    }

    #[test]
    fn display_root_and_nested() {
        assert_eq!(display_path(&[]), "\\");
        assert_eq!(display_path(&["a".into(), "b".into()]), "a\\b");
    }
}
