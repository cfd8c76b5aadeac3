use std::collections::BTreeMap;

use hive_types::{AccessRights, ValueKind};
use serde::{Deserialize, Serialize};

/// A value as held by a store: kind tag plus raw bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    pub kind: ValueKind,
    pub data: Vec<u8>,
}

impl StoredValue {
    pub fn new(kind: ValueKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }
}

/// One node of the hierarchy.
///
/// `permissions` is a ceiling on the rights an open of this node may request;
/// `None` means unrestricted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub values: BTreeMap<String, StoredValue>,
    pub children: BTreeMap<String, Node>,
    pub permissions: Option<AccessRights>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk down `segments`, returning the node at the end if every step
    /// exists.
    pub fn descend(&self, segments: &[String]) -> Option<&Node> {
        segments
            .iter()
            .try_fold(self, |node, seg| node.children.get(seg))
    }

    pub fn descend_mut(&mut self, segments: &[String]) -> Option<&mut Node> {
        let mut node = self;
        for seg in segments {
            node = node.children.get_mut(seg)?;
        }
        Some(node)
    }

    /// Walk down `segments`, creating missing nodes along the way.
    ///
    /// Returns the number of nodes created.
    pub fn create_path(&mut self, segments: &[String]) -> usize {
        let mut created = 0;
        let mut node = self;
        for seg in segments {
            node = node.children.entry(seg.clone()).or_insert_with(|| {
                created += 1;
                Node::new()
            });
        }
        created
    }

    /// Total number of values in this node and all descendants.
    pub fn total_values(&self) -> usize {
        self.values.len()
            + self
                .children
                .values()
                .map(Node::total_values)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn create_then_descend() {
        let mut root = Node::new();
        assert_eq!(root.create_path(&segs(&["a", "b", "c"])), 3);
        assert!(root.descend(&segs(&["a", "b", "c"])).is_some());
        assert!(root.descend(&segs(&["a", "x"])).is_none());
    }

    #[test]
    fn create_existing_path_creates_nothing() {
        let mut root = Node::new();
        root.create_path(&segs(&["a", "b"]));
        assert_eq!(root.create_path(&segs(&["a", "b"])), 0);
        assert_eq!(root.create_path(&segs(&["a", "b", "c"])), 1);
    }

    #[test]
    fn empty_path_is_self() {
        let mut root = Node::new();
        root.values
            .insert("v".into(), StoredValue::new(ValueKind::U32, vec![0; 4]));
        assert_eq!(root.descend(&[]).unwrap().values.len(), 1);
    }

    #[test]
    fn total_values_counts_descendants() {
        let mut root = Node::new();
        root.create_path(&segs(&["a"]));
        root.values
            .insert("x".into(), StoredValue::new(ValueKind::Binary, vec![1]));
        root.descend_mut(&segs(&["a"]))
            .unwrap()
            .values
            .insert("y".into(), StoredValue::new(ValueKind::Binary, vec![2]));
        assert_eq!(root.total_values(), 2);
    }
}
