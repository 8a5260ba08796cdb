use std::collections::HashMap;
use crate::core::types::DocId;
use crate::index::posting::PostingList;

/// One level of the index tree.
///
/// `fields` holds nested field names, `values` maps the stringified value
/// found at this path to the records holding it, and `empty` lists records
/// whose value here is an empty object or list. Keeping them apart means a
/// field called `"red"` never collides with a value `"red"`, and the string
/// `"{}"` never collides with an empty object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexNode {
    pub fields: HashMap<String, IndexNode>,
    pub values: HashMap<String, PostingList>,
    pub empty: PostingList,
}

impl IndexNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-leaf tree `{path..., value: [doc_id]}`.
    pub fn fragment(path: &[String], value: String, doc_id: DocId) -> IndexNode {
        let mut leaf = IndexNode::new();
        leaf.values.insert(value, PostingList::single(doc_id));
        Self::nest(path, leaf)
    }

    /// Single-leaf tree marking an empty object or list at `path`.
    pub fn empty_fragment(path: &[String], doc_id: DocId) -> IndexNode {
        let leaf = IndexNode {
            empty: PostingList::single(doc_id),
            ..IndexNode::new()
        };
        Self::nest(path, leaf)
    }

    fn nest(path: &[String], leaf: IndexNode) -> IndexNode {
        path.iter().rev().fold(leaf, |child, key| {
            let mut parent = IndexNode::new();
            parent.fields.insert(key.clone(), child);
            parent
        })
    }

    /// Deep merge. Levels present on both sides are merged recursively and
    /// posting lists under the same value are concatenated.
    pub fn merge(&mut self, other: IndexNode) {
        for (key, child) in other.fields {
            match self.fields.get_mut(&key) {
                Some(existing) => existing.merge(child),
                None => {
                    self.fields.insert(key, child);
                }
            }
        }

        for (value, postings) in other.values {
            match self.values.get_mut(&value) {
                Some(existing) => existing.append(postings),
                None => {
                    self.values.insert(value, postings);
                }
            }
        }

        self.empty.append(other.empty);
    }

    pub fn field(&self, key: &str) -> Option<&IndexNode> {
        self.fields.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&PostingList> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.values.is_empty() && self.empty.is_empty()
    }

    /// Number of value keys in this subtree, counting an empty-container
    /// marker as one.
    pub fn leaf_count(&self) -> usize {
        let here = self.values.len() + usize::from(!self.empty.is_empty());
        here + self.fields.values().map(IndexNode::leaf_count).sum::<usize>()
    }
}

/// Index over one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvertedIndex {
    pub root: IndexNode,
    pub doc_count: usize,
}

impl InvertedIndex {
    pub fn new(root: IndexNode, doc_count: usize) -> Self {
        InvertedIndex { root, doc_count }
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn fragment_builds_single_leaf() {
        let node = IndexNode::fragment(&path(&["meta", "tag"]), "x".into(), DocId(4));
        let leaf = node.field("meta").and_then(|n| n.field("tag")).unwrap();
        assert_eq!(leaf.value("x"), Some(&PostingList::single(DocId(4))));
        assert_eq!(node.leaf_count(), 1);
    }

    #[test]
    fn merge_concatenates_postings() {
        let mut node = IndexNode::fragment(&path(&["color"]), "red".into(), DocId(0));
        node.merge(IndexNode::fragment(&path(&["color"]), "red".into(), DocId(2)));
        node.merge(IndexNode::fragment(&path(&["color"]), "green".into(), DocId(1)));
        node.merge(IndexNode::fragment(&path(&["type"]), "fruit".into(), DocId(0)));

        let color = node.field("color").unwrap();
        assert_eq!(color.value("red").unwrap().doc_ids, vec![DocId(0), DocId(2)]);
        assert_eq!(color.value("green").unwrap().doc_ids, vec![DocId(1)]);
        assert_eq!(node.leaf_count(), 3);
    }

    #[test]
    fn field_and_value_with_same_name_do_not_collide() {
        let mut node = IndexNode::fragment(&path(&["a"]), "b".into(), DocId(0));
        node.merge(IndexNode::fragment(&path(&["a", "b"]), "c".into(), DocId(1)));

        let a = node.field("a").unwrap();
        assert_eq!(a.value("b").unwrap().doc_ids, vec![DocId(0)]);
        assert_eq!(a.field("b").unwrap().value("c").unwrap().doc_ids, vec![DocId(1)]);
    }

    #[test]
    fn empty_marker_is_kept_apart_from_values() {
        let mut node = IndexNode::empty_fragment(&path(&["meta"]), DocId(0));
        node.merge(IndexNode::fragment(&path(&["meta"]), "{}".into(), DocId(1)));
        node.merge(IndexNode::empty_fragment(&path(&["meta"]), DocId(2)));

        let meta = node.field("meta").unwrap();
        assert_eq!(meta.empty.doc_ids, vec![DocId(0), DocId(2)]);
        assert_eq!(meta.value("{}").unwrap().doc_ids, vec![DocId(1)]);
        assert_eq!(node.leaf_count(), 2);
    }
}
