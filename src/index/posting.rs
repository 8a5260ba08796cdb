use crate::core::types::DocId;
use crate::search::set_ops::IdSet;

/// Ids stored under one value key of the index.
///
/// Merging only appends, so a list may hold the same id more than once;
/// readers go through [`PostingList::to_set`], which removes duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingList {
    pub doc_ids: Vec<DocId>,
}

impl PostingList {
    pub fn single(doc_id: DocId) -> Self {
        PostingList {
            doc_ids: vec![doc_id],
        }
    }

    /// Concatenates `other` onto this list.
    pub fn append(&mut self, mut other: PostingList) {
        self.doc_ids.append(&mut other.doc_ids);
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.doc_ids.iter().copied()
    }

    pub fn to_set(&self) -> IdSet {
        self.iter().collect()
    }
}
