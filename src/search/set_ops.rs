use roaring::RoaringBitmap;
use crate::core::types::DocId;

/// Set of record ordinals. Iteration is always ascending, i.e. collection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdSet(RoaringBitmap);

impl IdSet {
    pub fn new() -> Self {
        IdSet(RoaringBitmap::new())
    }

    /// Every ordinal in `0..count`.
    pub fn full(count: usize) -> Self {
        let mut bitmap = RoaringBitmap::new();
        bitmap.insert_range(0..count as u32);
        IdSet(bitmap)
    }

    pub fn insert(&mut self, id: DocId) -> bool {
        self.0.insert(id.0)
    }

    pub fn extend<I: IntoIterator<Item = DocId>>(&mut self, ids: I) {
        self.0.extend(ids.into_iter().map(|id| id.0));
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.0.contains(id.0)
    }

    pub fn len(&self) -> usize {
        self.0.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.0.iter().map(DocId)
    }

    pub fn intersect(&self, other: &IdSet) -> IdSet {
        IdSet(&self.0 & &other.0)
    }

    pub fn union(&self, other: &IdSet) -> IdSet {
        IdSet(&self.0 | &other.0)
    }

    pub fn difference(&self, other: &IdSet) -> IdSet {
        IdSet(&self.0 - &other.0)
    }

    pub fn is_subset(&self, other: &IdSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_disjoint(&self, other: &IdSet) -> bool {
        self.0.is_disjoint(&other.0)
    }
}

impl FromIterator<DocId> for IdSet {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        IdSet(iter.into_iter().map(|id| id.0).collect())
    }
}

/// Ids present in every set. No sets means no ids.
pub fn intersection(sets: &[IdSet]) -> IdSet {
    let Some((first, rest)) = sets.split_first() else {
        return IdSet::new();
    };

    let mut result = first.clone();
    for set in rest {
        if result.is_empty() {
            break;
        }
        result.0 &= &set.0;
    }
    result
}

/// Ids present in at least one set.
pub fn union(sets: &[IdSet]) -> IdSet {
    let mut result = IdSet::new();
    for set in sets {
        result.0 |= &set.0;
    }
    result
}

/// Ids of `first` found in none of `rest`.
pub fn difference(first: &IdSet, rest: &[IdSet]) -> IdSet {
    first.difference(&union(rest))
}
