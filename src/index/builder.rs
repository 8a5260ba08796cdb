use std::time::Instant;
use rayon::prelude::*;
use serde_json::Value;
use crate::core::types::{stringify, DocId, Entities};
use crate::index::inverted::{IndexNode, InvertedIndex};

/// Builds the inverted index of a collection.
pub struct IndexBuilder<'a> {
    /// Id field, left out of the index.
    pub key: &'a str,
    /// Collections with more records than this are indexed in parallel.
    pub parallel_threshold: usize,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(key: &'a str) -> Self {
        IndexBuilder {
            key,
            parallel_threshold: usize::MAX,
        }
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Records are numbered in collection order: the n-th record gets `DocId(n)`.
    pub fn build(&self, entities: &Entities) -> InvertedIndex {
        let start = Instant::now();
        let records: Vec<&Value> = entities.values().collect();

        let root = if records.len() > self.parallel_threshold {
            records
                .par_iter()
                .enumerate()
                .map(|(n, record)| self.index_record(record, DocId(n as u32)))
                .reduce(IndexNode::new, |mut acc, node| {
                    acc.merge(node);
                    acc
                })
        } else {
            records
                .iter()
                .enumerate()
                .fold(IndexNode::new(), |mut acc, (n, record)| {
                    acc.merge(self.index_record(record, DocId(n as u32)));
                    acc
                })
        };

        let index = InvertedIndex::new(root, records.len());
        tracing::debug!(
            records = index.doc_count,
            leaves = index.leaf_count(),
            took_us = start.elapsed().as_micros() as u64,
            "built inverted index"
        );
        index
    }

    /// Merges the single-leaf fragments of one record into its own tree.
    pub fn index_record(&self, record: &Value, doc_id: DocId) -> IndexNode {
        let mut node = IndexNode::new();
        let mut path = Vec::new();

        if let Value::Object(fields) = record {
            for (key, value) in fields {
                if key == self.key {
                    continue;
                }
                path.push(key.clone());
                walk(value, &mut path, doc_id, &mut node);
                path.pop();
            }
        }
        node
    }
}

fn walk(value: &Value, path: &mut Vec<String>, doc_id: DocId, node: &mut IndexNode) {
    match value {
        Value::Object(fields) if !fields.is_empty() => {
            for (key, child) in fields {
                path.push(key.clone());
                walk(child, path, doc_id, node);
                path.pop();
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (position, child) in items.iter().enumerate() {
                path.push(position.to_string());
                walk(child, path, doc_id, node);
                path.pop();
            }
        }
        Value::Object(_) | Value::Array(_) => {
            node.merge(IndexNode::empty_fragment(path, doc_id));
        }
        scalar => {
            if let Some(key) = stringify(scalar) {
                node.merge(IndexNode::fragment(path, key, doc_id));
            }
        }
    }
}
