use crate::index::inverted::IndexNode;
use crate::query::compiler::{Predicate, Segment, Target};
use crate::search::set_ops::IdSet;

/// Resolves one predicate against an index tree.
///
/// Missing fields or values are not errors; they contribute no ids.
pub fn traverse(node: &IndexNode, predicate: &Predicate) -> IdSet {
    let mut ids = IdSet::new();
    collect(node, &predicate.path, &predicate.target, &mut ids);
    ids
}

fn collect(node: &IndexNode, path: &[Segment], target: &Target, ids: &mut IdSet) {
    let Some((segment, rest)) = path.split_first() else {
        collect_values(node, target, ids);
        return;
    };

    // a literal child wins, even for a segment written as a pattern
    if let Some(child) = node.field(segment.raw()) {
        collect(child, rest, target, ids);
        return;
    }

    if let Segment::Pattern(pattern) = segment {
        for (key, child) in &node.fields {
            if pattern.is_match(key) {
                collect(child, rest, target, ids);
            }
        }
    }
}

fn collect_values(node: &IndexNode, target: &Target, ids: &mut IdSet) {
    match target {
        Target::Exact(value) => {
            if let Some(postings) = node.value(value) {
                ids.extend(postings.iter());
            }
        }
        Target::Pattern(pattern) => {
            for (value, postings) in &node.values {
                if pattern.is_match(value) {
                    ids.extend(postings.iter());
                }
            }
        }
        Target::Empty => ids.extend(node.empty.iter()),
    }
}
