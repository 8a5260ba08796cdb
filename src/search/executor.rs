use crate::index::index_cache::CachedIndex;
use crate::query::cache::QueryKey;
use crate::query::compiler::Predicate;
use crate::query::types::Conditions;
use crate::search::set_ops::{self, IdSet};
use crate::search::traversal::traverse;

/// Runs compiled sub-queries against one cached index.
pub struct QueryExecutor<'a> {
    pub index: &'a CachedIndex,
    /// Every id in the collection.
    pub universe: &'a IdSet,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(index: &'a CachedIndex, universe: &'a IdSet) -> Self {
        QueryExecutor { index, universe }
    }

    /// Resolves each predicate group and combines the groups by `conditions`.
    pub fn execute(&self, groups: &[Vec<Predicate>], conditions: Conditions) -> IdSet {
        let sets: Vec<IdSet> = groups
            .iter()
            .map(|predicates| self.resolve_group(predicates))
            .collect();
        combine(conditions, &sets, self.universe)
    }

    /// Intersection of a sub-query's predicates, memoized per index.
    ///
    /// A sub-query without predicates places no constraint and matches every id.
    pub fn resolve_group(&self, predicates: &[Predicate]) -> IdSet {
        if predicates.is_empty() {
            return self.universe.clone();
        }

        let key = QueryKey::new(predicates);
        self.index.queries.get_or_compute(key, || {
            let mut result: Option<IdSet> = None;
            for predicate in predicates {
                let ids = traverse(&self.index.index.root, predicate);
                let next = match result {
                    Some(acc) => acc.intersect(&ids),
                    None => ids,
                };
                if next.is_empty() {
                    return next;
                }
                result = Some(next);
            }
            result.unwrap_or_default()
        })
    }
}

/// Combines per-sub-query id sets.
///
/// `Diff` with fewer than two sets yields no ids; `None` over no sets yields
/// the whole universe.
pub fn combine(conditions: Conditions, sets: &[IdSet], universe: &IdSet) -> IdSet {
    match conditions {
        Conditions::All => set_ops::intersection(sets),
        Conditions::Any => set_ops::union(sets),
        Conditions::Diff => match sets.split_first() {
            Some((first, rest)) if !rest.is_empty() => set_ops::difference(first, rest),
            _ => IdSet::new(),
        },
        Conditions::None => set_ops::difference(universe, sets),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::core::types::{DocId, Entities};
    use crate::index::builder::IndexBuilder;
    use crate::query::ast::Query;
    use crate::query::compiler::compile_all;

    fn set(ids: &[u32]) -> IdSet {
        ids.iter().copied().map(DocId).collect()
    }

    fn ids(set: &IdSet) -> Vec<u32> {
        set.iter().map(|d| d.0).collect()
    }

    fn cached() -> CachedIndex {
        let entities: Entities = [
            ("1", json!({"id": "1", "type": "fruit", "color": "red"})),
            ("2", json!({"id": "2", "type": "fruit", "color": "green"})),
            ("3", json!({"id": "3", "type": "veg", "color": "red"})),
        ]
        .into_iter()
        .map(|(id, record)| (id.to_string(), record))
        .collect();
        CachedIndex::new(IndexBuilder::new("id").build(&entities), 10)
    }

    fn run(index: &CachedIndex, query: serde_json::Value, conditions: Conditions) -> Vec<u32> {
        let universe = IdSet::full(index.index.doc_count);
        let groups = compile_all(&Query::parse(&query).unwrap()).unwrap();
        ids(&QueryExecutor::new(index, &universe).execute(&groups, conditions))
    }

    #[test]
    fn predicates_within_sub_query_are_anded() {
        let index = cached();
        assert_eq!(run(&index, json!({"type": "fruit", "color": "red"}), Conditions::All), vec![0]);
    }

    #[test]
    fn each_condition_mode() {
        let index = cached();
        let query = json!([{"type": "fruit"}, {"color": "red"}]);
        assert_eq!(run(&index, query.clone(), Conditions::All), vec![0]);
        assert_eq!(run(&index, query.clone(), Conditions::Any), vec![0, 1, 2]);
        assert_eq!(run(&index, query.clone(), Conditions::Diff), vec![1]);
        assert_eq!(run(&index, query, Conditions::None), Vec::<u32>::new());
        assert_eq!(run(&index, json!({"type": "fruit"}), Conditions::None), vec![2]);
    }

    #[test]
    fn empty_sub_query_matches_everything() {
        let index = cached();
        assert_eq!(run(&index, json!({}), Conditions::All), vec![0, 1, 2]);
        assert_eq!(run(&index, json!([{}, {"color": "green"}]), Conditions::All), vec![1]);
    }

    #[test]
    fn group_results_are_memoized() {
        let index = cached();
        run(&index, json!({"type": "fruit"}), Conditions::All);
        run(&index, json!({"type": "fruit"}), Conditions::Any);
        let stats = index.queries.stats();
        assert_eq!((stats.hit_count, stats.miss_count), (1, 1));
    }

    #[test]
    fn combine_edge_cases() {
        let universe = set(&[0, 1, 2, 3]);
        assert!(combine(Conditions::Diff, &[set(&[1, 2])], &universe).is_empty());
        assert!(combine(Conditions::Diff, &[], &universe).is_empty());
        assert!(combine(Conditions::All, &[], &universe).is_empty());
        assert!(combine(Conditions::Any, &[], &universe).is_empty());
        assert_eq!(ids(&combine(Conditions::None, &[], &universe)), vec![0, 1, 2, 3]);
        assert_eq!(
            ids(&combine(Conditions::Diff, &[set(&[0, 1, 2]), set(&[1]), set(&[2, 3])], &universe)),
            vec![0]
        );
    }
}
