//! Property tests for the condition modes and the caches.

use std::collections::BTreeSet;

use entity_query::core::config::Config;
use entity_query::core::engine::QueryEngine;
use entity_query::query::types::{Conditions, SearchOptions};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const FIELDS: [&str; 3] = ["kind", "color", "size"];
const VALUES: [&str; 3] = ["a", "b", "c"];

fn arb_record_fields() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..FIELDS.len(), 0..VALUES.len()), 0..4)
}

fn arb_records() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec((arb_record_fields(), any::<bool>()), 1..24).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (fields, nested))| {
                let mut record = Map::new();
                record.insert("id".into(), json!(format!("r{i:02}")));
                for (f, v) in fields {
                    record.insert(FIELDS[f].into(), json!(VALUES[v]));
                }
                if nested {
                    record.insert("meta".into(), json!({"kind": VALUES[i % VALUES.len()]}));
                }
                Value::Object(record)
            })
            .collect()
    })
}

fn arb_sub_query() -> impl Strategy<Value = Value> {
    prop::collection::vec((0..FIELDS.len(), 0..VALUES.len()), 1..3).prop_map(|fields| {
        let map: Map<String, Value> = fields
            .into_iter()
            .map(|(f, v)| (FIELDS[f].to_string(), json!(VALUES[v])))
            .collect();
        Value::Object(map)
    })
}

fn arb_queries() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_sub_query(), 1..4)
}

fn engine(records: &[Value], config: Config) -> QueryEngine {
    QueryEngine::from_records(records.to_vec(), config).unwrap()
}

fn run(engine: &QueryEngine, queries: &[Value], conditions: Conditions) -> BTreeSet<String> {
    let query = Value::Array(queries.to_vec());
    engine
        .search_value(Some(&query), &SearchOptions::from(conditions))
        .unwrap()
        .into_iter()
        .collect()
}

/// Linear scan over the flat fields of the records.
fn scan(records: &[Value], sub_query: &Value) -> BTreeSet<String> {
    let wanted = sub_query.as_object().unwrap();
    records
        .iter()
        .filter(|record| wanted.iter().all(|(k, v)| record.get(k) == Some(v)))
        .map(|record| record["id"].as_str().unwrap().to_string())
        .collect()
}

proptest! {
    #[test]
    fn index_agrees_with_scan(records in arb_records(), sub_query in arb_sub_query()) {
        let engine = engine(&records, Config::default());
        let found = run(&engine, std::slice::from_ref(&sub_query), Conditions::All);
        prop_assert_eq!(found, scan(&records, &sub_query));
    }

    #[test]
    fn any_contains_each_and_each_contains_all(records in arb_records(), queries in arb_queries()) {
        let engine = engine(&records, Config::default());
        let all = run(&engine, &queries, Conditions::All);
        let any = run(&engine, &queries, Conditions::Any);

        for sub_query in &queries {
            let each = run(&engine, std::slice::from_ref(sub_query), Conditions::All);
            prop_assert!(all.is_subset(&each));
            prop_assert!(each.is_subset(&any));
        }
    }

    #[test]
    fn none_complements_any(records in arb_records(), queries in arb_queries()) {
        let engine = engine(&records, Config::default());
        let any = run(&engine, &queries, Conditions::Any);
        let none = run(&engine, &queries, Conditions::None);
        let every: BTreeSet<String> = engine.all_ids().into_iter().collect();

        prop_assert!(any.is_disjoint(&none));
        let joined: BTreeSet<String> = any.union(&none).cloned().collect();
        prop_assert_eq!(joined, every);
    }

    #[test]
    fn diff_keeps_only_first_exclusive_ids(records in arb_records(), queries in arb_queries()) {
        let engine = engine(&records, Config::default());
        let diff = run(&engine, &queries, Conditions::Diff);

        if queries.len() < 2 {
            prop_assert!(diff.is_empty());
        } else {
            let first = run(&engine, &queries[..1], Conditions::All);
            let rest = run(&engine, &queries[1..], Conditions::Any);
            let expected: BTreeSet<String> = first.difference(&rest).cloned().collect();
            prop_assert_eq!(diff, expected);
        }
    }

    #[test]
    fn search_is_idempotent(records in arb_records(), queries in arb_queries()) {
        let engine = engine(&records, Config::default());
        for conditions in [Conditions::All, Conditions::Any, Conditions::Diff, Conditions::None] {
            let first = run(&engine, &queries, conditions);
            let second = run(&engine, &queries, conditions);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn caching_does_not_change_results(records in arb_records(), queries in arb_queries()) {
        let cached = engine(&records, Config::default());
        let uncached = engine(&records, Config { cache_size: 0, index_cache_size: 0, ..Config::default() });
        let tiny = engine(&records, Config { cache_size: 1, ..Config::default() });

        for conditions in [Conditions::All, Conditions::Any, Conditions::Diff, Conditions::None] {
            let expected = run(&uncached, &queries, conditions);
            prop_assert_eq!(&run(&cached, &queries, conditions), &expected);
            prop_assert_eq!(&run(&tiny, &queries, conditions), &expected);
            prop_assert_eq!(&run(&tiny, &queries, conditions), &expected);
        }
    }

    #[test]
    fn parallel_build_matches_sequential(records in arb_records(), queries in arb_queries()) {
        let sequential = engine(&records, Config { parallel_threshold: usize::MAX, ..Config::default() });
        let parallel = engine(&records, Config { parallel_threshold: 0, ..Config::default() });

        for conditions in [Conditions::All, Conditions::Any] {
            prop_assert_eq!(
                run(&sequential, &queries, conditions),
                run(&parallel, &queries, conditions)
            );
        }
        prop_assert_eq!(
            sequential.stats().index_leaves,
            parallel.stats().index_leaves
        );
    }
}
