//! Property-based tests for search history operations.
//!
//! Random sequences of record / remove / clear are applied to a history over
//! in-memory storage and checked against a simple model: one record per
//! keyword identity, most recent first, never more than the size bound.

use std::collections::HashMap;

use proptest::prelude::*;
use vidsearch::managers::search_history::{keyword_identity, SearchHistory, SearchHistoryTrait};
use vidsearch::storage::MemoryStorage;

/// Keywords that collide on identity in several spellings.
const POOL: &[&str] = &[
    "rust", "Rust", " rust ", "tokio", "TOKIO", "serde", "axum", "chrono", "reqwest", "tracing",
];

#[derive(Debug, Clone)]
enum Op {
    Record(usize, u64),
    Remove(usize),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0..POOL.len(), 0u64..100).prop_map(|(i, n)| Op::Record(i, n)),
        2 => (0..POOL.len()).prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

fn apply(history: &mut SearchHistory, op: &Op) {
    match op {
        Op::Record(i, n) => {
            history.record(POOL[*i], *n).expect("pool keywords are never blank");
        }
        Op::Remove(i) => {
            history.remove(POOL[*i]);
        }
        Op::Clear => history.clear(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn history_invariants_hold_after_any_sequence(
        ops in prop::collection::vec(arb_op(), 0..60),
        max_items in 1usize..8,
    ) {
        let mut history = SearchHistory::new(MemoryStorage::new()).with_max_items(max_items);
        history.load();

        for op in &ops {
            apply(&mut history, op);

            let records = history.records();
            prop_assert!(records.len() <= max_items);

            let mut identities: Vec<String> =
                records.iter().map(|r| keyword_identity(&r.keyword)).collect();
            identities.sort();
            identities.dedup();
            prop_assert_eq!(identities.len(), records.len(), "duplicate identity in {:?}", records);

            for pair in records.windows(2) {
                prop_assert!(pair[0].last_searched >= pair[1].last_searched);
            }
            for record in records {
                prop_assert!(record.search_count >= 1);
                prop_assert!(record.first_searched <= record.last_searched);
                prop_assert_eq!(record.keyword.trim(), record.keyword.as_str());
            }
        }
    }

    #[test]
    fn counts_match_model_without_eviction(ops in prop::collection::vec(arb_op(), 0..80)) {
        let mut history = SearchHistory::open(MemoryStorage::new());
        let mut model: HashMap<String, (u32, u64)> = HashMap::new();

        for op in &ops {
            apply(&mut history, op);
            match op {
                Op::Record(i, n) => {
                    let entry = model.entry(keyword_identity(POOL[*i])).or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 = *n;
                }
                Op::Remove(i) => {
                    model.remove(&keyword_identity(POOL[*i]));
                }
                Op::Clear => model.clear(),
            }
        }

        let actual: HashMap<String, (u32, u64)> = history
            .records()
            .iter()
            .map(|r| (keyword_identity(&r.keyword), (r.search_count, r.last_result_count)))
            .collect();
        prop_assert_eq!(&actual, &model);

        let stats = history.stats();
        let total: u64 = history.records().iter().map(|r| u64::from(r.search_count)).sum();
        prop_assert_eq!(stats.total_searches, total);
        prop_assert_eq!(stats.unique_keywords, history.len());
        prop_assert_eq!(stats.successful_searches + stats.failed_searches, history.len());
        let hits = model.values().filter(|(_, last)| *last > 0).count();
        prop_assert_eq!(stats.successful_searches, hits);
    }

    #[test]
    fn order_is_move_to_front_with_eviction(
        picks in prop::collection::vec(0..POOL.len(), 1..40),
        max_items in 1usize..5,
    ) {
        let mut history = SearchHistory::new(MemoryStorage::new()).with_max_items(max_items);
        let mut model: Vec<String> = Vec::new();

        for &i in &picks {
            history.record(POOL[i], 1).unwrap();

            let identity = keyword_identity(POOL[i]);
            model.retain(|k| *k != identity);
            model.insert(0, identity);
            model.truncate(max_items);
        }

        let actual: Vec<String> =
            history.records().iter().map(|r| keyword_identity(&r.keyword)).collect();
        prop_assert_eq!(actual, model);
        prop_assert_eq!(
            history.stats().last_search.map(|k| keyword_identity(&k)),
            Some(keyword_identity(POOL[*picks.last().unwrap()]))
        );
    }

    #[test]
    fn suggestions_are_substrings_in_history_order(
        picks in prop::collection::vec(0..POOL.len(), 0..20),
        query in "[a-zA-Z]{2,4}",
        limit in 0usize..6,
    ) {
        let mut history = SearchHistory::open(MemoryStorage::new());
        for &i in &picks {
            history.record(POOL[i], 1).unwrap();
        }

        let suggestions = history.suggestions(&query, limit);
        prop_assert!(suggestions.len() <= limit);

        let needle = query.to_lowercase();
        let order: Vec<&str> = history.records().iter().map(|r| r.keyword.as_str()).collect();
        let mut last_index = None;
        for suggestion in &suggestions {
            prop_assert!(suggestion.to_lowercase().contains(&needle));
            prop_assert_ne!(keyword_identity(suggestion), keyword_identity(&query));
            let index = order.iter().position(|k| k == suggestion);
            prop_assert!(index.is_some());
            prop_assert!(index > last_index);
            last_index = index;
        }
    }
}
