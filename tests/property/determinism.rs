//! Property-based tests for determinism guarantees

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use sweepgen::expand::{expand, Generator};
use sweepgen::fingerprint::fingerprint;
use sweepgen::mutation::{apply, MutationPath};
use sweepgen::naming::config_file_name;

fn nested_document() -> impl Strategy<Value = BTreeMap<String, BTreeMap<String, i64>>> {
    prop::collection::btree_map(
        "[a-z]{1,6}",
        prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 1..5),
        1..5,
    )
}

fn to_value(doc: &BTreeMap<String, BTreeMap<String, i64>>) -> Value {
    serde_json::to_value(doc).unwrap()
}

/// Test that fingerprints ignore mapping key order
#[test]
fn test_fingerprint_key_order_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..10),
            |entries| {
                let forward: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{:?}: {}", k, v))
                    .collect();
                let mut backward = forward.clone();
                backward.reverse();

                let a: Value = serde_json::from_str(&format!("{{{}}}", forward.join(", "))).unwrap();
                let b: Value =
                    serde_json::from_str(&format!("{{{}}}", backward.join(", "))).unwrap();

                assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
                Ok(())
            },
        )
        .unwrap();
}

/// Test that distinct documents get distinct fingerprints
#[test]
fn test_fingerprint_distinguishes_documents_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<i64>(), any::<i64>()), |(x, y)| {
            let a = fingerprint(&json!({"x": x})).unwrap();
            let b = fingerprint(&json!({"x": y})).unwrap();
            if x == y {
                assert_eq!(a, b);
            } else {
                // Collisions are possible in theory only
                prop_assume!(a != b);
            }
            Ok(())
        })
        .unwrap();
}

proptest! {
    /// Expanded integer lists are the sorted distinct union of every generator's values
    #[test]
    fn expansion_is_sorted_union(
        lists in prop::collection::vec(prop::collection::vec(-1000i64..1000, 1..8), 1..4)
    ) {
        let generators: Vec<Generator> = lists
            .iter()
            .map(|l| Generator::List { values: l.iter().map(|n| json!(n)).collect() })
            .collect();
        let set = expand(&generators).unwrap();

        let expected: Vec<Value> = lists
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<i64>>()
            .into_iter()
            .map(|n| json!(n))
            .collect();
        prop_assert_eq!(set.values(), expected.as_slice());
        prop_assert_eq!(set.generated().len(), lists.iter().map(Vec::len).sum::<usize>());
    }

    /// Unorderable values keep generated order, duplicates included
    #[test]
    fn unordered_values_keep_generated_order(keys in prop::collection::vec("[a-z]{1,4}", 1..6)) {
        let values: Vec<Value> = keys
            .iter()
            .map(|k| {
                let mut map = Map::new();
                map.insert(k.clone(), json!(1));
                Value::Object(map)
            })
            .collect();
        let set = expand(&[Generator::List { values: values.clone() }]).unwrap();
        prop_assert_eq!(set.values(), values.as_slice());
    }

    /// Applying a mutation changes exactly the addressed leaf
    #[test]
    fn mutation_changes_only_target(
        doc in nested_document(),
        outer_pick in any::<prop::sample::Index>(),
        inner_pick in any::<prop::sample::Index>(),
        replacement in any::<i64>(),
    ) {
        let (outer, inner_map) = outer_pick.get(&doc.iter().collect::<Vec<_>>()).clone();
        let inner = inner_pick.get(&inner_map.keys().collect::<Vec<_>>()).to_string();
        let path = MutationPath::parse(&format!("{}.{}", outer, inner)).unwrap();

        let base = to_value(&doc);
        let mutated = apply(&base, &path, json!(replacement)).unwrap();
        prop_assert_eq!(path.get(&mutated), Some(&json!(replacement)));

        let mut expected = doc.clone();
        expected.get_mut(outer.as_str()).unwrap().insert(inner.clone(), replacement);
        prop_assert_eq!(mutated, to_value(&expected));
        // Input untouched
        prop_assert_eq!(base, to_value(&doc));
    }

    /// Adding a new terminal key leaves every existing entry alone
    #[test]
    fn mutation_inserts_missing_terminal_key(doc in nested_document(), value in any::<bool>()) {
        let base = to_value(&doc);
        let outer = doc.keys().next().unwrap().clone();
        // Generated keys never contain digits
        let path = MutationPath::parse(&format!("{}.k0", outer)).unwrap();
        let mutated = apply(&base, &path, json!(value)).unwrap();

        let mut expected: Map<String, Value> = base.as_object().unwrap().clone();
        expected
            .get_mut(&outer)
            .unwrap()
            .as_object_mut()
            .unwrap()
            .insert("k0".to_string(), json!(value));
        prop_assert_eq!(mutated, Value::Object(expected));
    }

    /// File names are stable and always split into four underscore-separated fields
    #[test]
    fn config_file_names_are_deterministic(
        base in "[a-z_]{1,10}",
        sweep in "[a-z_]{1,10}",
        ordinal in 0usize..200,
        label in "[a-z_]{1,10}",
    ) {
        let value = json!(label);
        let name = config_file_name(&base, &sweep, ordinal, &value);
        prop_assert_eq!(&name, &config_file_name(&base, &sweep, ordinal, &value));
        prop_assert!(name.ends_with(".json"));
        prop_assert_eq!(name.trim_end_matches(".json").split('_').count(), 4);
    }
}
