//! Property tests for the deep-merge rules
//!
//! These tests verify, over generated YAML documents:
//! - Merging is idempotent and empty overrides are the identity
//! - Every override key lands in the result, with non-mapping values intact
//! - Keys only the base holds survive the merge unchanged

use emmental::config::deep_merge;
use proptest::prelude::*;
use serde_yaml_ng::{Mapping, Value};

fn yaml_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z]{1,8}".prop_map(Value::from),
    ]
}

fn yaml_mapping_of(
    inner: impl Strategy<Value = Value> + 'static,
) -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(|entries| {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (Value::from(key), value))
                .collect::<Mapping>(),
        )
    })
}

fn yaml_value() -> impl Strategy<Value = Value> {
    yaml_scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            yaml_mapping_of(inner),
        ]
    })
}

fn yaml_mapping() -> impl Strategy<Value = Value> {
    yaml_mapping_of(yaml_value())
}

proptest! {
    #[test]
    fn prop_merge_twice_equals_merge_once(base in yaml_mapping(), overrides in yaml_mapping()) {
        let mut once = base;
        deep_merge(&mut once, &overrides);

        let mut twice = once.clone();
        deep_merge(&mut twice, &overrides);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_empty_override_is_identity(base in yaml_mapping()) {
        let mut merged = base.clone();
        deep_merge(&mut merged, &Value::Mapping(Mapping::new()));

        prop_assert_eq!(merged, base);
    }

    #[test]
    fn prop_merge_onto_empty_adopts_the_override(overrides in yaml_mapping()) {
        let mut merged = Value::Mapping(Mapping::new());
        deep_merge(&mut merged, &overrides);

        prop_assert_eq!(merged, overrides);
    }

    #[test]
    fn prop_every_override_key_lands_in_the_result(
        base in yaml_mapping(),
        overrides in yaml_mapping(),
    ) {
        let mut merged = base;
        deep_merge(&mut merged, &overrides);

        let merged_map = merged.as_mapping().unwrap();
        for (key, override_value) in overrides.as_mapping().unwrap() {
            prop_assert!(merged_map.contains_key(key));
            // Non-mapping override values must come through verbatim
            if !override_value.is_mapping() {
                prop_assert_eq!(merged_map.get(key), Some(override_value));
            }
        }
    }

    #[test]
    fn prop_base_only_keys_survive_unchanged(
        base in yaml_mapping(),
        overrides in yaml_mapping(),
    ) {
        let mut merged = base.clone();
        deep_merge(&mut merged, &overrides);

        let base_map = base.as_mapping().unwrap();
        let merged_map = merged.as_mapping().unwrap();
        let override_map = overrides.as_mapping().unwrap();

        for (key, base_value) in base_map {
            if !override_map.contains_key(key) {
                prop_assert_eq!(merged_map.get(key), Some(base_value));
            }
        }
    }
}
