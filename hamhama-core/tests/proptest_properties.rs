use std::collections::BTreeSet;

use hamhama_core::{clean_ingredient_name, normalize_unit, reconcile_classifications};
use proptest::prelude::*;
use proptest::test_runner::Config;
use serde_json::{json, Value};

fn label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("DINNER".to_string()),
        Just(" dessert ".to_string()),
        Just("Side_Dish".to_string()),
        Just("UNKNOWN".to_string()),
        "[A-Za-z_ ]{0,12}",
    ]
}

fn item() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (0_i64..60, label()).prop_map(|(id, label)| json!({"recipe_id": id, "category": label})),
        1 => (0_i64..60).prop_map(|id| json!({"recipe_id": id})),
        1 => "[a-z]{0,8}".prop_map(Value::from),
        1 => (0_i64..60).prop_map(|id| json!({"recipe_id": id.to_string(), "category": "SOUP"})),
    ]
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn cleaned_names_are_fixed_points(raw in any::<String>()) {
        let once = clean_ingredient_name(&raw);
        prop_assert_eq!(clean_ingredient_name(&once), once);
    }

    #[test]
    fn cleaned_ingredient_lines_are_fixed_points(
        raw in "[0-9½¼ ]{0,4}(cups?|Tbsp\\.?|large|small|whole|\\([^)]{0,8}\\)| ){0,3}[a-z ,'\"-]{0,20}"
    ) {
        let once = clean_ingredient_name(&raw);
        prop_assert_eq!(clean_ingredient_name(&once), once);
    }

    #[test]
    fn unit_lookup_ignores_case(raw in "[A-Za-z.#]{0,12}") {
        prop_assert_eq!(
            normalize_unit(Some(raw.to_uppercase().as_str())),
            normalize_unit(Some(raw.to_lowercase().as_str()))
        );
    }

    #[test]
    fn reconciled_keys_match_expected_ids(
        expected in prop::collection::btree_set(0_i64..50, 0..20),
        items in prop::collection::vec(item(), 0..40),
    ) {
        let text = json!({"classifications": items}).to_string();
        let result = reconcile_classifications(&text, &expected).unwrap();

        let keys: BTreeSet<i64> = result.labels.keys().copied().collect();
        prop_assert_eq!(&keys, &expected);
        prop_assert_eq!(result.valid + result.unknown, expected.len());
        prop_assert!(result.coerced <= result.unknown);
    }
}
