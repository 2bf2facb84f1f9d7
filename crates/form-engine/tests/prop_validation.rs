//! Property-based tests for validation and visibility using proptest.
//!
//! These verify invariants that should hold for any answer, not just the
//! specific examples in `validation_tests.rs`.

use form_engine::field::{FieldDefinition, FieldKind, NumberRules, SelectionRules, TextRules};
use form_engine::{validate_field, Condition, FormData, Operator, VisibilityRule};
use proptest::prelude::*;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|n| json!(n)),
        ".{0,12}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => arb_scalar(),
        1 => prop::collection::vec(arb_scalar(), 0..4).prop_map(Value::Array),
    ]
}

fn arb_field() -> impl Strategy<Value = FieldDefinition> {
    let kind = prop_oneof![
        Just(FieldKind::Email),
        (proptest::option::of(-10.0f64..10.0), proptest::option::of(-10.0f64..10.0))
            .prop_map(|(min, max)| FieldKind::Number(NumberRules { min, max })),
        (proptest::option::of(0usize..5), proptest::option::of(0usize..8)).prop_map(
            |(min_length, max_length)| FieldKind::Text(TextRules {
                min_length,
                max_length,
                ..TextRules::default()
            })
        ),
        (proptest::option::of(0usize..3), proptest::option::of(0usize..3)).prop_map(
            |(min_selection, max_selection)| FieldKind::Checkbox(SelectionRules {
                min_selection,
                max_selection,
            })
        ),
        Just(FieldKind::Select),
        Just(FieldKind::Divider),
    ];
    (kind, any::<bool>()).prop_map(|(kind, required)| {
        let field = FieldDefinition::new("f", "Field", kind);
        if required {
            field.required()
        } else {
            field
        }
    })
}

fn is_empty_answer(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig { max_global_rejects: 16384, ..ProptestConfig::default() })]

    #[test]
    fn validation_is_deterministic(field in arb_field(), value in arb_value()) {
        prop_assert_eq!(validate_field(&field, &value), validate_field(&field, &value));
    }

    #[test]
    fn required_empty_yields_exactly_one_message(field in arb_field(), value in arb_value()) {
        prop_assume!(field.required && is_empty_answer(&value));
        let errors = validate_field(&field, &value);
        prop_assert!(errors.len() <= 1);
        if !field.kind.is_structural() {
            prop_assert_eq!(errors, vec!["Field is required".to_string()]);
        }
    }

    #[test]
    fn optional_empty_is_always_valid(field in arb_field(), value in arb_value()) {
        prop_assume!(!field.required && is_empty_answer(&value));
        prop_assert!(validate_field(&field, &value).is_empty());
    }

    #[test]
    fn any_rule_is_the_disjunction_of_its_conditions(
        answer in arb_scalar(),
        targets in prop::collection::vec(arb_scalar(), 1..4),
    ) {
        let mut data = FormData::new();
        data.insert("x".into(), answer);
        let conditions: Vec<Condition> = targets
            .into_iter()
            .map(|target| Condition::new("x", Operator::Equals, target))
            .collect();

        let expected_any = conditions.iter().any(|c| c.evaluate(&data));
        let expected_all = conditions.iter().all(|c| c.evaluate(&data));
        prop_assert_eq!(VisibilityRule::any(conditions.clone()).evaluate(&data), expected_any);
        prop_assert_eq!(VisibilityRule::all(conditions).evaluate(&data), expected_all);
    }
}
