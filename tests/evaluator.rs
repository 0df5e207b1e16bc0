//! Tests for condition evaluation against typed snapshots.
mod common;
use common::*;
use bunki::prelude::*;
use serde_json::json;

#[test]
fn test_single_condition_with_empty_grouping() {
    let config = IfBlockConfig::new(vec![cond(
        1,
        SourceType::Tag,
        "temperature",
        ">",
        json!("20"),
    )])
    .with_grouping("");
    assert!(eval_bool(&config, &temperature_env(25.0)));
}

#[test]
fn test_explicit_and_within_window() {
    assert!(eval_bool(&temperature_window("1 AND 2"), &temperature_env(25.0)));
    assert!(!eval_bool(&temperature_window("1 AND 2"), &temperature_env(35.0)));
}

#[test]
fn test_grouping_referencing_missing_condition() {
    let kind = eval_error(&temperature_window("1 AND 2 AND 3"), &temperature_env(25.0));
    assert_eq!(kind, ErrorKind::UnknownIndexError);
}

#[test]
fn test_variable_string_inequality() {
    let config = IfBlockConfig::new(vec![cond(
        1,
        SourceType::Variable,
        "status",
        "=",
        json!("active"),
    )]);
    let env = TypedEnvironment::new().with_variable("status", "inactive", ValueType::String);
    assert!(!eval_bool(&config, &env));
}

#[test]
fn test_ordering_on_string_is_type_mismatch() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "status", "<", json!("b"))]);
    let env = TypedEnvironment::new().with_tag("status", "a", ValueType::String);
    assert_eq!(eval_error(&config, &env), ErrorKind::TypeMismatchError);
}

#[test]
fn test_or_group_with_false_first_leaf() {
    let config = three_flags("(1 AND 2) OR 3");
    let env = flags_env(false, true, true);
    for strategy in [EvaluationStrategy::Eager, EvaluationStrategy::ShortCircuit] {
        let evaluator = Evaluator::from_config(&config)
            .unwrap()
            .with_strategy(strategy);
        assert!(evaluator.eval(&env).unwrap().value);
    }
}

#[test]
fn test_empty_grouping_equals_and_of_all_conditions() {
    for a in [false, true] {
        for b in [false, true] {
            for c in [false, true] {
                let env = flags_env(a, b, c);
                assert_eq!(eval_bool(&three_flags(""), &env), a && b && c);
                assert_eq!(eval_bool(&three_flags(" \t"), &env), a && b && c);
            }
        }
    }
}

#[test]
fn test_or_operands_commute() {
    let pairs = [
        ("1 OR 2", "2 OR 1"),
        ("(1 AND 2) OR 3", "3 OR (1 AND 2)"),
        ("1 AND (2 OR 3)", "1 AND (3 OR 2)"),
    ];
    for a in [false, true] {
        for b in [false, true] {
            for c in [false, true] {
                let env = flags_env(a, b, c);
                for (left, right) in pairs {
                    assert_eq!(
                        eval_bool(&three_flags(left), &env),
                        eval_bool(&three_flags(right), &env),
                        "'{}' vs '{}'",
                        left,
                        right
                    );
                }
            }
        }
    }
}

#[test]
fn test_zero_conditions_is_vacuously_true() {
    let outcome = evaluate(&IfBlockConfig::default(), &TypedEnvironment::new());
    assert_eq!(outcome, EvaluationOutcome::success(true));
}

#[test]
fn test_unbalanced_paren_outcome() {
    let outcome = evaluate(&temperature_window("(1"), &temperature_env(25.0));
    assert!(!outcome.ok);
    assert_eq!(outcome.error, Some(ErrorKind::SyntaxError));
    assert!(outcome.detail.is_some());
}

#[test]
fn test_outcome_wire_shape() {
    let ok = serde_json::to_value(EvaluationOutcome::success(true)).unwrap();
    assert_eq!(ok, json!({"ok": true, "value": true}));

    let failed = evaluate(&temperature_window("5"), &temperature_env(25.0));
    let wire = serde_json::to_value(&failed).unwrap();
    assert_eq!(wire["ok"], json!(false));
    assert_eq!(wire["error"], json!("UnknownIndexError"));
    assert!(wire.get("value").is_none());
}

#[test]
fn test_unresolved_reference() {
    let kind = eval_error(&temperature_window(""), &TypedEnvironment::new());
    assert_eq!(kind, ErrorKind::UnresolvedReference);
}

#[test]
fn test_eager_reports_error_in_skippable_branch() {
    // Condition 3 cannot resolve; condition 1 alone already decides the OR.
    let config = IfBlockConfig::new(vec![
        cond(1, SourceType::Tag, "a", "=", json!(1)),
        cond(3, SourceType::Tag, "missing", "=", json!(1)),
    ])
    .with_grouping("1 OR 3");
    let env = flags_env(true, false, false);

    let eager = Evaluator::from_config(&config).unwrap();
    assert_eq!(
        eager.eval(&env).unwrap_err().kind(),
        ErrorKind::UnresolvedReference
    );

    let short = Evaluator::from_config(&config)
        .unwrap()
        .with_strategy(EvaluationStrategy::ShortCircuit);
    let result = short.eval(&env).unwrap();
    assert!(result.value);
    assert_eq!(result.trace.unwrap().evaluated_leaves(), 1);
}

#[test]
fn test_first_error_wins_left_to_right() {
    let config = IfBlockConfig::new(vec![
        cond(1, SourceType::Tag, "missing", "=", json!(1)),
        cond(2, SourceType::Tag, "s", "<", json!(1)),
    ]);
    let env = TypedEnvironment::new().with_tag("s", "x", ValueType::String);
    assert_eq!(eval_error(&config, &env), ErrorKind::UnresolvedReference);
}

#[test]
fn test_duplicate_leaf_references_agree() {
    let config = three_flags("1 AND 1 AND (2 OR 1)");
    assert!(eval_bool(&config, &flags_env(true, false, false)));
    assert!(!eval_bool(&config, &flags_env(false, true, false)));
}

#[test]
fn test_reason_mentions_observed_values() {
    let evaluator = Evaluator::from_config(&temperature_window("")).unwrap();
    let result = evaluator.eval(&temperature_env(25.0)).unwrap();
    assert!(result.reason.contains("#1 tag temperature (was 25) > \"20\""));
    assert!(result.reason.contains(" AND "));
}

#[test]
fn test_nan_only_satisfies_not_equal() {
    let env = TypedEnvironment::new().with_tag("x", f64::NAN, ValueType::Number);
    for (op, expected) in [("=", false), ("!=", true), ("<", false), (">=", false)] {
        let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "x", op, json!(1))]);
        assert_eq!(eval_bool(&config, &env), expected, "NaN {} 1", op);
    }
}

#[test]
fn test_non_numeric_literal_for_ordering() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "t", "<", json!("cold"))]);
    let env = TypedEnvironment::new().with_tag("t", 3.0, ValueType::Number);
    assert_eq!(eval_error(&config, &env), ErrorKind::InvalidLiteralError);
}

#[test]
fn test_string_equality_is_case_sensitive() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "s", "is", json!("Running"))]);
    let env = TypedEnvironment::new().with_tag("s", "running", ValueType::String);
    assert!(!eval_bool(&config, &env));
}

#[test]
fn test_contains_on_strings_and_lists() {
    let substring = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "s", "contains", json!("run"))]);
    let env = TypedEnvironment::new().with_tag("s", "running", ValueType::String);
    assert!(eval_bool(&substring, &env));

    let list_env = TypedEnvironment::new().with_field(
        "ops",
        Value::from(json!(["alice", {"id": 2}])),
        ValueType::List,
    );
    let member = IfBlockConfig::new(vec![cond(1, SourceType::Field, "ops", "contains", json!("alice"))]);
    assert!(eval_bool(&member, &list_env));

    let structured = IfBlockConfig::new(vec![cond(
        1,
        SourceType::Field,
        "ops",
        "contains",
        json!("{\"id\": 2}"),
    )]);
    assert!(eval_bool(&structured, &list_env));

    let absent = IfBlockConfig::new(vec![cond(1, SourceType::Field, "ops", "contains", json!("carol"))]);
    assert!(!eval_bool(&absent, &list_env));
}

#[test]
fn test_emptiness() {
    let env = TypedEnvironment::new()
        .with_field("blank", "", ValueType::String)
        .with_field("none", Value::Null, ValueType::List)
        .with_field("map", Value::from(json!({})), ValueType::Map)
        .with_field("list", Value::from(json!([1])), ValueType::List);

    let check = |source: &str, op: &str| {
        let config = IfBlockConfig::new(vec![cond(1, SourceType::Field, source, op, json!(null))]);
        eval_bool(&config, &env)
    };
    assert!(check("blank", "empty"));
    assert!(check("none", "empty"));
    assert!(check("map", "empty"));
    assert!(check("list", "not empty"));
    assert!(!check("list", "empty"));
}

#[test]
fn test_empty_on_number_is_type_mismatch() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "t", "empty", json!(null))]);
    let env = TypedEnvironment::new().with_tag("t", 1.0, ValueType::Number);
    assert_eq!(eval_error(&config, &env), ErrorKind::TypeMismatchError);
}

#[test]
fn test_list_deep_equality() {
    let env = TypedEnvironment::new().with_field("l", Value::from(json!([1, [2, 3]])), ValueType::List);
    let equal = IfBlockConfig::new(vec![cond(1, SourceType::Field, "l", "=", json!("[1, [2, 3]]"))]);
    let unequal = IfBlockConfig::new(vec![cond(1, SourceType::Field, "l", "!=", json!([1, [2, 4]]))]);
    assert!(eval_bool(&equal, &env));
    assert!(eval_bool(&unequal, &env));
}

#[test]
fn test_compare_against_reference() {
    let condition = cond(1, SourceType::Tag, "temperature", ">", json!(null))
        .against_reference(SourceType::Variable, "limit");
    let config = IfBlockConfig::new(vec![condition]);

    let env = temperature_env(25.0).with_variable("limit", 20.0, ValueType::Number);
    assert!(eval_bool(&config, &env));

    let string_limit = temperature_env(25.0).with_variable("limit", "20", ValueType::String);
    assert_eq!(eval_error(&config, &string_limit), ErrorKind::TypeMismatchError);
}

#[test]
fn test_closure_resolver() {
    let resolver = |source_type: SourceType, source: &str| match (source_type, source) {
        (SourceType::Tag, "temperature") => Some(Resolved::new(25.0, ValueType::Number)),
        _ => None,
    };
    let evaluator = Evaluator::from_config(&temperature_window("")).unwrap();
    assert!(evaluator.eval(&resolver).unwrap().value);
}

#[test]
fn test_eval_many_keeps_input_order() {
    let evaluator = Evaluator::from_config(&temperature_window("1 AND 2")).unwrap();
    let snapshots: Vec<TypedEnvironment> = [10.0, 25.0, 29.0, 31.0, 21.0]
        .into_iter()
        .map(temperature_env)
        .collect();

    let values: Vec<bool> = evaluator
        .eval_many(&snapshots)
        .into_iter()
        .map(|result| result.unwrap().value)
        .collect();
    assert_eq!(values, vec![false, true, true, false, true]);
}
