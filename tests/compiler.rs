//! Tests for grouping parsing, index validation and save-time checks.
mod common;
use bunki::compiler::DEFAULT_MAX_TERMS;
use bunki::condition::Operand;
use common::*;
use bunki::prelude::*;
use serde_json::json;

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = parse_grouping("1 OR 2 AND 3").unwrap();
    assert_eq!(
        expr,
        Expression::Or(
            Box::new(Expression::Condition(1)),
            Box::new(Expression::And(
                Box::new(Expression::Condition(2)),
                Box::new(Expression::Condition(3)),
            )),
        )
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        parse_grouping("(1 and 2) Or 3").unwrap(),
        parse_grouping("(1 AND 2) OR 3").unwrap()
    );
}

#[test]
fn test_round_trip_yields_identical_tree() {
    for raw in [
        "1",
        "1 AND 2 AND 3",
        "(1 AND 2) OR 3",
        "1 AND (2 OR 3)",
        "1 OR (2 OR 3)",
        "((1)) AND ((2 OR 3) AND 4)",
        "1 AND 1 OR 2",
    ] {
        let tree = parse_grouping(raw).unwrap();
        let reparsed = parse_grouping(&tree.to_string()).unwrap();
        assert_eq!(tree, reparsed, "round trip of '{}' via '{}'", raw, tree);
    }
}

#[test]
fn test_canonical_text_drops_redundant_parens() {
    let tree = parse_grouping("((1 AND 2)) OR (3)").unwrap();
    assert_eq!(tree.to_string(), "1 AND 2 OR 3");
}

#[test]
fn test_syntax_errors() {
    for raw in ["(1", "1)", "()", "1 AND", "OR 2", "1 2", "1 & 2", "1 NOT 2", "1a"] {
        let err = parse_grouping(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SyntaxError, "'{}' -> {}", raw, err);
    }
}

#[test]
fn test_nesting_limit() {
    let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    let err = parse_grouping(&deep).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);

    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "t", ">", json!(1))])
        .with_grouping(&deep);
    let compiled = Compiler::builder(config).with_max_depth(128).build().compile();
    assert!(compiled.is_ok());
}

#[test]
fn test_unknown_index_is_rejected() {
    let config = temperature_window("5");
    let err = Compiler::builder(config).build().compile().unwrap_err();
    match err {
        ConditionError::UnknownIndex { index, available } => {
            assert_eq!(index, 5);
            assert_eq!(available, vec![1, 2]);
        }
        other => panic!("Expected UnknownIndex, got {:?}", other),
    }
}

#[test]
fn test_syntax_is_reported_before_unknown_index() {
    let err = Compiler::builder(temperature_window("(9"))
        .build()
        .compile()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_syntax_offset_counts_leading_whitespace() {
    let err = Compiler::builder(temperature_window("  (1"))
        .build()
        .compile()
        .unwrap_err();
    match err {
        ConditionError::Syntax { offset, .. } => assert_eq!(offset, 4),
        other => panic!("Expected Syntax, got {:?}", other),
    }
}

#[test]
fn test_syntax_is_reported_before_index_config_errors() {
    let config = IfBlockConfig::new(vec![
        cond(1, SourceType::Tag, "a", "=", json!(1)),
        cond(1, SourceType::Tag, "b", "=", json!(1)),
    ])
    .with_grouping("(1");
    let err = Compiler::builder(config).build().compile().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_long_grouping_chain_is_rejected() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "t", ">", json!(1))]);
    let env = TypedEnvironment::new().with_tag("t", 5.0, ValueType::Number);

    let at_limit = config
        .clone()
        .with_grouping(&vec!["1"; DEFAULT_MAX_TERMS].join(" AND "));
    assert!(eval_bool(&at_limit, &env));

    for joiner in [" AND ", " OR "] {
        let long = config.clone().with_grouping(&vec!["1"; 5_000].join(joiner));
        assert_eq!(eval_error(&long, &env), ErrorKind::SyntaxError);
    }
}

#[test]
fn test_long_implicit_chain_is_config_error() {
    let conditions = |n: u32| {
        IfBlockConfig::new(
            (1..=n)
                .map(|i| cond(i, SourceType::Tag, "t", ">", json!(1)))
                .collect(),
        )
    };
    let env = TypedEnvironment::new().with_tag("t", 5.0, ValueType::Number);

    assert!(eval_bool(&conditions(DEFAULT_MAX_TERMS as u32), &env));
    assert_eq!(
        eval_error(&conditions(50_000), &env),
        ErrorKind::ConfigError
    );

    let err = Compiler::builder(conditions(10))
        .with_max_terms(4)
        .build()
        .compile()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);
}

#[test]
fn test_empty_grouping_is_ascending_and_chain() {
    let config = IfBlockConfig::new(vec![
        cond(3, SourceType::Tag, "c", "=", json!(1)),
        cond(1, SourceType::Tag, "a", "=", json!(1)),
        cond(2, SourceType::Tag, "b", "=", json!(1)),
    ])
    .with_grouping("   ");
    let compiled = Compiler::builder(config).build().compile().unwrap();
    assert_eq!(compiled.canonical_grouping(), "1 AND 2 AND 3");
}

#[test]
fn test_logic_operator_or_builds_or_chain() {
    let mut config = three_flags("");
    config.logic_operator = Some(LogicOperator::Or);
    let compiled = Compiler::builder(config).build().compile().unwrap();
    assert_eq!(compiled.canonical_grouping(), "1 OR 2 OR 3");
}

#[test]
fn test_zero_conditions_compile_to_no_tree() {
    let compiled = Compiler::builder(IfBlockConfig::default())
        .build()
        .compile()
        .unwrap();
    assert!(compiled.expression.is_none());
    assert!(compiled.conditions.is_empty());
}

#[test]
fn test_duplicate_and_zero_indices_are_config_errors() {
    let duplicate = IfBlockConfig::new(vec![
        cond(1, SourceType::Tag, "a", "=", json!(1)),
        cond(1, SourceType::Tag, "b", "=", json!(1)),
    ]);
    let zero = IfBlockConfig::new(vec![cond(0, SourceType::Tag, "a", "=", json!(1))]);

    for config in [duplicate, zero] {
        let err = Compiler::builder(config).build().compile().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigError);
    }
}

#[test]
fn test_unknown_operator_is_config_error() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "a", "~=", json!(1))]);
    let err = Compiler::builder(config).build().compile().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);
}

#[test]
fn test_compiler_with_operator_alias() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "a", "above", json!(1))]);
    let compiled = Compiler::builder(config)
        .with_operator_alias("above", ">")
        .build()
        .compile()
        .expect("Compilation should succeed with an operator alias");
    assert_eq!(compiled.conditions[&1].operator, Operator::GreaterThan);
}

#[test]
fn test_alias_to_unknown_operator_is_skipped() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "a", "above", json!(1))]);
    let err = Compiler::builder(config)
        .with_operator_alias("above", "~~")
        .build()
        .compile()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);
}

#[test]
fn test_editor_labels_are_accepted() {
    let config = IfBlockConfig::new(vec![
        cond(1, SourceType::Tag, "a", "greater than", json!(1)),
        cond(2, SourceType::Tag, "s", "is not", json!("x")),
    ]);
    let compiled = Compiler::builder(config).build().compile().unwrap();
    assert_eq!(compiled.conditions[&1].operator, Operator::GreaterThan);
    assert_eq!(compiled.conditions[&2].operator, Operator::IsNot);
}

#[test]
fn test_catalog_rejects_ordering_on_string() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "status", "<", json!(3))]);
    let catalog = Catalog::new().with(SourceType::Tag, "status", ValueType::String);
    let err = Compiler::builder(config)
        .with_catalog(catalog)
        .build()
        .compile()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatchError);
}

#[test]
fn test_catalog_rejects_bad_numeric_literal() {
    let config = IfBlockConfig::new(vec![cond(
        1,
        SourceType::Tag,
        "temperature",
        ">",
        json!("warm"),
    )]);
    let catalog = Catalog::new().with(SourceType::Tag, "temperature", ValueType::Number);
    let err = Compiler::builder(config)
        .with_catalog(catalog)
        .build()
        .compile()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLiteralError);
}

#[test]
fn test_catalog_skips_unknown_sources() {
    let config = IfBlockConfig::new(vec![cond(1, SourceType::Tag, "elsewhere", "<", json!(3))]);
    let compiled = Compiler::builder(config)
        .with_catalog(Catalog::new())
        .build()
        .compile();
    assert!(compiled.is_ok());
}

#[test]
fn test_reference_operand_defaults_to_source_type() {
    let mut condition = cond(1, SourceType::Tag, "temperature", ">", json!(null));
    condition.value_type = Some(bunki::condition::OperandKind::Reference);
    condition.value_ref = Some("limit".to_string());

    let compiled = Compiler::builder(IfBlockConfig::new(vec![condition]))
        .build()
        .compile()
        .unwrap();
    assert_eq!(
        compiled.conditions[&1].operand,
        Operand::Reference {
            source_type: SourceType::Tag,
            source: "limit".to_string(),
        }
    );
}

#[test]
fn test_reference_without_value_ref_is_config_error() {
    let mut condition = cond(1, SourceType::Tag, "temperature", ">", json!(null));
    condition.value_type = Some(bunki::condition::OperandKind::Reference);
    let err = Compiler::builder(IfBlockConfig::new(vec![condition]))
        .build()
        .compile()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigError);
}
