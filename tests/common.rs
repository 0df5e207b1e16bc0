//! Common test utilities for building condition sets, snapshots and flows.
use bunki::flow::{BlockKind, FlowEdge, FlowNode, PushMapping, PushToIoTBlockConfig};
use bunki::prelude::*;
use serde_json::json;

/// Shorthand for a literal condition.
#[allow(dead_code)]
pub fn cond(
    index: u32,
    source_type: SourceType,
    source: &str,
    operator: &str,
    value: serde_json::Value,
) -> AtomicCondition {
    AtomicCondition::new(index, source_type, source, operator, value)
}

/// `temperature > 20` and `temperature < 30`.
#[allow(dead_code)]
pub fn temperature_window(grouping: &str) -> IfBlockConfig {
    IfBlockConfig::new(vec![
        cond(1, SourceType::Tag, "temperature", ">", json!("20")),
        cond(2, SourceType::Tag, "temperature", "<", json!("30")),
    ])
    .with_grouping(grouping)
}

#[allow(dead_code)]
pub fn temperature_env(temperature: f64) -> TypedEnvironment {
    TypedEnvironment::new().with_tag("temperature", temperature, ValueType::Number)
}

/// Three numeric flags `a`, `b`, `c` compared `= 1`; pass `true` to make a flag hold.
#[allow(dead_code)]
pub fn three_flags(grouping: &str) -> IfBlockConfig {
    IfBlockConfig::new(vec![
        cond(1, SourceType::Tag, "a", "=", json!(1)),
        cond(2, SourceType::Tag, "b", "=", json!(1)),
        cond(3, SourceType::Tag, "c", "=", json!(1)),
    ])
    .with_grouping(grouping)
}

#[allow(dead_code)]
pub fn flags_env(a: bool, b: bool, c: bool) -> TypedEnvironment {
    let flag = |on: bool| if on { 1.0 } else { 0.0 };
    TypedEnvironment::new()
        .with_tag("a", flag(a), ValueType::Number)
        .with_tag("b", flag(b), ValueType::Number)
        .with_tag("c", flag(c), ValueType::Number)
}

/// Compiles with defaults and evaluates, panicking on any error.
#[allow(dead_code)]
pub fn eval_bool(config: &IfBlockConfig, env: &TypedEnvironment) -> bool {
    Evaluator::from_config(config)
        .expect("config should compile")
        .eval(env)
        .expect("evaluation should succeed")
        .value
}

/// Compiles and evaluates, returning the error kind of the first failure.
#[allow(dead_code)]
pub fn eval_error(config: &IfBlockConfig, env: &TypedEnvironment) -> ErrorKind {
    let outcome = evaluate(config, env);
    assert!(!outcome.ok, "expected a failure, got {:?}", outcome);
    outcome.error.expect("failed outcome carries an error kind")
}

/// The If block as the editor persists it: position-ordered, opaque ids, no indices.
#[allow(dead_code)]
pub const EDITOR_IF_JSON: &str = r#"{
    "conditions": [
        {
            "id": "cond_1718000000001",
            "source": "temperature",
            "sourceType": "tag",
            "operator": ">",
            "value": "20",
            "valueType": "literal"
        },
        {
            "id": "cond_1718000000002",
            "source": "status",
            "sourceType": "tag",
            "operator": "=",
            "value": "running",
            "valueType": "literal"
        }
    ],
    "grouping": "",
    "logicOperator": "AND"
}"#;

/// Start -> If(temperature > 20) -> true: End, false: PushToIoT.
#[allow(dead_code)]
pub fn branching_flow() -> Flow {
    let if_config = IfBlockConfig::new(vec![cond(
        1,
        SourceType::Tag,
        "temperature",
        ">",
        json!(20),
    )]);
    let push_config = PushToIoTBlockConfig {
        mappings: vec![PushMapping {
            id: "mapping_1".to_string(),
            source_type: SourceType::Tag,
            source_id: "temperature".to_string(),
            key_name: "temp".to_string(),
        }],
    };

    let mut flow = Flow::new("flow-1", "Temperature watch");
    flow.nodes.push(
        FlowNode::new("check", BlockKind::If, "Too hot?")
            .with_config(&if_config)
            .expect("if config serializes"),
    );
    flow.nodes.push(FlowNode::new("done", BlockKind::End, "End"));
    flow.nodes.push(
        FlowNode::new("report", BlockKind::PushToIoT, "Report")
            .with_config(&push_config)
            .expect("push config serializes"),
    );
    flow.edges = vec![
        FlowEdge::new("e1", "start", "check"),
        FlowEdge::new("e2", "check", "done").from_handle("true"),
        FlowEdge::new("e3", "check", "report").from_handle("false"),
    ];
    flow
}

/// A snapshot with one numeric tag and one string tag.
#[allow(dead_code)]
pub fn line_snapshot(temperature: f64) -> DataSourceSnapshot {
    serde_json::from_value(json!({
        "id": "ds-1",
        "name": "Line",
        "tags": [
            { "id": "tag-1", "name": "temperature", "type": "number", "value": temperature },
            { "id": "tag-2", "name": "status", "type": "string", "value": "running" }
        ],
        "fields": []
    }))
    .expect("snapshot fixture is valid")
}
