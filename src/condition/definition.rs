use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a condition reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Field,
    Tag,
    Variable,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceType::Field => "field",
            SourceType::Tag => "tag",
            SourceType::Variable => "variable",
        };
        f.write_str(name)
    }
}

/// Whether a condition compares against its literal `value` or another reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperandKind {
    Literal,
    Reference,
}

/// How conditions combine when no grouping expression is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogicOperator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// One numbered comparison inside an If block, exactly as the editor persists it.
///
/// `index` may be omitted; the condition then takes its 1-based list position.
/// `operator` stays a string here so that custom spellings can be mapped by the
/// compiler; the compiled form carries a closed [`super::Operator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomicCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub source_type: SourceType,
    #[serde(alias = "sourceRef")]
    pub source: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<OperandKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_ref_type: Option<SourceType>,
}

impl AtomicCondition {
    /// A literal comparison, the shape most conditions take.
    pub fn new(
        index: u32,
        source_type: SourceType,
        source: &str,
        operator: &str,
        value: serde_json::Value,
    ) -> Self {
        Self {
            id: None,
            index: Some(index),
            source_type,
            source: source.to_string(),
            operator: operator.to_string(),
            value,
            value_type: None,
            value_ref: None,
            value_ref_type: None,
        }
    }

    /// Compares against another reference instead of a literal.
    pub fn against_reference(mut self, source_type: SourceType, source: &str) -> Self {
        self.value_type = Some(OperandKind::Reference);
        self.value_ref = Some(source.to_string());
        self.value_ref_type = Some(source_type);
        self.value = serde_json::Value::Null;
        self
    }

    pub fn operand_kind(&self) -> OperandKind {
        self.value_type.unwrap_or(OperandKind::Literal)
    }
}

/// The persisted configuration of an If block: `{ conditions, grouping?, logicOperator? }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfBlockConfig {
    #[serde(default)]
    pub conditions: Vec<AtomicCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_operator: Option<LogicOperator>,
}

impl IfBlockConfig {
    pub fn new(conditions: Vec<AtomicCondition>) -> Self {
        Self {
            conditions,
            grouping: None,
            logic_operator: None,
        }
    }

    pub fn with_grouping(mut self, grouping: &str) -> Self {
        self.grouping = Some(grouping.to_string());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The grouping text, or `None` when it is absent, empty or all whitespace.
    pub fn grouping_text(&self) -> Option<&str> {
        self.grouping
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    /// Conditions paired with their effective 1-based index.
    pub fn indexed(&self) -> impl Iterator<Item = (u32, &AtomicCondition)> {
        self.conditions
            .iter()
            .enumerate()
            .map(|(pos, c)| (c.index.unwrap_or(pos as u32 + 1), c))
    }
}
