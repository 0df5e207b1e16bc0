use super::{Operator, SourceType};
use crate::ast::{Expression, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A condition's literal operand, stored untyped until a declared type is known.
///
/// Lists and maps are kept as JSON text so that compiled artifacts stay
/// encodable without a self-describing format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Json(String),
}

impl From<&serde_json::Value> for Literal {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Literal::Null,
            serde_json::Value::Bool(b) => Literal::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Literal::Null, Literal::Number),
            serde_json::Value::String(s) => Literal::Text(s.clone()),
            other => Literal::Json(other.to_string()),
        }
    }
}

impl Literal {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            Literal::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
            Literal::Null | Literal::Bool(_) | Literal::Json(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Literal::Text(s) => Some(s.clone()),
            Literal::Number(n) => Some(Value::Number(*n).to_string()),
            Literal::Bool(b) => Some(b.to_string()),
            Literal::Null | Literal::Json(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            Literal::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Literal::Null | Literal::Number(_) | Literal::Json(_) => None,
        }
    }

    /// Interprets the literal as a structured JSON value (used for list/map equality).
    pub fn as_structured(&self) -> Option<Value> {
        match self {
            Literal::Json(s) | Literal::Text(s) => serde_json::from_str::<serde_json::Value>(s)
                .ok()
                .map(Value::from),
            Literal::Number(n) => Some(Value::Number(*n)),
            Literal::Bool(b) => Some(Value::Bool(*b)),
            Literal::Null => Some(Value::Null),
        }
    }

    /// Interprets the literal as a list element; plain text that is not JSON is a string.
    pub fn as_element(&self) -> Value {
        match self {
            Literal::Text(s) => serde_json::from_str::<serde_json::Value>(s)
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(s.clone())),
            other => other.as_structured().unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", Value::Number(*n)),
            Literal::Text(s) => write!(f, "\"{}\"", s),
            Literal::Json(s) => write!(f, "{}", s),
        }
    }
}

/// The right-hand side of a compiled comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// `empty` / `not empty` take no operand.
    None,
    Literal(Literal),
    Reference {
        source_type: SourceType,
        source: String,
    },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Literal(literal) => write!(f, "{}", literal),
            Operand::Reference {
                source_type,
                source,
            } => write!(f, "{} {}", source_type, source),
        }
    }
}

/// A validated atomic condition with a closed operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledCondition {
    pub index: u32,
    pub source_type: SourceType,
    pub source: String,
    pub operator: Operator,
    pub operand: Operand,
}

impl CompiledCondition {
    /// Human label for the left-hand reference, e.g. `tag temperature`.
    pub fn describe_source(&self) -> String {
        format!("{} {}", self.source_type, self.source)
    }
}

/// A compiled If block: the boolean tree plus every condition it may reference.
///
/// `expression` is `None` only for an empty condition set with no grouping, which
/// evaluates vacuously to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledIf {
    pub expression: Option<Expression>,
    pub conditions: BTreeMap<u32, CompiledCondition>,
}

impl CompiledIf {
    pub fn condition(&self, index: u32) -> Option<&CompiledCondition> {
        self.conditions.get(&index)
    }

    /// The canonical grouping text for this block; re-parsing it yields `expression`.
    pub fn canonical_grouping(&self) -> String {
        self.expression
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}
