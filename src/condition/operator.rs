use crate::ast::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operators an atomic condition may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "isn't")]
    IsNot,
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "not empty")]
    NotEmpty,
}

/// Groups operators by the kind of comparison they perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    Equality,
    Ordering,
    Containment,
    Identity,
    Emptiness,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessThanOrEqual,
        Operator::GreaterThanOrEqual,
        Operator::Contains,
        Operator::Is,
        Operator::IsNot,
        Operator::Empty,
        Operator::NotEmpty,
    ];

    /// Parses the wire spelling, or one of the labels the editor displays.
    pub fn parse(raw: &str) -> Option<Operator> {
        let op = match raw.trim().to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" | "equals" => Operator::Equal,
            "!=" | "<>" | "ne" | "not equals" => Operator::NotEqual,
            "<" | "lt" | "less than" => Operator::LessThan,
            ">" | "gt" | "greater than" => Operator::GreaterThan,
            "<=" | "lte" | "less than or equal" => Operator::LessThanOrEqual,
            ">=" | "gte" | "greater than or equal" => Operator::GreaterThanOrEqual,
            "contains" => Operator::Contains,
            "is" => Operator::Is,
            "isn't" | "isnt" | "is not" => Operator::IsNot,
            "empty" | "is empty" => Operator::Empty,
            "not empty" | "not_empty" | "is not empty" => Operator::NotEmpty,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Contains => "contains",
            Operator::Is => "is",
            Operator::IsNot => "isn't",
            Operator::Empty => "empty",
            Operator::NotEmpty => "not empty",
        }
    }

    pub fn class(&self) -> OperatorClass {
        match self {
            Operator::Equal | Operator::NotEqual => OperatorClass::Equality,
            Operator::LessThan
            | Operator::GreaterThan
            | Operator::LessThanOrEqual
            | Operator::GreaterThanOrEqual => OperatorClass::Ordering,
            Operator::Contains => OperatorClass::Containment,
            Operator::Is | Operator::IsNot => OperatorClass::Identity,
            Operator::Empty | Operator::NotEmpty => OperatorClass::Emptiness,
        }
    }

    /// Whether the operator compares against a literal or reference at all.
    pub fn takes_operand(&self) -> bool {
        self.class() != OperatorClass::Emptiness
    }

    /// True for the negated forms (`!=`, `isn't`, `not empty`).
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Operator::NotEqual | Operator::IsNot | Operator::NotEmpty
        )
    }

    /// Operator/type validity table. `empty` on a number is never valid.
    pub fn is_valid_for(&self, declared: ValueType) -> bool {
        match (self.class(), declared) {
            (OperatorClass::Equality, _) => true,
            (OperatorClass::Ordering, ValueType::Number) => true,
            (OperatorClass::Containment, ValueType::String | ValueType::List | ValueType::Object) => {
                true
            }
            (OperatorClass::Identity, ValueType::String | ValueType::Boolean) => true,
            (
                OperatorClass::Emptiness,
                ValueType::String | ValueType::List | ValueType::Map | ValueType::Object,
            ) => true,
            _ => false,
        }
    }

    /// All operators accepted for a declared type, in display order.
    pub fn valid_for(declared: ValueType) -> Vec<Operator> {
        Self::ALL
            .into_iter()
            .filter(|op| op.is_valid_for(declared))
            .collect()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
