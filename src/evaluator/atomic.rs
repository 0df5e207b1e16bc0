//! Operator semantics for a single atomic condition.

use crate::ast::{Value, ValueType};
use crate::condition::{CompiledCondition, Literal, Operand, Operator, OperatorClass, SourceType};
use crate::error::ConditionError;
use crate::resolver::{Catalog, Resolved, Resolver};
use itertools::Itertools;

/// The result of evaluating one atomic condition.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafOutcome {
    pub value: Value,
    pub outcome: bool,
}

/// The operand after coercion to the type the comparison needs.
#[derive(Debug, Clone, PartialEq)]
enum Coerced {
    Ignored,
    Null,
    Number(f64),
    Text(String),
    Bool(bool),
    Structured(Value),
    Element(Value),
}

pub fn evaluate_condition(
    condition: &CompiledCondition,
    resolver: &dyn Resolver,
) -> Result<LeafOutcome, ConditionError> {
    let op = condition.operator;
    let resolved = resolve(resolver, condition.source_type, &condition.source)?;
    check_conformance(op, &resolved)?;
    check_operator(op, resolved.declared_type)?;

    let coerced = match &condition.operand {
        Operand::None if op.takes_operand() => {
            return Err(ConditionError::Config(format!(
                "condition {} uses '{}' without an operand",
                condition.index, op
            )));
        }
        Operand::None => Coerced::Ignored,
        Operand::Literal(literal) => coerce_literal(op, resolved.declared_type, literal)?,
        Operand::Reference {
            source_type,
            source,
        } => {
            let other = resolve(resolver, *source_type, source)?;
            check_conformance(op, &other)?;
            coerce_reference(op, &resolved, &other)?
        }
    };

    let outcome = apply(op, resolved.declared_type, &resolved.value, &coerced)?;
    log::trace!(
        "Condition #{} {} (was {}) {} {} -> {}",
        condition.index,
        condition.describe_source(),
        resolved.value,
        op,
        condition.operand,
        outcome
    );
    Ok(LeafOutcome {
        value: resolved.value,
        outcome,
    })
}

/// Save-time validation of a condition against a declared type from a catalog.
pub(crate) fn check_static(
    condition: &CompiledCondition,
    declared: ValueType,
    catalog: &Catalog,
) -> Result<(), ConditionError> {
    let op = condition.operator;
    check_operator(op, declared)?;
    match &condition.operand {
        Operand::None => Ok(()),
        Operand::Literal(literal) => coerce_literal(op, declared, literal).map(|_| ()),
        Operand::Reference {
            source_type,
            source,
        } => match catalog.declared_type(*source_type, source) {
            Some(other) if op.class() == OperatorClass::Ordering && other != ValueType::Number => {
                Err(reference_mismatch(op, declared, other))
            }
            _ => Ok(()),
        },
    }
}

fn resolve(
    resolver: &dyn Resolver,
    source_type: SourceType,
    source: &str,
) -> Result<Resolved, ConditionError> {
    resolver
        .resolve(source_type, source)
        .ok_or_else(|| ConditionError::UnresolvedReference {
            source_type: source_type.to_string(),
            source_ref: source.to_string(),
        })
}

fn check_conformance(op: Operator, resolved: &Resolved) -> Result<(), ConditionError> {
    if resolved.value.conforms_to(resolved.declared_type) {
        Ok(())
    } else {
        Err(ConditionError::TypeMismatch {
            operator: op,
            declared: resolved.declared_type,
            detail: format!(
                "resolved value {} does not match its declared type",
                resolved.value
            ),
        })
    }
}

fn check_operator(op: Operator, declared: ValueType) -> Result<(), ConditionError> {
    if op.is_valid_for(declared) {
        Ok(())
    } else {
        Err(ConditionError::TypeMismatch {
            operator: op,
            declared,
            detail: format!(
                "valid operators are {}",
                Operator::valid_for(declared).iter().join(", ")
            ),
        })
    }
}

fn reference_mismatch(op: Operator, declared: ValueType, other: ValueType) -> ConditionError {
    ConditionError::TypeMismatch {
        operator: op,
        declared,
        detail: format!("reference operand is declared as '{}'", other),
    }
}

fn invalid_literal(op: Operator, literal: &Literal, expected: &str) -> ConditionError {
    ConditionError::InvalidLiteral {
        operator: op,
        literal: literal.to_string(),
        expected: expected.to_string(),
    }
}

fn coerce_literal(
    op: Operator,
    declared: ValueType,
    literal: &Literal,
) -> Result<Coerced, ConditionError> {
    let class = op.class();
    if class == OperatorClass::Emptiness {
        return Ok(Coerced::Ignored);
    }
    if *literal == Literal::Null
        && matches!(class, OperatorClass::Equality | OperatorClass::Identity)
    {
        return Ok(Coerced::Null);
    }

    match (class, declared) {
        (OperatorClass::Ordering, _) | (_, ValueType::Number) => literal
            .as_number()
            .map(Coerced::Number)
            .ok_or_else(|| invalid_literal(op, literal, "a number")),
        (OperatorClass::Containment, ValueType::List | ValueType::Object) => {
            Ok(Coerced::Element(literal.as_element()))
        }
        (_, ValueType::String) => literal
            .as_text()
            .map(Coerced::Text)
            .ok_or_else(|| invalid_literal(op, literal, "a string")),
        (_, ValueType::Boolean) => literal
            .as_bool()
            .map(Coerced::Bool)
            .ok_or_else(|| invalid_literal(op, literal, "true or false")),
        (_, ValueType::List | ValueType::Map | ValueType::Object) => literal
            .as_structured()
            .map(Coerced::Structured)
            .ok_or_else(|| invalid_literal(op, literal, "a JSON value")),
    }
}

fn coerce_reference(
    op: Operator,
    left: &Resolved,
    right: &Resolved,
) -> Result<Coerced, ConditionError> {
    match op.class() {
        OperatorClass::Emptiness => Ok(Coerced::Ignored),
        OperatorClass::Ordering => {
            if right.declared_type != ValueType::Number {
                return Err(reference_mismatch(
                    op,
                    left.declared_type,
                    right.declared_type,
                ));
            }
            Ok(match right.value {
                Value::Number(n) => Coerced::Number(n),
                _ => Coerced::Null,
            })
        }
        OperatorClass::Containment => Ok(Coerced::Element(right.value.clone())),
        OperatorClass::Equality | OperatorClass::Identity => Ok(match &right.value {
            Value::Null => Coerced::Null,
            other => Coerced::Structured(other.clone()),
        }),
    }
}

fn compare_numbers(op: Operator, lhs: f64, rhs: f64) -> bool {
    match op {
        Operator::LessThan => lhs < rhs,
        Operator::GreaterThan => lhs > rhs,
        Operator::LessThanOrEqual => lhs <= rhs,
        Operator::GreaterThanOrEqual => lhs >= rhs,
        _ => lhs == rhs,
    }
}

fn apply(
    op: Operator,
    declared: ValueType,
    value: &Value,
    operand: &Coerced,
) -> Result<bool, ConditionError> {
    let class = op.class();

    if class == OperatorClass::Ordering {
        // Null on either side, and NaN, never order.
        return Ok(match (value, operand) {
            (Value::Number(lhs), Coerced::Number(rhs)) => compare_numbers(op, *lhs, *rhs),
            _ => false,
        });
    }

    let matched = match (class, operand) {
        (OperatorClass::Emptiness, _) => value.is_empty(),
        (_, Coerced::Null) => *value == Value::Null,
        (OperatorClass::Containment, Coerced::Text(needle)) => match value {
            Value::String(haystack) => haystack.contains(needle.as_str()),
            _ => false,
        },
        (OperatorClass::Containment, Coerced::Element(element)) => match value {
            Value::List(items) => items.contains(element),
            Value::String(haystack) => match element {
                Value::String(needle) => haystack.contains(needle.as_str()),
                _ => false,
            },
            Value::Null => false,
            _ => {
                return Err(ConditionError::TypeMismatch {
                    operator: op,
                    declared,
                    detail: format!("contains requires a string or list value, found {}", value),
                });
            }
        },
        (_, Coerced::Number(rhs)) => matches!(value, Value::Number(lhs) if lhs == rhs),
        (_, Coerced::Text(text)) => matches!(value, Value::String(s) if s == text),
        (_, Coerced::Bool(b)) => matches!(value, Value::Bool(v) if v == b),
        (_, Coerced::Structured(expected)) => value == expected,
        (_, Coerced::Element(element)) => value == element,
        (_, Coerced::Ignored) => {
            return Err(ConditionError::Config(format!(
                "operator '{}' requires an operand",
                op
            )));
        }
    };

    Ok(if op.is_negated() { !matched } else { matched })
}
