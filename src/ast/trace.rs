use super::Value;
use crate::condition::Operator;

/// A record of how a grouping expression was evaluated, including every leaf comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationTrace {
    BinaryOp {
        op_symbol: &'static str,
        left: Box<EvaluationTrace>,
        right: Box<EvaluationTrace>,
        outcome: bool,
    },
    Leaf {
        index: u32,
        source: String,
        operator: Operator,
        operand: String,
        value: Value,
        outcome: bool,
    },
    /// A branch skipped by short-circuit evaluation.
    NotEvaluated,
}

impl EvaluationTrace {
    /// The boolean this node produced. `None` for a skipped branch.
    pub fn outcome(&self) -> Option<bool> {
        match self {
            EvaluationTrace::BinaryOp { outcome, .. } | EvaluationTrace::Leaf { outcome, .. } => {
                Some(*outcome)
            }
            EvaluationTrace::NotEvaluated => None,
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            EvaluationTrace::BinaryOp { op_symbol, .. } => match *op_symbol {
                "OR" => 1,
                "AND" => 2,
                _ => 0,
            },
            EvaluationTrace::Leaf { .. } | EvaluationTrace::NotEvaluated => 9,
        }
    }

    /// Number of leaves that were actually evaluated.
    pub fn evaluated_leaves(&self) -> usize {
        match self {
            EvaluationTrace::BinaryOp { left, right, .. } => {
                left.evaluated_leaves() + right.evaluated_leaves()
            }
            EvaluationTrace::Leaf { .. } => 1,
            EvaluationTrace::NotEvaluated => 0,
        }
    }
}
