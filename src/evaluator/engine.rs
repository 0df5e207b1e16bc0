use super::EvaluationStrategy;
use super::atomic::evaluate_condition;
use crate::ast::{EvaluationTrace, Expression};
use crate::condition::CompiledIf;
use crate::error::ConditionError;
use crate::resolver::Resolver;

/// Walks a compiled grouping tree against one resolver snapshot.
pub(super) struct TreeEngine<'a> {
    compiled: &'a CompiledIf,
    resolver: &'a dyn Resolver,
    strategy: EvaluationStrategy,
}

impl<'a> TreeEngine<'a> {
    pub(super) fn new(
        compiled: &'a CompiledIf,
        resolver: &'a dyn Resolver,
        strategy: EvaluationStrategy,
    ) -> Self {
        Self {
            compiled,
            resolver,
            strategy,
        }
    }

    pub(super) fn evaluate(&self, expr: &Expression) -> Result<EvaluationTrace, ConditionError> {
        match expr {
            Expression::Condition(index) => self.evaluate_leaf(*index),
            Expression::And(l, r) => self.evaluate_binary("AND", l, r),
            Expression::Or(l, r) => self.evaluate_binary("OR", l, r),
        }
    }

    fn evaluate_leaf(&self, index: u32) -> Result<EvaluationTrace, ConditionError> {
        // Compiled blocks never reference missing indices, but artifacts can be hand-built.
        let condition =
            self.compiled
                .condition(index)
                .ok_or_else(|| ConditionError::UnknownIndex {
                    index,
                    available: self.compiled.conditions.keys().copied().collect(),
                })?;

        let leaf = evaluate_condition(condition, self.resolver)?;
        Ok(EvaluationTrace::Leaf {
            index,
            source: condition.describe_source(),
            operator: condition.operator,
            operand: condition.operand.to_string(),
            value: leaf.value,
            outcome: leaf.outcome,
        })
    }

    fn evaluate_binary(
        &self,
        op_symbol: &'static str,
        l: &Expression,
        r: &Expression,
    ) -> Result<EvaluationTrace, ConditionError> {
        let is_and = op_symbol == "AND";
        let left = self.evaluate(l)?;
        let left_outcome = left.outcome().unwrap_or(false);

        // The left side alone decides an AND on false and an OR on true.
        let decided = left_outcome != is_and;
        if decided && self.strategy == EvaluationStrategy::ShortCircuit {
            return Ok(EvaluationTrace::BinaryOp {
                op_symbol,
                left: Box::new(left),
                right: Box::new(EvaluationTrace::NotEvaluated),
                outcome: left_outcome,
            });
        }

        let right = self.evaluate(r)?;
        let right_outcome = right.outcome().unwrap_or(false);
        let outcome = if is_and {
            left_outcome && right_outcome
        } else {
            left_outcome || right_outcome
        };

        Ok(EvaluationTrace::BinaryOp {
            op_symbol,
            left: Box::new(left),
            right: Box::new(right),
            outcome,
        })
    }
}
