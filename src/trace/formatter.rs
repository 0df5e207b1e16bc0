use crate::ast::EvaluationTrace;
use std::fmt::Write;

/// Renders evaluation traces as one-line explanations.
///
/// Leaves read `#<index> <source> (was <value>) <operator> <operand>`. Parentheses are
/// only emitted where the tree's grouping differs from plain `AND`-over-`OR` precedence,
/// and branches skipped by short-circuiting are left out.
pub struct TraceFormatter;

impl TraceFormatter {
    pub fn format_trace(trace: &EvaluationTrace) -> String {
        let mut out = String::new();
        Self::write_node(&mut out, trace, 0);
        out
    }

    fn write_node(out: &mut String, trace: &EvaluationTrace, min_precedence: u8) {
        let precedence = trace.precedence();
        let wrap = precedence < min_precedence;
        if wrap {
            out.push('(');
        }

        match trace {
            EvaluationTrace::BinaryOp {
                op_symbol,
                left,
                right,
                ..
            } => {
                Self::write_node(out, left, precedence);
                if !matches!(**right, EvaluationTrace::NotEvaluated) {
                    let _ = write!(out, " {} ", op_symbol);
                    // A right operand of equal precedence was grouped explicitly.
                    Self::write_node(out, right, precedence + 1);
                }
            }
            EvaluationTrace::Leaf {
                index,
                source,
                operator,
                operand,
                value,
                ..
            } => {
                let _ = write!(out, "#{} {} (was {}) {}", index, source, value, operator);
                if !operand.is_empty() {
                    let _ = write!(out, " {}", operand);
                }
            }
            EvaluationTrace::NotEvaluated => {}
        }

        if wrap {
            out.push(')');
        }
    }
}
