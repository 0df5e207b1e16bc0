use serde::{Deserialize, Serialize};
use std::fmt;

/// The compiled form of a grouping expression: a boolean tree over condition indices.
///
/// `AND` and `OR` chains are stored as left-associative binary nodes, so
/// `1 AND 2 AND 3` becomes `And(And(1, 2), 3)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Condition(u32),
}

impl Expression {
    /// Builds the implicit chain used when no grouping expression is configured.
    pub fn chain(indices: &[u32], or: bool) -> Option<Expression> {
        indices
            .iter()
            .map(|&index| Expression::Condition(index))
            .reduce(|acc, next| {
                if or {
                    Expression::Or(Box::new(acc), Box::new(next))
                } else {
                    Expression::And(Box::new(acc), Box::new(next))
                }
            })
    }

    /// Every condition index referenced by the tree, left to right, duplicates kept.
    pub fn indices(&self) -> Vec<u32> {
        let mut out = Vec::new();
        self.collect_indices(&mut out);
        out
    }

    fn collect_indices(&self, out: &mut Vec<u32>) {
        match self {
            Expression::Condition(index) => out.push(*index),
            Expression::And(l, r) | Expression::Or(l, r) => {
                l.collect_indices(out);
                r.collect_indices(out);
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Expression::Condition(_) => 1,
            Expression::And(l, r) | Expression::Or(l, r) => 1 + l.depth().max(r.depth()),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Or(..) => 1,
            Expression::And(..) => 2,
            Expression::Condition(_) => 3,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Canonical source text. Parentheses are emitted only where re-parsing would
/// otherwise produce a different tree.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Condition(index) => write!(f, "{}", index),
            Expression::And(l, r) | Expression::Or(l, r) => {
                let own = self.precedence();
                let keyword = if matches!(self, Expression::And(..)) {
                    "AND"
                } else {
                    "OR"
                };
                l.fmt_operand(f, l.precedence() < own)?;
                write!(f, " {} ", keyword)?;
                r.fmt_operand(f, r.precedence() <= own)
            }
        }
    }
}

/// A wrapper to display an expression as a box-drawing tree.
pub struct DisplayExpression<'a> {
    pub expr: &'a Expression,
}

impl<'a> fmt::Display for DisplayExpression<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_as_tree(self.expr, f, "", true)
    }
}

impl<'a> DisplayExpression<'a> {
    fn fmt_as_tree(
        expr: &Expression,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match expr {
            Expression::Condition(index) => writeln!(f, "Condition #{}", index),
            Expression::And(l, r) => Self::fmt_binary(f, "AND", l, r, &child_prefix),
            Expression::Or(l, r) => Self::fmt_binary(f, "OR", l, r, &child_prefix),
        }
    }

    fn fmt_binary(
        f: &mut fmt::Formatter<'_>,
        name: &str,
        l: &Expression,
        r: &Expression,
        prefix: &str,
    ) -> fmt::Result {
        writeln!(f, "{}", name)?;
        Self::fmt_as_tree(l, f, prefix, false)?;
        Self::fmt_as_tree(r, f, prefix, true)
    }
}
