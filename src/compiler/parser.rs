use super::lexer::{Spanned, Token};
use crate::ast::Expression;
use crate::error::ConditionError;

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Upper bound on condition references in one expression. Chains nest one tree level
/// per term, so this also bounds the depth of the compiled tree.
pub const DEFAULT_MAX_TERMS: usize = 512;

/// Recursive-descent parser for grouping expressions.
///
/// ```text
/// Expr    := OrExpr
/// OrExpr  := AndExpr ('OR' AndExpr)*
/// AndExpr := Atom ('AND' Atom)*
/// Atom    := INTEGER | '(' Expr ')'
/// ```
pub(crate) struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
    max_depth: usize,
    terms: usize,
    max_terms: usize,
    end_offset: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Spanned], end_offset: usize, max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
            terms: 0,
            max_terms: DEFAULT_MAX_TERMS,
            end_offset,
        }
    }

    pub(crate) fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    pub(crate) fn parse(mut self) -> Result<Expression, ConditionError> {
        if self.tokens.is_empty() {
            return Err(ConditionError::syntax("empty expression", 0));
        }
        let expr = self.parse_or()?;
        if let Some(next) = self.peek() {
            let message = match next.token {
                Token::Integer(n) => format!("condition {} follows another operand without AND/OR", n),
                Token::RParen => "unmatched ')'".to_string(),
                Token::LParen => "'(' follows an operand without AND/OR".to_string(),
                other => format!("unexpected '{}'", other),
            };
            return Err(ConditionError::syntax(message, next.offset));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<Spanned> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Spanned> {
        let next = self.peek();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn parse_or(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Spanned { token: Token::Or, .. })) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_atom()?;
        while matches!(self.peek(), Some(Spanned { token: Token::And, .. })) {
            self.pos += 1;
            let right = self.parse_atom()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<Expression, ConditionError> {
        let Some(spanned) = self.advance() else {
            return Err(ConditionError::syntax(
                "expression ends where a condition index or '(' was expected",
                self.end_offset,
            ));
        };

        match spanned.token {
            Token::Integer(index) => {
                self.terms += 1;
                if self.terms > self.max_terms {
                    return Err(ConditionError::syntax(
                        format!("expression references more than {} conditions", self.max_terms),
                        spanned.offset,
                    ));
                }
                Ok(Expression::Condition(index))
            }
            Token::LParen => {
                if matches!(self.peek(), Some(Spanned { token: Token::RParen, .. })) {
                    return Err(ConditionError::syntax(
                        "empty parenthesis group",
                        spanned.offset,
                    ));
                }
                self.depth += 1;
                if self.depth > self.max_depth {
                    return Err(ConditionError::syntax(
                        format!("parentheses nested deeper than {}", self.max_depth),
                        spanned.offset,
                    ));
                }
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => {
                        self.depth -= 1;
                        Ok(inner)
                    }
                    Some(other) => Err(ConditionError::syntax(
                        format!("expected ')' but found '{}'", other.token),
                        other.offset,
                    )),
                    None => Err(ConditionError::syntax(
                        format!("unbalanced '(' opened at offset {}", spanned.offset),
                        self.end_offset,
                    )),
                }
            }
            Token::And | Token::Or => Err(ConditionError::syntax(
                format!("operator '{}' is missing its left operand", spanned.token),
                spanned.offset,
            )),
            Token::RParen => Err(ConditionError::syntax("unexpected ')'", spanned.offset)),
        }
    }
}
