use crate::error::ConditionError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Integer(u32),
    And,
    Or,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "{}", n),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Splits a grouping expression into tokens.
///
/// Integers are maximal digit runs; `AND`/`OR` match case-insensitively as whole words.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, ConditionError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        match c {
            c if c.is_ascii_whitespace() => pos += 1,
            b'(' => {
                tokens.push(Spanned {
                    token: Token::LParen,
                    offset: pos,
                });
                pos += 1;
            }
            b')' => {
                tokens.push(Spanned {
                    token: Token::RParen,
                    offset: pos,
                });
                pos += 1;
            }
            b'0'..=b'9' => {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos < bytes.len() && is_word_char(bytes[pos]) {
                    return Err(ConditionError::syntax(
                        format!("condition index '{}' runs into a word", &input[start..pos]),
                        pos,
                    ));
                }
                let index = input[start..pos].parse::<u32>().map_err(|_| {
                    ConditionError::syntax(
                        format!("condition index '{}' is too large", &input[start..pos]),
                        start,
                    )
                })?;
                tokens.push(Spanned {
                    token: Token::Integer(index),
                    offset: start,
                });
            }
            c if c.is_ascii_alphabetic() => {
                let start = pos;
                while pos < bytes.len() && is_word_char(bytes[pos]) {
                    pos += 1;
                }
                let word = &input[start..pos];
                let token = if word.eq_ignore_ascii_case("and") {
                    Token::And
                } else if word.eq_ignore_ascii_case("or") {
                    Token::Or
                } else {
                    return Err(ConditionError::syntax(
                        format!("unknown keyword '{}', expected AND or OR", word),
                        start,
                    ));
                };
                tokens.push(Spanned {
                    token,
                    offset: start,
                });
            }
            _ => {
                // Report the full character, not a stray UTF-8 byte.
                let ch = input[pos..].chars().next().unwrap_or('?');
                return Err(ConditionError::syntax(
                    format!("unexpected character '{}'", ch),
                    pos,
                ));
            }
        }
    }

    Ok(tokens)
}
