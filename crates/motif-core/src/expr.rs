//! Restricted arithmetic evaluator for `${...}` expression bodies.
//!
//! Grammar: numbers, `+ - * /`, parentheses, unary minus, whitespace.
//! Anything else is an error, never silently dropped. Evaluation is pure
//! arithmetic over f64; there is no dynamic code execution facility here,
//! variable substitution happens before this parser runs.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    #[error("disallowed character '{ch}' at position {pos}")]
    BadChar { ch: char, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token at position {pos}")]
    UnexpectedToken { pos: usize },
    #[error("unbalanced parenthesis at position {pos}")]
    Unbalanced { pos: usize },
    #[error("malformed number at position {pos}")]
    BadNumber { pos: usize },
    #[error("expression result is not a finite number")]
    NonFinite,
    #[error("empty expression")]
    Empty,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push((Token::Plus, i));
                i += 1;
            }
            '-' => {
                tokens.push((Token::Minus, i));
                i += 1;
            }
            '*' => {
                tokens.push((Token::Star, i));
                i += 1;
            }
            '/' => {
                tokens.push((Token::Slash, i));
                i += 1;
            }
            '(' => {
                tokens.push((Token::Open, i));
                i += 1;
            }
            ')' => {
                tokens.push((Token::Close, i));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i] as char, '0'..='9' | '.') {
                    i += 1;
                }
                let text = &input[start..i];
                let value: f64 = text
                    .parse()
                    .map_err(|_| ExprError::BadNumber { pos: start })?;
                tokens.push((Token::Number(value), start));
            }
            other => return Err(ExprError::BadChar { ch: other, pos: i }),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn src_pos(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, p)| *p).unwrap_or(0)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.bump();
                    acc += self.term()?;
                }
                Token::Minus => {
                    self.bump();
                    acc -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.bump();
                    acc *= self.factor()?;
                }
                Token::Slash => {
                    self.bump();
                    acc /= self.factor()?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    // factor := '-' factor | number | '(' expr ')'
    fn factor(&mut self) -> Result<f64, ExprError> {
        match self.bump() {
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::Plus) => self.factor(),
            Some(Token::Number(v)) => Ok(v),
            Some(Token::Open) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(ExprError::Unbalanced {
                        pos: self.src_pos(),
                    }),
                }
            }
            Some(_) => Err(ExprError::UnexpectedToken {
                pos: self.tokens[self.pos - 1].1,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression body. Input must already have had every
/// `$name` reference substituted with a numeric literal.
pub fn eval(input: &str) -> Result<f64, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(ExprError::UnexpectedToken {
            pos: parser.src_pos(),
        });
    }
    if !value.is_finite() {
        return Err(ExprError::NonFinite);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_parens() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(eval("(1 + 2) * 3").unwrap(), 9.0);
        assert_eq!(eval("10 / 4").unwrap(), 2.5);
        assert_eq!(eval("2 * (3 + 4) - 5").unwrap(), 9.0);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(eval("-3").unwrap(), -3.0);
        assert_eq!(eval("4 * -2").unwrap(), -8.0);
        assert_eq!(eval("-(1 + 1)").unwrap(), -2.0);
        assert_eq!(eval("--2").unwrap(), 2.0);
    }

    /// it should reject any character outside the arithmetic alphabet
    #[test]
    fn disallowed_characters() {
        assert_eq!(
            eval("1 + alert(1)"),
            Err(ExprError::BadChar { ch: 'a', pos: 4 })
        );
        assert!(matches!(eval("2 ^ 3"), Err(ExprError::BadChar { .. })));
        assert!(matches!(eval("1; 2"), Err(ExprError::BadChar { .. })));
    }

    #[test]
    fn malformed_input() {
        assert_eq!(eval(""), Err(ExprError::Empty));
        assert!(matches!(eval("1 +"), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(eval("(1 + 2"), Err(ExprError::Unbalanced { .. })));
        assert!(matches!(eval("1 2"), Err(ExprError::UnexpectedToken { .. })));
        assert!(matches!(eval("1..2"), Err(ExprError::BadNumber { .. })));
    }

    /// it should report non-finite results as errors rather than NaN/inf
    #[test]
    fn non_finite_results() {
        assert_eq!(eval("1 / 0"), Err(ExprError::NonFinite));
        assert_eq!(eval("0 / 0"), Err(ExprError::NonFinite));
    }
}
