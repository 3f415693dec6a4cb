//! Recursive descent parser.
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/') unary)*
//! unary := ('-' | '+') unary | power
//! power := atom ('^' unary)?
//! atom  := number | variable | function '(' expr ')' | '(' expr ')'
//! ```

use std::iter::Peekable;
use std::str::FromStr;
use std::vec::IntoIter;

use crate::expr::error::ParseError;
use crate::expr::lexer::{tokenize, Spanned, Token};
use crate::expr::{Expr, Function, Variable};
use crate::prelude::*;

/// Parses the formula, folding constant sub-expressions along the way.
#[instrument(level = "debug", err)]
pub fn parse(formula: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(formula)?.into_iter().peekable(),
    };
    let expr = parser.expr()?;
    match parser.tokens.next() {
        None => Ok(expr),
        Some(spanned) => Err(unexpected(spanned)),
    }
}

struct Parser {
    tokens: Peekable<IntoIter<Spanned>>,
}

impl Parser {
    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        loop {
            if self.next_if(&Token::Plus) {
                expr = expr + self.term()?;
            } else if self.next_if(&Token::Minus) {
                expr = expr - self.term()?;
            } else {
                return Ok(expr);
            }
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        loop {
            if self.next_if(&Token::Star) {
                expr = expr * self.unary()?;
            } else if self.next_if(&Token::Slash) {
                expr = expr / self.unary()?;
            } else {
                return Ok(expr);
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.next_if(&Token::Minus) {
            Ok(-self.unary()?)
        } else if self.next_if(&Token::Plus) {
            self.unary()
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if self.next_if(&Token::Caret) {
            Ok(base.pow(self.unary()?))
        } else {
            Ok(base)
        }
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let spanned = self.tokens.next().ok_or(ParseError::UnexpectedEnd)?;
        match spanned.token {
            Token::Number(value) => Ok(Expr::Constant(value)),
            Token::LeftParen => self.parenthesized(),
            Token::Identifier(ref name) => {
                if let Ok(variable) = Variable::from_str(name) {
                    Ok(Expr::Variable(variable))
                } else if let Ok(function) = Function::from_str(name) {
                    self.expect(&Token::LeftParen)?;
                    Ok(Expr::call(function, self.parenthesized()?))
                } else {
                    Err(ParseError::UnknownIdentifier {
                        name: name.clone(),
                        offset: spanned.offset,
                    })
                }
            }
            _ => Err(unexpected(spanned)),
        }
    }

    /// Parses the rest of a parenthesized expression, the opening parenthesis is already consumed.
    fn parenthesized(&mut self) -> Result<Expr, ParseError> {
        let expr = self.expr()?;
        self.expect(&Token::RightParen)?;
        Ok(expr)
    }

    fn next_if(&mut self, token: &Token) -> bool {
        self.tokens.next_if(|spanned| &spanned.token == token).is_some()
    }

    fn expect(&mut self, token: &Token) -> Result<(), ParseError> {
        match self.tokens.next() {
            Some(spanned) if &spanned.token == token => Ok(()),
            Some(spanned) => Err(unexpected(spanned)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

fn unexpected(spanned: Spanned) -> ParseError {
    ParseError::UnexpectedToken {
        token: spanned.token.to_string(),
        offset: spanned.offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pu(index: usize) -> Expr {
        Variable::User(index).into()
    }

    fn qi(index: usize) -> Expr {
        Variable::Item(index).into()
    }

    #[test]
    fn parse_dot_product_ok() -> crate::Result {
        assert_eq!(parse("pu0 * qi0 + pu1 * qi1")?, pu(0) * qi(0) + pu(1) * qi(1));
        Ok(())
    }

    #[test]
    fn parse_precedence_ok() -> crate::Result {
        assert_eq!(parse("pu0 - qi0 - pu1")?, (pu(0) - qi(0)) - pu(1));
        assert_eq!(parse("pu0 / qi0 * pu1")?, (pu(0) / qi(0)) * pu(1));
        assert_eq!(parse("pu0 + qi0 * pu1")?, pu(0) + qi(0) * pu(1));
        assert_eq!(parse("-pu0^2")?, -(pu(0).pow(Expr::Constant(2.0))));
        assert_eq!(parse("pu0^qi0^2")?, pu(0).pow(qi(0).pow(Expr::Constant(2.0))));
        assert_eq!(parse("pu0^-qi0")?, pu(0).pow(-qi(0)));
        assert_eq!(parse("(pu0 + qi0) * pu1")?, (pu(0) + qi(0)) * pu(1));
        Ok(())
    }

    #[test]
    fn parse_function_ok() -> crate::Result {
        assert_eq!(
            parse("1 / (1 + exp(-pu0 * qi0))")?,
            Expr::ONE / (Expr::ONE + Expr::call(Function::Exp, -pu(0) * qi(0))),
        );
        assert_eq!(parse("ln(pu0)")?, parse("log(pu0)")?);
        Ok(())
    }

    #[test]
    fn parse_folds_constants_ok() -> crate::Result {
        assert_eq!(parse("2 * 3 + pu0 * 1")?, Expr::Constant(6.0) + pu(0));
        assert_eq!(parse("+-+2")?, Expr::Constant(-2.0));
        Ok(())
    }

    #[test]
    fn parse_unknown_identifier() {
        assert_eq!(
            parse("pu0 * xi0"),
            Err(ParseError::UnknownIdentifier {
                name: "xi0".to_string(),
                offset: 6
            }),
        );
    }

    #[test]
    fn parse_unexpected_end() {
        assert_eq!(parse("pu0 *"), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse("(pu0"), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse(""), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn parse_unexpected_token() {
        assert_eq!(
            parse("pu0 qi0"),
            Err(ParseError::UnexpectedToken {
                token: "qi0".to_string(),
                offset: 4
            }),
        );
        assert_eq!(
            parse("exp pu0"),
            Err(ParseError::UnexpectedToken {
                token: "pu0".to_string(),
                offset: 4
            }),
        );
        assert_eq!(
            parse("pu0)"),
            Err(ParseError::UnexpectedToken {
                token: ")".to_string(),
                offset: 3
            }),
        );
    }
}
