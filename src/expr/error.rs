use thiserror::Error;

use crate::expr::variable::Variable;

/// Formula parsing failure, offsets are in bytes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected character `{character}` at {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    #[error("invalid number `{literal}` at {offset}")]
    InvalidNumber { literal: String, offset: usize },

    #[error("unexpected `{token}` at {offset}")]
    UnexpectedToken { token: String, offset: usize },

    #[error("unexpected end of the formula")]
    UnexpectedEnd,

    #[error("unknown identifier `{name}` at {offset}")]
    UnknownIdentifier { name: String, offset: usize },
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("variable `{0}` is not bound")]
    Unbound(Variable),
}
