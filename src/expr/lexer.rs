use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

use crate::expr::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LeftParen,
    RightParen,
}

impl Display for Token {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(formatter, "{}", value),
            Self::Identifier(name) => formatter.write_str(name),
            Self::Plus => formatter.write_str("+"),
            Self::Minus => formatter.write_str("-"),
            Self::Star => formatter.write_str("*"),
            Self::Slash => formatter.write_str("/"),
            Self::Caret => formatter.write_str("^"),
            Self::LeftParen => formatter.write_str("("),
            Self::RightParen => formatter.write_str(")"),
        }
    }
}

/// Token along with its byte offset in the formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub fn tokenize(formula: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut chars = formula.char_indices().peekable();
    let mut tokens = Vec::new();

    while let Some(&(offset, character)) = chars.peek() {
        let token = match character {
            _ if character.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => read_number(formula, &mut chars)?,
            _ if character.is_ascii_alphabetic() || character == '_' => {
                read_identifier(formula, &mut chars)
            }
            _ => {
                chars.next();
                match character {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '^' => Token::Caret,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    _ => return Err(ParseError::UnexpectedCharacter { character, offset }),
                }
            }
        };
        tokens.push(Spanned { token, offset });
    }

    Ok(tokens)
}

fn read_number(
    formula: &str,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<Token, ParseError> {
    let start = chars.peek().map_or(formula.len(), |(offset, _)| *offset);
    let mut end = consume_while(formula, chars, |character| {
        character.is_ascii_digit() || character == '.'
    });

    // Exponent is only consumed when it's followed by digits, so `2e` stays an error.
    if let Some(&(_, 'e' | 'E')) = chars.peek() {
        let exponent = &formula[end + 1..];
        let exponent = exponent
            .strip_prefix(|character: char| character == '+' || character == '-')
            .unwrap_or(exponent);
        if exponent.starts_with(|character: char| character.is_ascii_digit()) {
            chars.next();
            if let Some(&(_, '+' | '-')) = chars.peek() {
                chars.next();
            }
            end = consume_while(formula, chars, |character| character.is_ascii_digit());
        }
    }

    let literal = &formula[start..end];
    f64::from_str(literal)
        .map(Token::Number)
        .map_err(|_| ParseError::InvalidNumber {
            literal: literal.to_string(),
            offset: start,
        })
}

fn read_identifier(formula: &str, chars: &mut Peekable<CharIndices<'_>>) -> Token {
    let start = chars.peek().map_or(formula.len(), |(offset, _)| *offset);
    let end = consume_while(formula, chars, |character| {
        character.is_ascii_alphanumeric() || character == '_'
    });
    Token::Identifier(formula[start..end].to_string())
}

/// Advances while the predicate holds and returns the end offset.
fn consume_while(
    formula: &str,
    chars: &mut Peekable<CharIndices<'_>>,
    predicate: impl Fn(char) -> bool,
) -> usize {
    while let Some(&(_, character)) = chars.peek() {
        if !predicate(character) {
            break;
        }
        chars.next();
    }
    chars.peek().map_or(formula.len(), |(offset, _)| *offset)
}
