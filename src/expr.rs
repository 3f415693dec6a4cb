//! Symbolic prediction formulas.
//!
//! A formula is a closed-form scalar expression over the user factors `pu0..puK-1`
//! and the item factors `qi0..qiK-1`. It can be evaluated for a user-item binding
//! and differentiated with respect to any of the factor variables.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

pub use self::error::{EvalError, ParseError};
pub use self::formula::Formula;
pub use self::function::Function;
pub use self::parser::parse;
pub use self::variable::{Binding, Variable};

pub mod derivative;
pub mod error;
pub mod evaluate;
pub mod formula;
pub mod function;
pub mod lexer;
pub mod parser;
pub mod variable;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    Variable(Variable),
    Negate(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Subtract(Box<Expr>, Box<Expr>),
    Multiply(Box<Expr>, Box<Expr>),
    Divide(Box<Expr>, Box<Expr>),
    Power(Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(formula: &str) -> Result<Self, Self::Err> {
        parse(formula)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<Variable> for Expr {
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

impl Expr {
    pub const ZERO: Self = Self::Constant(0.0);
    pub const ONE: Self = Self::Constant(1.0);

    #[must_use]
    pub const fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Distinct variables in their natural order: user factors first, then item factors.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::new();
        self.collect_variables(&mut variables);
        variables
    }

    fn collect_variables(&self, variables: &mut BTreeSet<Variable>) {
        match self {
            Self::Constant(_) => {}
            Self::Variable(variable) => {
                variables.insert(*variable);
            }
            Self::Negate(operand) | Self::Call(_, operand) => {
                operand.collect_variables(variables);
            }
            Self::Add(left, right)
            | Self::Subtract(left, right)
            | Self::Multiply(left, right)
            | Self::Divide(left, right)
            | Self::Power(left, right) => {
                left.collect_variables(variables);
                right.collect_variables(variables);
            }
        }
    }

    #[must_use]
    pub fn depends_on(&self, variable: Variable) -> bool {
        match self {
            Self::Constant(_) => false,
            Self::Variable(other) => *other == variable,
            Self::Negate(operand) | Self::Call(_, operand) => operand.depends_on(variable),
            Self::Add(left, right)
            | Self::Subtract(left, right)
            | Self::Multiply(left, right)
            | Self::Divide(left, right)
            | Self::Power(left, right) => left.depends_on(variable) || right.depends_on(variable),
        }
    }

    #[must_use]
    pub fn call(function: Function, argument: Self) -> Self {
        Self::Call(function, Box::new(argument))
    }

    #[must_use]
    pub fn pow(self, exponent: Self) -> Self {
        match (self.as_constant(), exponent.as_constant()) {
            (_, Some(value)) if value == 0.0 => Self::ONE,
            (_, Some(value)) if value == 1.0 => self,
            (Some(base), Some(value)) => fold(base.powf(value))
                .unwrap_or_else(|| Self::Power(Box::new(self), Box::new(exponent))),
            _ => Self::Power(Box::new(self), Box::new(exponent)),
        }
    }

    /// Binding strength used to decide where parentheses are needed when printing.
    fn precedence(&self) -> u8 {
        match self {
            Self::Add(..) | Self::Subtract(..) => 1,
            Self::Multiply(..) | Self::Divide(..) => 2,
            Self::Negate(_) => 3,
            Self::Constant(value) if value.is_sign_negative() => 3,
            Self::Power(..) => 4,
            Self::Constant(_) | Self::Variable(_) | Self::Call(..) => 5,
        }
    }
}

/// Keeps the folded constant only if it's finite, so that simplification never
/// turns a formula into a bare `inf` or `NaN`.
fn fold(value: f64) -> Option<Expr> {
    value.is_finite().then(|| Expr::Constant(value))
}

impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Self::Constant(value) => Self::Constant(-value),
            Self::Negate(operand) => *operand,
            _ => Self::Negate(Box::new(self)),
        }
    }
}

impl Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        match (self.as_constant(), rhs.as_constant()) {
            (Some(left), Some(right)) => {
                fold(left + right).unwrap_or_else(|| Self::Add(Box::new(self), Box::new(rhs)))
            }
            (Some(left), _) if left == 0.0 => rhs,
            (_, Some(right)) if right == 0.0 => self,
            _ => Self::Add(Box::new(self), Box::new(rhs)),
        }
    }
}

impl Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        match (self.as_constant(), rhs.as_constant()) {
            (Some(left), Some(right)) => {
                fold(left - right).unwrap_or_else(|| Self::Subtract(Box::new(self), Box::new(rhs)))
            }
            (Some(left), _) if left == 0.0 => -rhs,
            (_, Some(right)) if right == 0.0 => self,
            _ => Self::Subtract(Box::new(self), Box::new(rhs)),
        }
    }
}

impl Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        match (self.as_constant(), rhs.as_constant()) {
            (Some(left), Some(right)) => {
                fold(left * right).unwrap_or_else(|| Self::Multiply(Box::new(self), Box::new(rhs)))
            }
            (Some(left), _) if left == 0.0 => Self::ZERO,
            (_, Some(right)) if right == 0.0 => Self::ZERO,
            (Some(left), _) if left == 1.0 => rhs,
            (_, Some(right)) if right == 1.0 => self,
            (Some(left), _) if left == -1.0 => -rhs,
            (_, Some(right)) if right == -1.0 => -self,
            _ => Self::Multiply(Box::new(self), Box::new(rhs)),
        }
    }
}

impl Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        match (self.as_constant(), rhs.as_constant()) {
            (Some(left), Some(right)) => {
                fold(left / right).unwrap_or_else(|| Self::Divide(Box::new(self), Box::new(rhs)))
            }
            (Some(left), _) if left == 0.0 => Self::ZERO,
            (_, Some(right)) if right == 1.0 => self,
            _ => Self::Divide(Box::new(self), Box::new(rhs)),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(value) => write!(formatter, "{}", value),
            Self::Variable(variable) => write!(formatter, "{}", variable),
            Self::Negate(operand) => {
                formatter.write_str("-")?;
                write_operand(formatter, operand, self.precedence())
            }
            Self::Add(left, right) => write_binary(formatter, left, " + ", right, self.precedence()),
            Self::Subtract(left, right) => {
                write_binary(formatter, left, " - ", right, self.precedence())
            }
            Self::Multiply(left, right) => {
                write_binary(formatter, left, "*", right, self.precedence())
            }
            Self::Divide(left, right) => {
                write_binary(formatter, left, "/", right, self.precedence())
            }
            Self::Power(base, exponent) => {
                // Right-associative: the base must be atomic, the exponent may be unary.
                write_operand(formatter, base, self.precedence() + 1)?;
                formatter.write_str("^")?;
                write_operand(formatter, exponent, self.precedence() - 1)
            }
            Self::Call(function, argument) => write!(formatter, "{}({})", function, argument),
        }
    }
}

/// Left-associative binary operator: the right operand binds strictly tighter.
fn write_binary(
    formatter: &mut Formatter<'_>,
    left: &Expr,
    operator: &str,
    right: &Expr,
    precedence: u8,
) -> std::fmt::Result {
    write_operand(formatter, left, precedence)?;
    formatter.write_str(operator)?;
    write_operand(formatter, right, precedence + 1)
}

fn write_operand(
    formatter: &mut Formatter<'_>,
    operand: &Expr,
    min_precedence: u8,
) -> std::fmt::Result {
    if operand.precedence() >= min_precedence {
        write!(formatter, "{}", operand)
    } else {
        write!(formatter, "({})", operand)
    }
}
