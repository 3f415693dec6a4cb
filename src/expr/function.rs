use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::expr::Expr;

/// Elementary functions available in formulas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Abs,
    Tanh,
}

impl Function {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Exp => "exp",
            Self::Ln => "log",
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Tanh => "tanh",
        }
    }

    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Exp => x.exp(),
            Self::Ln => x.ln(),
            Self::Sqrt => x.sqrt(),
            Self::Abs => x.abs(),
            Self::Tanh => x.tanh(),
        }
    }

    /// Derivative of the function at the argument, the chain rule is up to the caller.
    #[must_use]
    pub fn derivative(self, argument: &Expr) -> Expr {
        let call = |function| Expr::call(function, argument.clone());
        match self {
            Self::Sin => call(Self::Cos),
            Self::Cos => -call(Self::Sin),
            Self::Tan => Expr::ONE / call(Self::Cos).pow(Expr::Constant(2.0)),
            Self::Exp => call(Self::Exp),
            Self::Ln => Expr::ONE / argument.clone(),
            Self::Sqrt => Expr::ONE / (Expr::Constant(2.0) * call(Self::Sqrt)),
            // Sign of the argument, undefined at zero.
            Self::Abs => argument.clone() / call(Self::Abs),
            Self::Tanh => Expr::ONE - call(Self::Tanh).pow(Expr::Constant(2.0)),
        }
    }
}

impl Display for Function {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "sin" => Ok(Self::Sin),
            "cos" => Ok(Self::Cos),
            "tan" => Ok(Self::Tan),
            "exp" => Ok(Self::Exp),
            "log" | "ln" => Ok(Self::Ln),
            "sqrt" => Ok(Self::Sqrt),
            "abs" => Ok(Self::Abs),
            "tanh" => Ok(Self::Tanh),
            _ => Err(()),
        }
    }
}
