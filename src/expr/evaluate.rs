use crate::expr::error::EvalError;
use crate::expr::{Binding, Expr};

impl Expr {
    /// Evaluates the expression at the binding.
    ///
    /// Non-finite intermediate values are propagated as is, only an unbound variable
    /// is an error.
    pub fn evaluate(&self, binding: &Binding<'_>) -> Result<f64, EvalError> {
        Ok(match self {
            Self::Constant(value) => *value,
            Self::Variable(variable) => binding
                .get(*variable)
                .ok_or(EvalError::Unbound(*variable))?,
            Self::Negate(operand) => -operand.evaluate(binding)?,
            Self::Add(left, right) => left.evaluate(binding)? + right.evaluate(binding)?,
            Self::Subtract(left, right) => left.evaluate(binding)? - right.evaluate(binding)?,
            Self::Multiply(left, right) => left.evaluate(binding)? * right.evaluate(binding)?,
            Self::Divide(left, right) => left.evaluate(binding)? / right.evaluate(binding)?,
            Self::Power(base, exponent) => evaluate_power(base, exponent, binding)?,
            Self::Call(function, argument) => function.apply(argument.evaluate(binding)?),
        })
    }
}

fn evaluate_power(
    base: &Expr,
    exponent: &Expr,
    binding: &Binding<'_>,
) -> Result<f64, EvalError> {
    let base = base.evaluate(binding)?;
    Ok(match exponent {
        // Integer exponents are the common case, `powi` is cheaper than `powf` for them.
        Expr::Constant(exponent) if is_small_integer(*exponent) => base.powi(*exponent as i32),
        _ => base.powf(exponent.evaluate(binding)?),
    })
}

fn is_small_integer(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() <= f64::from(i32::MAX)
}
