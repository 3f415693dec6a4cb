//! Symbolic differentiation.

use crate::expr::{Expr, Function, Variable};

impl Expr {
    /// Partial derivative with respect to the variable.
    ///
    /// The result is simplified by the arithmetic constructors, so, for instance,
    /// the derivative of `pu0*qi0` with respect to `pu0` is just `qi0`.
    #[must_use]
    pub fn derivative(&self, variable: Variable) -> Self {
        if !self.depends_on(variable) {
            return Self::ZERO;
        }
        match self {
            Self::Constant(_) => Self::ZERO,
            Self::Variable(other) if *other == variable => Self::ONE,
            Self::Variable(_) => Self::ZERO,
            Self::Negate(operand) => -operand.derivative(variable),
            Self::Add(left, right) => left.derivative(variable) + right.derivative(variable),
            Self::Subtract(left, right) => left.derivative(variable) - right.derivative(variable),
            Self::Multiply(left, right) => {
                left.derivative(variable) * *right.clone()
                    + *left.clone() * right.derivative(variable)
            }
            Self::Divide(numerator, denominator) => {
                (numerator.derivative(variable) * *denominator.clone()
                    - *numerator.clone() * denominator.derivative(variable))
                    / denominator.as_ref().clone().pow(Self::Constant(2.0))
            }
            Self::Power(base, exponent) => power_derivative(base, exponent, variable),
            Self::Call(function, argument) => {
                function.derivative(argument) * argument.derivative(variable)
            }
        }
    }
}

fn power_derivative(base: &Expr, exponent: &Expr, variable: Variable) -> Expr {
    if !exponent.depends_on(variable) {
        // d(a^c) = c·a^(c-1)·da
        exponent.clone()
            * base.clone().pow(exponent.clone() - Expr::ONE)
            * base.derivative(variable)
    } else if !base.depends_on(variable) {
        // d(c^b) = c^b·ln(c)·db
        base.clone().pow(exponent.clone())
            * Expr::call(Function::Ln, base.clone())
            * exponent.derivative(variable)
    } else {
        // d(a^b) = a^b·(db·ln(a) + b·da/a)
        base.clone().pow(exponent.clone())
            * (exponent.derivative(variable) * Expr::call(Function::Ln, base.clone())
                + exponent.clone() * base.derivative(variable) / base.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{parse, Binding};

    const PU0: Variable = Variable::User(0);
    const QI0: Variable = Variable::Item(0);

    /// Compares the symbolic derivative against a central finite difference.
    fn assert_matches_numeric(formula: &str, user: &[f64], item: &[f64]) -> crate::Result {
        const H: f64 = 1e-6;

        let expr = parse(formula)?;
        for variable in expr.variables() {
            let derivative = expr.derivative(variable);
            let analytic = derivative.evaluate(&Binding::new(user, item))?;

            let (mut user_plus, mut item_plus) = (user.to_vec(), item.to_vec());
            let (mut user_minus, mut item_minus) = (user.to_vec(), item.to_vec());
            match variable {
                Variable::User(index) => {
                    user_plus[index] += H;
                    user_minus[index] -= H;
                }
                Variable::Item(index) => {
                    item_plus[index] += H;
                    item_minus[index] -= H;
                }
            }
            let numeric = (expr.evaluate(&Binding::new(&user_plus, &item_plus))?
                - expr.evaluate(&Binding::new(&user_minus, &item_minus))?)
                / (2.0 * H);
            assert!(
                (analytic - numeric).abs() < 1e-5,
                "d({})/d{} = {}: {} vs {}",
                formula,
                variable,
                derivative,
                analytic,
                numeric,
            );
        }
        Ok(())
    }

    #[test]
    fn dot_product_derivative_ok() -> crate::Result {
        let expr = parse("pu0*qi0 + pu1*qi1")?;
        assert_eq!(expr.derivative(Variable::User(1)), parse("qi1")?);
        assert_eq!(expr.derivative(Variable::Item(0)), parse("pu0")?);
        assert_eq!(expr.derivative(Variable::User(2)), Expr::ZERO);
        Ok(())
    }

    #[test]
    fn polynomial_derivative_ok() -> crate::Result {
        assert_eq!(parse("pu0^3")?.derivative(PU0), parse("3*pu0^2")?);
        assert_eq!(parse("2*pu0 - qi0")?.derivative(QI0), Expr::Constant(-1.0));
        Ok(())
    }

    #[test]
    fn derivative_matches_numeric_ok() -> crate::Result {
        assert_matches_numeric("pu0*qi0 + pu1*qi1", &[0.3, 0.7], &[0.2, 0.9])?;
        assert_matches_numeric("1/(1 + exp(-(pu0*qi0 + pu1*qi1)))", &[0.3, 0.7], &[0.2, 0.9])?;
        assert_matches_numeric("(pu0 - qi0)^2 / (1 + pu1^2)", &[0.3, 0.7], &[0.2, 0.9])?;
        assert_matches_numeric("pu0^qi0", &[1.3], &[0.4])?;
        assert_matches_numeric("2^(pu0*qi0)", &[0.5], &[0.4])?;
        assert_matches_numeric("sin(pu0)*cos(qi0) + tan(pu0*qi0)", &[0.3], &[0.6])?;
        assert_matches_numeric("log(pu0 + qi0) + sqrt(pu0*qi0)", &[0.3], &[0.6])?;
        assert_matches_numeric("tanh(pu0 - qi0) + abs(pu0 - qi0)", &[0.3], &[0.6])?;
        assert_matches_numeric("-pu0/qi0", &[0.3], &[0.6])?;
        Ok(())
    }
}
