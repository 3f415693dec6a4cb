//! Commonly used prediction formulas.

use itertools::Itertools;

use crate::expr::Variable;

pub struct Formula;

impl Formula {
    /// Plain dot product: `pu0*qi0 + pu1*qi1 + …`.
    #[must_use]
    pub fn dot_product(n_factors: usize) -> String {
        (0..n_factors)
            .map(|index| format!("{}*{}", Variable::User(index), Variable::Item(index)))
            .join(" + ")
    }

    /// Dot product squashed into `(0, 1)` by the logistic function.
    #[must_use]
    pub fn logistic(n_factors: usize) -> String {
        format!("1 / (1 + exp(-({})))", Self::dot_product(n_factors))
    }
}
