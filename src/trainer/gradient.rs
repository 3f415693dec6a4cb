//! Batch gradients of the squared error over the full rating set.

use crate::dataset::RatingSource;
use crate::expr::{Binding, EvalError, Expr, Variable};
use crate::opts::Hyperparameters;
use crate::prelude::*;
use crate::trainer::factors::FactorStore;
use crate::trainer::metrics::RootMeanSquaredError;

/// Holds the partial derivatives of the model with respect to every factor variable.
pub struct GradientEngine {
    user_partials: Vec<Expr>,
    item_partials: Vec<Expr>,
}

/// Factor updates of a single epoch.
pub struct Deltas {
    pub factors: FactorStore,

    /// Training error of the factors the deltas are computed against.
    pub error: RootMeanSquaredError,
}

impl GradientEngine {
    #[instrument(level = "debug", skip_all, fields(n_factors = n_factors))]
    pub fn new(model: &Expr, n_factors: usize) -> Self {
        let partials = |variable: fn(usize) -> Variable| -> Vec<Expr> {
            (0..n_factors)
                .map(|index| {
                    let variable = variable(index);
                    let partial = model.derivative(variable);
                    trace!(%variable, %partial);
                    partial
                })
                .collect()
        };
        Self {
            user_partials: partials(Variable::User),
            item_partials: partials(Variable::Item),
        }
    }

    #[must_use]
    pub fn n_factors(&self) -> usize {
        self.user_partials.len()
    }

    /// Computes the factor deltas over all the ratings, leaving the factors intact.
    ///
    /// Every rating contributes `lr · (error · ∂f/∂x − λ · x)` to the delta of each
    /// of its user and item factors `x`, contributions are summed up over the epoch.
    pub fn compute(
        &self,
        model: &Expr,
        factors: &FactorStore,
        ratings: &impl RatingSource,
        hyperparameters: &Hyperparameters,
    ) -> Result<Deltas, EvalError> {
        debug_assert_eq!(factors.n_factors(), self.n_factors());
        debug_assert_eq!(factors.n_users(), ratings.n_users());
        debug_assert_eq!(factors.n_items(), ratings.n_items());

        let mut deltas = Deltas {
            factors: FactorStore::zeros(factors.n_users(), factors.n_items(), self.n_factors()),
            error: RootMeanSquaredError::default(),
        };
        let step = Step::from(hyperparameters);

        for user in 0..factors.n_users() {
            let user_factors = factors.user(user);
            for &(item, rating) in ratings.ratings_of(user) {
                let item_factors = factors.item(item);
                let binding = Binding::new(user_factors, item_factors);

                let residual_error = rating - model.evaluate(&binding)?;
                deltas.error.push(residual_error);

                step.accumulate(
                    deltas.factors.user_mut(user),
                    user_factors,
                    &self.user_partials,
                    &binding,
                    residual_error,
                )?;
                step.accumulate(
                    deltas.factors.item_mut(item),
                    item_factors,
                    &self.item_partials,
                    &binding,
                    residual_error,
                )?;
            }
        }

        Ok(deltas)
    }
}

#[derive(Copy, Clone)]
struct Step {
    learning_rate: f64,
    regularization: f64,
}

impl From<&Hyperparameters> for Step {
    fn from(hyperparameters: &Hyperparameters) -> Self {
        Self {
            learning_rate: hyperparameters.learning_rate,
            regularization: hyperparameters.regularization,
        }
    }
}

impl Step {
    /// See: <https://sifter.org/~simon/journal/20061211.html>.
    #[inline]
    fn accumulate(
        self,
        deltas: &mut [f64],
        factors: &[f64],
        partials: &[Expr],
        binding: &Binding<'_>,
        residual_error: f64,
    ) -> Result<(), EvalError> {
        for ((delta, factor), partial) in deltas.iter_mut().zip(factors).zip(partials) {
            let gradient = residual_error * partial.evaluate(binding)?;
            *delta += self.learning_rate * (gradient - self.regularization * factor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Ratings;
    use crate::expr::{parse, Formula};

    fn hyperparameters(learning_rate: f64, regularization: f64) -> Hyperparameters {
        Hyperparameters {
            n_factors: 1,
            learning_rate,
            regularization,
            ..Default::default()
        }
    }

    #[test]
    fn partials_ok() -> crate::Result {
        let engine = GradientEngine::new(&parse(&Formula::dot_product(2))?, 2);
        assert_eq!(engine.n_factors(), 2);
        assert_eq!(engine.user_partials, vec![parse("qi0")?, parse("qi1")?]);
        assert_eq!(engine.item_partials, vec![parse("pu0")?, parse("pu1")?]);
        Ok(())
    }

    #[test]
    fn single_rating_ok() -> crate::Result {
        let model = parse("pu0*qi0")?;
        let engine = GradientEngine::new(&model, 1);
        let ratings = Ratings::from_triples(1, 1, [(0, 0, 5.0)])?;
        let mut factors = FactorStore::zeros(1, 1, 1);
        factors.user_mut(0)[0] = 1.0;
        factors.item_mut(0)[0] = 1.0;

        let deltas = engine.compute(&model, &factors, &ratings, &hyperparameters(0.1, 0.0))?;
        assert!((deltas.factors.user(0)[0] - 0.4).abs() < 1e-12);
        assert!((deltas.factors.item(0)[0] - 0.4).abs() < 1e-12);
        assert!((deltas.error.average() - 4.0).abs() < 1e-12);

        // The factors are left intact.
        assert_eq!(factors.user(0), &[1.0]);
        Ok(())
    }

    #[test]
    fn regularization_ok() -> crate::Result {
        let model = parse("pu0*qi0")?;
        let engine = GradientEngine::new(&model, 1);
        let ratings = Ratings::from_triples(1, 1, [(0, 0, 3.0)])?;
        let mut factors = FactorStore::zeros(1, 1, 1);
        factors.user_mut(0)[0] = 2.0;
        factors.item_mut(0)[0] = 0.5;

        // error = 3 - 1 = 2
        let deltas = engine.compute(&model, &factors, &ratings, &hyperparameters(0.1, 0.5))?;
        assert!((deltas.factors.user(0)[0] - 0.1 * (2.0 * 0.5 - 0.5 * 2.0)).abs() < 1e-12);
        assert!((deltas.factors.item(0)[0] - 0.1 * (2.0 * 2.0 - 0.5 * 0.5)).abs() < 1e-12);
        Ok(())
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn population_mismatch() {
        let model = Expr::from(Variable::User(0)) * Expr::from(Variable::Item(0));
        let engine = GradientEngine::new(&model, 1);
        let ratings = Ratings::default();
        let factors = FactorStore::zeros(2, 1, 1);
        let _ = engine.compute(&model, &factors, &ratings, &hyperparameters(0.1, 0.0));
    }

    #[test]
    fn unbound_variable() -> crate::Result {
        let model = parse("pu0*qi1")?;
        let engine = GradientEngine::new(&model, 1);
        let ratings = Ratings::from_triples(1, 1, [(0, 0, 1.0)])?;
        let factors = FactorStore::zeros(1, 1, 1);
        let result = engine.compute(&model, &factors, &ratings, &hyperparameters(0.1, 0.0));
        assert_eq!(result.err(), Some(EvalError::Unbound(Variable::Item(1))));
        Ok(())
    }
}
