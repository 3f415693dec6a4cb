//! Trains the user and item factors against the observed ratings.
//!
//! Implements a full-batch gradient descent over an arbitrary prediction formula:
//! every epoch computes the deltas for all the ratings against the same factors
//! and only then applies them.

use itertools::Itertools;

use crate::dataset::RatingSource;
use crate::expr::{parse, Expr};
use crate::helpers::tracing::format_elapsed;
use crate::opts::Hyperparameters;
use crate::prelude::*;
use crate::trainer::factors::FactorStore;
use crate::trainer::gradient::GradientEngine;
use crate::trainer::progress::Progress;

pub mod factors;
pub mod gradient;
pub mod metrics;
pub mod progress;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrainingState {
    Running,

    /// All the epochs have been run.
    Exhausted,

    /// Some factor has become `NaN` or infinite, the model must be discarded.
    Diverged,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FitReport {
    pub state: TrainingState,

    /// Number of the applied factor updates.
    pub n_updates: usize,
}

pub struct Recommender<R> {
    ratings: R,
    hyperparameters: Hyperparameters,
    model: Expr,
    gradients: GradientEngine,
    factors: FactorStore,
}

impl<R: RatingSource> Recommender<R> {
    /// Parses the formula, differentiates it and initializes the factors.
    #[instrument(level = "info", skip_all, fields(formula = formula))]
    pub fn new(formula: &str, ratings: R, hyperparameters: Hyperparameters) -> Result<Self> {
        hyperparameters.validate()?;
        ratings.validate()?;

        let model =
            parse(formula).with_context(|| format!("failed to parse the formula `{}`", formula))?;
        let n_factors = hyperparameters.n_factors;
        if let Some(variable) = model
            .variables()
            .into_iter()
            .find(|variable| variable.index() >= n_factors)
        {
            bail!("variable `{}` is out of range for {} factors", variable, n_factors);
        }

        let gradients = GradientEngine::new(&model, n_factors);
        let factors = FactorStore::initialize(
            ratings.n_users(),
            ratings.n_items(),
            n_factors,
            hyperparameters.seed,
        );
        info!(
            n_users = ratings.n_users(),
            n_items = ratings.n_items(),
            n_ratings = ratings.n_ratings(),
            n_factors = n_factors,
            "initialized",
        );

        Ok(Self {
            ratings,
            hyperparameters,
            model,
            gradients,
            factors,
        })
    }

    /// Runs the gradient descent until the epochs are exhausted or the factors diverge.
    ///
    /// Calling it again continues from the current factors.
    #[instrument(level = "info", skip_all, fields(n_epochs = self.hyperparameters.n_epochs))]
    pub fn fit(&mut self) -> Result<FitReport> {
        let start_instant = Instant::now();
        let progress = Progress::new(self.hyperparameters.verbose);
        let n_epochs = self.hyperparameters.n_epochs;

        let mut n_updates = 0;
        let mut state = if n_epochs != 0 {
            TrainingState::Running
        } else {
            TrainingState::Exhausted
        };

        while state == TrainingState::Running {
            let deltas = self.gradients.compute(
                &self.model,
                &self.factors,
                &self.ratings,
                &self.hyperparameters,
            )?;
            self.factors.apply(&deltas.factors);
            n_updates += 1;

            let train_rmse = deltas.error.average();
            debug!(epoch = n_updates, train_rmse);
            progress.report(n_updates, train_rmse);

            state = if !self.is_valid() {
                warn!(epoch = n_updates, train_rmse, "diverged");
                TrainingState::Diverged
            } else if n_updates < n_epochs {
                TrainingState::Running
            } else {
                TrainingState::Exhausted
            };
        }

        info!(
            ?state,
            n_updates,
            elapsed = format_elapsed(start_instant).as_str(),
            "finished",
        );
        Ok(FitReport { state, n_updates })
    }

    /// Evaluates the formula at the current user and item factors.
    ///
    /// The prediction of a diverged model is not guaranteed to be finite.
    pub fn predict(&self, user: usize, item: usize) -> Result<f64> {
        Ok(self.model.evaluate(&self.factors.binding(user, item))?)
    }

    /// Checks that all the factors are finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.factors.is_finite()
    }

    /// Returns up to `n` items which the user hasn't rated yet, best predictions first.
    #[instrument(level = "debug", skip(self))]
    pub fn recommend(&self, user: usize, n: usize) -> Result<Vec<(usize, f64)>> {
        let mut is_rated = vec![false; self.factors.n_items()];
        for (item, _) in self.ratings.ratings_of(user) {
            is_rated[*item] = true;
        }
        let predictions = (0..self.factors.n_items())
            .filter(|item| !is_rated[*item])
            .map(|item| self.predict(user, item).map(|prediction| (item, prediction)))
            .filter_ok(|(_, prediction): &(usize, f64)| prediction.is_finite())
            .collect::<Result<Vec<_>>>()?;
        Ok(predictions
            .into_iter()
            .sorted_by(|(_, lhs), (_, rhs)| rhs.total_cmp(lhs))
            .take(n)
            .collect())
    }

    #[must_use]
    pub const fn factors(&self) -> &FactorStore {
        &self.factors
    }

    /// Gives access to the factors, for example, to seed them with known values.
    pub fn factors_mut(&mut self) -> &mut FactorStore {
        &mut self.factors
    }

    #[must_use]
    pub const fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    #[must_use]
    pub const fn model(&self) -> &Expr {
        &self.model
    }

    #[must_use]
    pub const fn ratings(&self) -> &R {
        &self.ratings
    }
}
