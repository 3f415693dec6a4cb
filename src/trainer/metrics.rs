//! Prediction quality metrics.

use crate::dataset::RatingSource;
use crate::prelude::*;
use crate::trainer::Recommender;

#[derive(Default, Copy, Clone)]
pub struct RootMeanSquaredError {
    error: f64,
    count: usize,
}

impl RootMeanSquaredError {
    #[inline]
    pub fn push(&mut self, residual_error: f64) {
        self.error += residual_error * residual_error;
        self.count += 1;
    }

    #[must_use]
    pub fn average(&self) -> f64 {
        (self.error / self.count.max(1) as f64).sqrt()
    }
}

#[derive(Default, Copy, Clone)]
pub struct MeanAbsoluteError {
    error: f64,
    count: usize,
}

impl MeanAbsoluteError {
    #[inline]
    pub fn push(&mut self, residual_error: f64) {
        self.error += residual_error.abs();
        self.count += 1;
    }

    #[must_use]
    pub fn average(&self) -> f64 {
        self.error / self.count.max(1) as f64
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Metrics {
    pub mae: f64,
    pub rmse: f64,
}

/// Evaluates the predictions on the ratings, which must share the model's index space.
#[instrument(level = "info", skip_all, fields(n_ratings = ratings.n_ratings()))]
pub fn evaluate<R: RatingSource>(
    recommender: &Recommender<R>,
    ratings: &impl RatingSource,
) -> Result<Metrics> {
    let factors = recommender.factors();
    let mut mae = MeanAbsoluteError::default();
    let mut rmse = RootMeanSquaredError::default();

    for (user, item, rating) in ratings.iter_ratings() {
        ensure!(
            user < factors.n_users() && item < factors.n_items(),
            "rating of user #{} for item #{} is outside of the model",
            user,
            item,
        );
        let residual_error = rating - recommender.predict(user, item)?;
        mae.push(residual_error);
        rmse.push(residual_error);
    }

    let metrics = Metrics {
        mae: mae.average(),
        rmse: rmse.average(),
    };
    info!(mae = metrics.mae, rmse = metrics.rmse, "evaluated");
    Ok(metrics)
}
