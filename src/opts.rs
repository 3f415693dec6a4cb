//! Training options.

use clap::Args;
use serde::Deserialize;

use crate::prelude::*;

pub mod parsers;

/// Matrix factorization hyperparameters.
///
/// The struct may be flattened into an application's command line options
/// or deserialized from its configuration file.
#[derive(Args, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(default)]
pub struct Hyperparameters {
    /// Number of latent factors of every user and item
    #[arg(
        long = "mf-factors",
        default_value = "10",
        value_parser = parsers::non_zero_usize,
    )]
    pub n_factors: usize,

    /// Number of gradient descent epochs
    #[arg(long = "mf-epochs", default_value = "100")]
    pub n_epochs: usize,

    /// Gradient descent learning rate
    #[arg(
        long = "mf-lr",
        default_value = "0.001",
        value_parser = parsers::non_negative_f64,
    )]
    pub learning_rate: f64,

    /// L2 regularization coefficient
    #[arg(
        long = "mf-r",
        default_value = "0.01",
        value_parser = parsers::non_negative_f64,
    )]
    pub regularization: f64,

    /// Seed of the latent factor initialization
    #[arg(long = "mf-seed", default_value = "42")]
    pub seed: u64,

    /// Report the training progress
    #[arg(long = "mf-verbose")]
    pub verbose: bool,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            n_factors: 10,
            n_epochs: 100,
            learning_rate: 0.001,
            regularization: 0.01,
            seed: 42,
            verbose: false,
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> Result {
        ensure!(self.n_factors != 0, "expected a positive number of factors");
        ensure!(
            self.learning_rate.is_finite() && self.learning_rate >= 0.0,
            "invalid learning rate: {}",
            self.learning_rate,
        );
        ensure!(
            self.regularization.is_finite() && self.regularization >= 0.0,
            "invalid regularization: {}",
            self.regularization,
        );
        Ok(())
    }
}
