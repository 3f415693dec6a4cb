//! Matrix factorization recommender whose prediction formula is given at runtime.
//!
//! The crate only emits `tracing` events. A host binary installs the subscriber
//! with [`helpers::tracing::init`], filtered by `SYMFACTOR_LOG`.
//!
//! ```
//! use symfactor::dataset::Ratings;
//! use symfactor::expr::Formula;
//! use symfactor::opts::Hyperparameters;
//! use symfactor::trainer::{Recommender, TrainingState};
//!
//! # fn main() -> symfactor::Result {
//! let ratings = Ratings::from_triples(2, 2, [(0, 0, 5.0), (1, 1, 1.0)])?;
//! let hyperparameters = Hyperparameters {
//!     n_factors: 2,
//!     learning_rate: 0.01,
//!     ..Default::default()
//! };
//! let mut recommender = Recommender::new(&Formula::dot_product(2), ratings, hyperparameters)?;
//! assert_eq!(recommender.fit()?.state, TrainingState::Exhausted);
//! assert!(recommender.predict(0, 1)?.is_finite());
//! # Ok(())
//! # }
//! ```

pub use crate::prelude::Result;

pub mod dataset;
pub mod expr;
pub mod helpers;
pub mod opts;
pub mod prelude;
pub mod trainer;
