use crate::helpers::tracing::format_elapsed;
use crate::prelude::*;

const TICK_EPOCHS: usize = 10;
const COUNT_EPOCHS: usize = 100;

/// Training progress reporter, a no-op unless verbose.
pub struct Progress {
    verbose: bool,
    start_instant: Instant,
}

impl Progress {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            start_instant: Instant::now(),
        }
    }

    pub fn report(&self, epoch: usize, train_rmse: f64) {
        if !self.verbose {
            return;
        }
        if is_tick(epoch) {
            info!(epoch, train_rmse, ".");
        }
        if is_count(epoch) {
            info!(elapsed = format_elapsed(self.start_instant).as_str(), "{} epochs", epoch);
        }
    }
}

const fn is_tick(epoch: usize) -> bool {
    epoch % TICK_EPOCHS == 0
}

const fn is_count(epoch: usize) -> bool {
    epoch % COUNT_EPOCHS == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_ok() {
        assert!(!is_tick(9));
        assert!(is_tick(10));
        assert!(is_tick(100));
        assert!(!is_count(10));
        assert!(is_count(100));
        assert!(is_count(300));
    }
}
