use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::prelude::*;

/// Initialises tracing for an application which trains the models.
///
/// The filter is read from `SYMFACTOR_LOG` and defaults to `symfactor=info`.
pub fn init() -> Result {
    let format_filter = EnvFilter::try_from_env("SYMFACTOR_LOG")
        .or_else(|_| EnvFilter::try_new("symfactor=info"))?;
    let format_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_filter(format_filter);

    tracing_subscriber::registry()
        .with(format_layer)
        .try_init()
        .context("failed to initialise tracing")
}

pub fn format_duration(duration: Duration) -> String {
    humantime::format_duration(duration).to_string()
}

pub fn format_elapsed(instant: Instant) -> String {
    format_duration(instant.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_once_ok() {
        // Whichever call comes first installs the global subscriber, the next one must fail.
        let _ = init();
        assert!(init().is_err());
    }

    #[test]
    fn format_duration_ok() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1s 500ms");
    }
}
