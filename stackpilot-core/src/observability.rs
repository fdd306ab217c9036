//! Observability infrastructure: tracing subscriber setup and duration reporting.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"info"`) applies
/// to every target. Call once at startup.
pub fn init(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_level(true))
        .try_init()?;

    Ok(())
}

/// Human-readable elapsed time, switching to minutes beyond two minutes.
pub fn format_elapsed(elapsed: std::time::Duration) -> String {
    const MINUTE: u64 = 60;

    let secs = (elapsed.as_millis() as f64 / 1000.0).round() as u64;
    if secs > 2 * MINUTE {
        format!("Elapsed: {} minutes {} seconds", secs / MINUTE, secs % MINUTE)
    } else {
        format!("Elapsed: {} seconds", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_elapsed_seconds() {
        assert_eq!(format_elapsed(Duration::from_millis(400)), "Elapsed: 0 seconds");
        assert_eq!(format_elapsed(Duration::from_millis(1500)), "Elapsed: 2 seconds");
        assert_eq!(format_elapsed(Duration::from_secs(120)), "Elapsed: 120 seconds");
    }

    #[test]
    fn test_format_elapsed_minutes() {
        assert_eq!(format_elapsed(Duration::from_secs(121)), "Elapsed: 2 minutes 1 seconds");
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "Elapsed: 62 minutes 5 seconds");
    }
}
