//! Environment-driven runtime configuration.
//!
//! Pipes configuration has no file format of its own (unlike, say, the
//! `websearch` config structs in adjacent parts of this codebase) — it is a
//! single knob read once per worker.

use std::time::Duration;

/// Env var carrying the base poll interval, in fractional seconds.
pub const POLL_INTERVAL_ENV_VAR: &str = "PIPES_POLL_INTERVAL_SEC";

const DEFAULT_POLL_INTERVAL_SECS: f64 = 1.0;

/// Initial backoff delay on a poll failure.
pub const BACKOFF_INITIAL: Duration = Duration::from_secs(2);

/// Maximum backoff delay on repeated poll failures.
pub const BACKOFF_MAX: Duration = Duration::from_secs(300);

/// Reads the base poll interval from `PIPES_POLL_INTERVAL_SEC`, defaulting
/// to 1 second. An unparsable value falls back to the default rather than
/// failing worker construction.
#[must_use]
pub fn poll_interval() -> Duration {
    std::env::var(POLL_INTERVAL_ENV_VAR)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| *v > 0.0)
        .map_or(
            Duration::from_secs_f64(DEFAULT_POLL_INTERVAL_SECS),
            Duration::from_secs_f64,
        )
}
