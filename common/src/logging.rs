//! Structured logging initialization
//!
//! Diagnostic logs go to stderr so that the operator-facing report on
//! stdout stays readable.

use std::env;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Guard that keeps the tracing subscriber active.
/// Drop this at the end of main to flush logs.
pub struct LogGuard;

/// Initialize structured logging for a component.
///
/// `RUST_LOG` directives win when present; otherwise `default_level` applies.
/// Returns a guard that should be held for the lifetime of the program.
///
/// # Example
/// ```ignore
/// let _guard = init_logging("setup-database", Level::WARN);
/// info!("Starting up...");
/// ```
pub fn init_logging(component: &str, default_level: Level) -> LogGuard {
    let directives = env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let filter = build_filter(default_level, &directives);

    let format = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // A second initialization (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init();

    tracing::debug!(component, "Logging initialized");

    LogGuard
}

/// Filter from `RUST_LOG`-style directives, falling back to `default_level`
/// when there are none. Invalid directives are skipped.
fn build_filter(default_level: Level, directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(directives)
}
