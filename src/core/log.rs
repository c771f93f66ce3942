//! Tracing subscriber setup for the CLI

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Logs go to stderr so that rate tables and CSV on stdout stay clean.
///
/// Without `verbose` only errors are logged, since the CLI already prints
/// fallback warnings; `RUST_LOG` overrides the dependency filter either way.
pub fn init_logging(verbose: bool) {
    let (app_level, default_directive) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::ERROR, "error")
    };
    let app_filter = Targets::new()
        .with_target(env!("CARGO_CRATE_NAME"), app_level)
        .with_default(LevelFilter::WARN);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();

    tracing_subscriber::registry()
        .with(layer.compact())
        .with(app_filter)
        .with(env_filter)
        .init();
}
