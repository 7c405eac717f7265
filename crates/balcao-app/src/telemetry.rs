//! Tracing subscriber set-up.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber. `RUST_LOG` wins over `filter` when set.
///
/// Safe to call more than once; only the first call installs anything.
/// Returns whether this call installed the subscriber.
pub fn init_tracing(filter: &str) -> bool {
  let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
  let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
    Ok(directives) if !directives.trim().is_empty() => builder.parse_lossy(directives),
    _ => builder.parse_lossy(filter),
  };

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .try_init()
    .is_ok()
}
