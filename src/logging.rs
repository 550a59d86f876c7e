// src/logging.rs

//! Diagnostics via `tracing`, written to stderr so they never interleave
//! with the turn response on stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `kov=debug` in debug mode, `warn` if not.
/// Calling this twice is harmless (the second install is ignored).
pub fn init(debug: bool) {
    let fallback = if debug { "kov=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
