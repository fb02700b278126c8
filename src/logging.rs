//! Log output for the binary.
//!
//! Logs go to stderr so they never mix with generated text on stdout. The
//! library only emits `tracing` events; installing a subscriber is left to
//! the binary.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(debug: bool) -> &'static str {
    if debug { "sgpt=debug,info" } else { "info" }
}

/// The stderr fmt subscriber for `filter`, not yet installed.
pub fn subscriber(filter: EnvFilter, debug: bool) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .finish()
}

/// Install the global fmt subscriber. `RUST_LOG` overrides the level.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));
    let _ = subscriber(filter, debug).try_init();
}
