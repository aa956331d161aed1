//! Log output setup for binaries built on illanet.
//!
//! Libraries only emit `tracing` events; installing a subscriber is up to
//! the program. [`init`] is a ready-made one: compact human-readable lines
//! on stderr, filtered by `RUST_LOG` if set and by `default_filter`
//! otherwise.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `RUST_LOG` nor an explicit filter is given.
pub const DEFAULT_FILTER: &str = "info,illanet=debug";

/// Installs the global subscriber.
///
/// Returns `false` if a subscriber was already installed (the first one
/// stays in place).
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init()
        .is_ok()
}
