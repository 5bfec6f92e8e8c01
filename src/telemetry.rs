//! Logging initialization for embedding applications

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber: JSON log lines, filtered by
/// `RUST_LOG` with a `shopchat=info` default.
///
/// Call once at startup. No-op if a subscriber is already installed, so
/// embedders with their own logging setup can skip this entirely.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopchat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .try_init();
}
