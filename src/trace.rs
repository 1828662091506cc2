//! Tracing initialization for the command-line tools.
//!
//! Console output respects the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=faultline=debug` - this crate only
//! - `RUST_LOG=faultline::coordinator=trace` - module-level filtering

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the tracing subscriber with console logging.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(filter))
        .init();
}
