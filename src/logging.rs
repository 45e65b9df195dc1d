//! Unified logging for debug output.
//!
//! Provides `RUST_LOG`-driven, per-module level configuration on top of
//! `tracing-subscriber`.
//!
//! # Environment Variable
//!
//! `RUST_LOG` takes precedence over the default filter:
//! ```bash
//! RUST_LOG=debug codanna-kgraph index .
//! RUST_LOG=kotlin=trace,pipeline=debug codanna-kgraph index .
//! ```

use std::sync::Once;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static INIT: Once = Once::new();

/// Initialize logging once at startup. Safe to call multiple times (only
/// the first call takes effect).
///
/// Log levels control visibility:
/// - `error` - errors only (quietest)
/// - `warn` - errors + warnings (default, quiet operation)
/// - `info` - normal operation logs
/// - `debug` - detailed debugging
/// - `trace` - everything
pub fn init() {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new("warn")
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(filter))
            .init();
    });
}
