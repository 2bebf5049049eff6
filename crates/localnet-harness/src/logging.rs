//! Log subscriber setup for harness consumers.
//!
//! Test suites call [`init`] once from a suite fixture. Repeated calls are
//! no-ops, so every test binary in a workspace can call it unconditionally.

use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Installs a fmt subscriber filtered by `RUST_LOG` (default `info`).
pub fn init() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).with_ansi(true);
        // The embedding binary may have installed a subscriber already;
        // losing that race is fine.
        let _ = tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init();
    });
}
