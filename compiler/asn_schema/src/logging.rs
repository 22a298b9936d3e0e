//! Tracing setup for hosts and tests.
//!
//! The engine only emits `tracing` events; installing a subscriber is the
//! embedding program's choice. [`init_tracing`] is a convenience for tools and
//! test runs.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Environment variable holding the filter directive (e.g. `asn_schema=debug`).
pub const LOG_ENV: &str = "ASN_LOG";

/// Environment variable switching to hierarchical (indented span tree) output.
pub const LOG_TREE_ENV: &str = "ASN_LOG_TREE";

/// Initialize tracing output.
///
/// Reads the filter from `ASN_LOG`, falling back to `RUST_LOG`; does nothing
/// when neither is set. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let directive = std::env::var(LOG_ENV).or_else(|_| std::env::var("RUST_LOG"));
        let Ok(directive) = directive else {
            return;
        };
        let filter = EnvFilter::new(directive);

        if std::env::var(LOG_TREE_ENV).is_ok_and(|v| v == "1") {
            let _ = tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .try_init();
        } else {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
