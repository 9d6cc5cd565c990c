//! Tracing setup for the `ld` binary.
//!
//! The subscriber is installed only when `LD_LOG` or `RUST_LOG` is set:
//!
//! ```bash
//! LD_LOG=debug ld desugar src/store.ts
//! LD_LOG="ld_desugar=trace" ld check src/store.ts
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// `LD_LOG` wins over `RUST_LOG` when both are set.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(value) = std::env::var("LD_LOG") {
        return Some(EnvFilter::builder().parse_lossy(value));
    }
    if std::env::var("RUST_LOG").is_ok() {
        return Some(EnvFilter::from_default_env());
    }
    None
}

/// Install the global subscriber. Output goes to stderr so it never mixes
/// with code printed on stdout.
pub fn init_tracing() {
    let Some(filter) = build_filter() else {
        return;
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time();

    // A subscriber may already be installed (e.g. by a test); keep it.
    let _ = Registry::default().with(filter).with(layer).try_init();
}
