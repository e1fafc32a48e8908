//! Kofl driver.
//!
//! Ties lowering and evaluation together:
//! - [`Session`]: lowers and evaluates units one after another against a
//!   persistent type scope and global environment, REPL style.
//! - [`Program`]: runs a unit, then its `main` entry point.

mod error;
mod program;
mod session;

pub use error::SessionError;
pub use program::Program;
pub use session::{Session, SessionConfig};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=kofl_eval=debug` or `RUST_LOG=kofl_canon=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        }
    });
}
