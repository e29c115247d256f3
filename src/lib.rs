//! Consilium: clinical entity extraction and canonicalization.
//!
//! Turns free-text consultation notes into structured case context,
//! canonical medication lists, and classified lab results. A local
//! reasoning model (Ollama-compatible) does the heavy lifting; every
//! oracle-backed step carries a deterministic fallback, so malformed or
//! missing model output degrades the result instead of failing the
//! call.

pub mod config;
pub mod models;
pub mod numeric;
pub mod oracle;
pub mod pipeline;
pub mod session;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the crate logs at info.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
