//! Reasoning-oracle boundary.
//!
//! Every probabilistic extraction in the pipeline goes through one seam: a
//! blocking text-in/text-out call to an external reasoning service. The
//! extractors depend only on the [`OracleClient`] trait, so tests swap in
//! [`MockOracleClient`] and production wires up [`OllamaClient`].
//!
//! The oracle is allowed to misbehave: responses wrapped in code fences,
//! prose around the JSON, truncated output. [`json`] holds the shared
//! tolerant-parse chain that absorbs all of that.

pub mod json;
pub mod ollama;

pub use ollama::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("reasoning service is not reachable at {0}")]
    Connection(String),

    #[error("reasoning service call timed out after {0}s")]
    Timeout(u64),

    #[error("reasoning service returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Transport(String),

    #[error("response decoding error: {0}")]
    Decode(String),
}

/// A blocking client for the external reasoning service.
///
/// One call, one prompt, one text response. Timeout and endpoint selection
/// are implementation concerns fixed at construction; the pipeline treats
/// every error identically — log it and fall back to the deterministic
/// path.
pub trait OracleClient: Send + Sync {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, OracleError>;
}
