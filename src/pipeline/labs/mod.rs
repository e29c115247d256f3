//! Laboratory-result extraction and classification.
//!
//! Two-stage detection: an oracle call with a strict JSON contract, then a
//! deterministic line grammar when the oracle produced nothing usable.
//! Detected values are normalized against the reference table, missing
//! ranges backfilled, and each value classified as normal, borderline, or
//! abnormal with a configurable borderline band.

pub mod classify;
pub mod extract;
pub mod grammar;
pub mod prompt;
pub mod reference;

pub use classify::*;
pub use extract::*;
pub use grammar::*;
pub use prompt::*;
pub use reference::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceTableError {
    #[error("failed to read reference data {0}: {1}")]
    Load(String, String),

    #[error("failed to parse reference data {0}: {1}")]
    Parse(String, String),

    #[error("invalid reference range for '{0}': low must be less than high")]
    InvalidRange(String),
}
