//! Medication line parsing and canonicalization.
//!
//! Free-text lines become [`MedicationMention`]s through a fixed-order
//! composite grammar, then the whole batch goes to the mapping oracle in
//! one call to resolve lowercase generic names. Canonical names produce
//! deterministic slug identifiers, and identifiers shared within a batch
//! flag duplicates. Every stage degrades rather than fails: unparsable
//! lines are dropped, an unreachable oracle leaves parsed fields as-is.
//!
//! [`MedicationMention`]: crate::models::MedicationMention

pub mod canonical;
pub mod parser;
pub mod prompt;
pub mod slug;

pub use canonical::*;
pub use parser::*;
pub use prompt::*;
pub use slug::*;
