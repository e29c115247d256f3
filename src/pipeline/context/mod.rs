//! Case context extraction from consultation transcripts.
//!
//! One oracle call pulls condition, description, demographics, and
//! candidate drugs out of a transcript under a strict JSON contract.
//! A regex pass over the transcript then fills in any demographics the
//! oracle missed; it never overrides an oracle-provided value. The
//! extractor never fails: with no oracle at all the result is whatever
//! the regex pass could find.

pub mod extract;
pub mod fallback;
pub mod prompt;

pub use extract::*;
pub use fallback::*;
pub use prompt::*;
