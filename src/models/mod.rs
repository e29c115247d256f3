//! Typed records flowing through the pipeline.
//!
//! Every record the extractors produce or the store holds lives here, with
//! its merge and completeness rules attached — what counts as "empty" and
//! which fields may overwrite which is code, not convention.

pub mod context;
pub mod enums;
pub mod lab;
pub mod medication;

pub use context::*;
pub use enums::*;
pub use lab::*;
pub use medication::*;
