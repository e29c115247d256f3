//! Extraction pipeline stages: case context, medications, labs.

pub mod context;
pub mod labs;
pub mod meds;
