//! Archive extraction.

pub mod engine;

pub use engine::Extractor;
pub use engine::Materialized;
