//! Core data models for the analyzer.

mod ids;
mod match_record;
mod metrics;
mod report;

pub use ids::*;
pub use match_record::*;
pub use metrics::*;
pub use report::*;
