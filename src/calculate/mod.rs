//! Win Contribution Score engine.
//!
//! Computes everything in a [`Report`](crate::models::Report) from an
//! in-memory match batch:
//! - Team and winner inference from rating deltas
//! - Per-participant derived metrics
//! - Mid-rank percentile category scores and the weighted WCS
//! - Cross-match averages, trend and playstyle profile
//! - Display rosters and per-team medals
//!
//! Everything here is pure and synchronous. No state survives a call, so
//! the same batch always produces the same report.

pub mod aggregate;
pub mod analyzer;
pub mod extract;
pub mod medals;
pub mod percentile;
pub mod playstyle;
pub mod resolver;
pub mod roster;
pub mod scorer;

use thiserror::Error;

pub use analyzer::{Analyzer, UnitNameLookup};
pub use percentile::percentile;

/// Errors that can occur during analysis.
///
/// Missing fields never surface here; they degrade to neutral defaults.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A fault not caused by the input batch.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Divide, returning `fallback` unless the denominator is positive.
pub fn safe_divide(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        fallback
    }
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
