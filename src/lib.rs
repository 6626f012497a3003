//! # WCS Analyzer
//!
//! Scores how much each participant contributed to their team's result
//! over a batch of recent team matches (the Win Contribution Score).
//!
//! ## Architecture
//!
//! - **models**: Match records as served upstream, derived metrics and report types
//! - **calculate**: Percentiles, category scoring, medals, playstyle and batch aggregation
//! - **fetch**: Match service client and batch collection
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;

pub use models::*;
