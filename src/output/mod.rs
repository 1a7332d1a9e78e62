//! Output module for sweep statistics and reports
//!
//! This module handles:
//! - Loading per-status target counts and run records
//! - Printing statistics and run summaries

pub mod stats;

pub use stats::{load_statistics, print_run_summary, print_statistics, SweepStatistics};
