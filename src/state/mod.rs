//! State module for tracking target progress
//!
//! `TargetStatus` is the only persisted state; the batch scheduler is its
//! sole writer.

mod target_status;

pub use target_status::TargetStatus;
