//! Revlink tracker client
//!
//! REST implementation of the `revlink_core::Tracker` seam for JIRA-style
//! issue trackers.

pub mod client;
pub mod error;

pub use client::RestTracker;
pub use error::{Result, TrackerError};
