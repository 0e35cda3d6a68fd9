//! # Progress Module
//!
//! Turns the raw `(phase, percent, message)` reports of individual modules
//! into one session-wide [`AggregateProgress`] snapshot.
//!
//! ## Formula
//! With `T` modules, the module at index `i` running at `p` percent:
//! `overall = floor((i + p / 100) / T * 100)`. Completed sessions are pinned
//! to 100; cancelled and failed sessions keep their last value.

mod aggregator;
mod sink;

pub use aggregator::{overall_percent, AggregateProgress, ProgressAggregator};
pub use sink::{ModuleProgress, ProgressSink};
