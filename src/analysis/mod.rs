//! Analysis modules.
//!
//! Monthly aggregation lives in `aggregator`; the day-level plan status of
//! the roster lives in `roster`.

pub mod aggregator;
pub mod roster;

pub use aggregator::*;
pub use roster::*;
