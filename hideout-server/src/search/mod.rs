//! Reachability search.
//!
//! Answers "starting at this stop at this time, which stops can I reach
//! before the deadline, how, and which of them are good places to hide?"
//!
//! The search is an earliest-arrival label-setting algorithm over scheduled
//! trips and walking transfers. Each run owns its own frontier, labels and
//! path arena; only the timetable, geometry and slice cache are shared.

mod config;
mod engine;
mod explain;
mod frontier;
mod labels;
mod path;
mod reach;

#[cfg(test)]
mod engine_tests;

use crate::domain::StopId;
use crate::geometry::GeometryError;
use crate::timetable::TimetableError;

pub use config::{ConfigError, SearchDefaults, deadline_after};
pub use engine::{ReachabilityEngine, SearchOutcome, SearchQuery};
pub use labels::Label;
pub use path::{RouteSegment, SegmentKind, SegmentPath};
pub use reach::{ReachRequest, ReachResult, ReachedStop, find_reachable};

/// Error from a reachability search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReachError {
    /// The request was rejected before searching
    #[error("invalid request: {0}")]
    Config(#[from] ConfigError),

    /// The start stop is not in the timetable
    #[error("unknown start stop: {0}")]
    UnknownStartStop(StopId),

    /// A timetable lookup failed mid-search
    #[error("timetable lookup failed: {0}")]
    Timetable(#[from] TimetableError),

    /// A geometry lookup failed mid-search
    #[error("geometry lookup failed: {0}")]
    Geometry(#[from] GeometryError),
}
