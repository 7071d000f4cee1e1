//! Domain types for the reachability search.
//!
//! Identifiers, service-day times and route categories. All types enforce
//! their invariants at construction time, so code that receives them can
//! trust their validity.

mod ids;
mod mode;
mod time;

pub use ids::{RouteId, StopId, TripId};
pub use mode::{ModeSet, RouteCategory, UnknownMode};
pub use time::{ServiceTime, TimeError, format_minutes_seconds};
