//! Timetable query interface.
//!
//! The reachability engine never reads a feed directly. It asks a
//! [`Timetable`] for the departures at a stop on a service date and for the
//! remaining calls of a trip. [`FeedTimetable`] is the in-memory
//! implementation backed by a JSON feed snapshot; tests use small hand-built
//! timetables.

mod cache;
mod calendar;
mod feed;

use chrono::NaiveDate;

use crate::domain::{ModeSet, RouteCategory, RouteId, ServiceTime, StopId, TripId};

pub use cache::{CacheConfig, TimetableCache};
pub use calendar::ServiceCalendar;
pub use feed::{FeedSnapshot, FeedTimetable, LoadError, StopRecord};

/// Error from a timetable query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableError {
    /// The stop is not in the timetable index
    #[error("unknown stop: {0}")]
    UnknownStop(StopId),

    /// The trip is not in the timetable index
    #[error("unknown trip: {0}")]
    UnknownTrip(TripId),

    /// The underlying data is inconsistent
    #[error("corrupt timetable data: {0}")]
    Corrupt(String),
}

/// A scheduled call at a stop that a traveler could board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub trip_id: TripId,
    pub route_id: RouteId,
    /// GTFS `direction_id`; `None` when the feed leaves it blank.
    pub direction_id: Option<u8>,
    /// Arrival of the trip at this stop.
    pub arrival: ServiceTime,
    /// Departure of the trip from this stop.
    pub departure: ServiceTime,
    /// Position of this call within the trip.
    pub stop_sequence: u32,
    pub headsign: Option<String>,
}

/// A later call on a trip, as returned by [`Timetable::stops_after`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripStop {
    pub stop_id: StopId,
    pub arrival: ServiceTime,
    pub stop_sequence: u32,
}

/// The inclusive range of dates a feed has schedules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ServicePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ServicePeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Read-only access to scheduled service.
///
/// Implementations are shared between concurrent searches and must not
/// mutate on read.
pub trait Timetable {
    /// Dates this timetable has schedules for.
    fn service_period(&self) -> ServicePeriod;

    /// Whether the stop exists in the timetable index.
    fn contains_stop(&self, stop: &StopId) -> bool;

    /// All calls at `stop` by trips running on `date`, sorted by departure.
    fn stop_timetable(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Vec<Departure>, TimetableError>;

    /// Calls of `trip` strictly after `stop_sequence`, in sequence order.
    fn stops_after(&self, trip: &TripId, stop_sequence: u32)
    -> Result<Vec<TripStop>, TimetableError>;

    /// Categories of every route that calls at `stop`.
    fn routes_serving(&self, stop: &StopId) -> ModeSet;

    /// Category of the route a trip belongs to.
    fn route_category(&self, trip: &TripId) -> Result<RouteCategory, TimetableError>;

    /// Public short name of a route, e.g. "583".
    fn route_short_name(&self, route: &RouteId) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_period_is_inclusive() {
        let period = ServicePeriod {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        };
        assert!(period.contains(period.start));
        assert!(period.contains(period.end));
        assert!(period.contains(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            TimetableError::UnknownStop(StopId::new("X")).to_string(),
            "unknown stop: X"
        );
        assert_eq!(
            TimetableError::UnknownTrip(TripId::new("T9")).to_string(),
            "unknown trip: T9"
        );
    }
}
