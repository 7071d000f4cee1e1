//! Data transfer objects for web requests and responses.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{ModeSet, ServiceTime, StopId};
use crate::search::{
    ConfigError, ReachRequest, ReachResult, ReachedStop, RouteSegment, SearchDefaults,
    SegmentKind,
};
use crate::timetable::{FeedTimetable, StopRecord};

/// Request body for `POST /reach`.
#[derive(Debug, Deserialize)]
pub struct ReachQuery {
    /// Stop the hider starts from
    pub start_stop_id: String,

    /// Start of the hiding period, e.g. "2025-01-20T09:00:00"
    pub start_time: NaiveDateTime,

    /// End of the hiding period. Takes precedence over the duration.
    pub end_time: Option<NaiveDateTime>,

    /// Length of the hiding period in minutes
    pub hide_duration_minutes: Option<i64>,

    /// Walking speed in metres per second
    pub walking_speed: Option<f64>,

    /// Comma separated route categories the hider may board
    pub travel_modes: Option<String>,

    /// Comma separated route categories that make a stop hideable
    pub hiding_modes: Option<String>,
}

impl ReachQuery {
    /// Resolve omitted fields from `defaults` and parse the mode lists.
    pub fn into_request(self, defaults: &SearchDefaults) -> Result<ReachRequest, ConfigError> {
        let start_stop = StopId::new(self.start_stop_id);
        let mut request = match self.end_time {
            Some(end) => ReachRequest::new(start_stop, self.start_time, end, defaults),
            None => ReachRequest::for_hide_duration(
                start_stop,
                self.start_time,
                self.hide_duration_minutes
                    .unwrap_or(defaults.hide_duration_mins),
                defaults,
            )?,
        };
        if let Some(modes) = self.travel_modes {
            request = request.with_travel_modes(ModeSet::parse_list(&modes)?);
        }
        if let Some(modes) = self.hiding_modes {
            request = request.with_hiding_modes(ModeSet::parse_list(&modes)?);
        }
        if let Some(speed) = self.walking_speed {
            request = request.with_walking_speed(speed);
        }
        Ok(request)
    }
}

/// Query string for `GET /stops/hiding`.
#[derive(Debug, Deserialize)]
pub struct HidingStopsQuery {
    /// Comma separated route categories (defaults to the hiding modes)
    pub modes: Option<String>,
}

/// A stop in a listing.
#[derive(Debug, Serialize, PartialEq)]
pub struct StopSummary {
    pub stop_id: String,
    pub name: String,
}

impl From<&StopRecord> for StopSummary {
    fn from(stop: &StopRecord) -> Self {
        Self {
            stop_id: stop.stop_id.to_string(),
            name: stop.name.clone(),
        }
    }
}

/// Response for `GET /feed`.
#[derive(Debug, Serialize)]
pub struct FeedInfo {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub stop_count: usize,
}

/// One step of a route.
#[derive(Debug, Serialize)]
pub struct StepView {
    /// "start", "transit", "walk" or "wait"
    pub kind: &'static str,
    pub label: String,
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    pub stop_id: String,
    pub stop_name: String,
}

impl StepView {
    fn from_segment(segment: &RouteSegment, feed: &FeedTimetable) -> Self {
        let kind = match segment.kind {
            SegmentKind::Start => "start",
            SegmentKind::Transit { .. } => "transit",
            SegmentKind::Walk { .. } => "walk",
            SegmentKind::Wait => "wait",
        };
        Self {
            kind,
            label: segment.label(),
            departure: segment.departure,
            arrival: segment.arrival,
            stop_id: segment.arrival_stop.to_string(),
            stop_name: feed.stop_name(&segment.arrival_stop),
        }
    }
}

/// A reachable stop in the `POST /reach` response.
#[derive(Debug, Serialize)]
pub struct ReachedStopView {
    pub stop_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub arrival_time: ServiceTime,
    pub is_valid_hiding_spot: bool,

    /// Route with wait segments filled in
    pub steps: Vec<StepView>,

    /// Human readable itinerary
    pub narrative: Vec<String>,
}

impl ReachedStopView {
    fn from_reached(stop: &ReachedStop, date: NaiveDate, feed: &FeedTimetable) -> Self {
        let record = feed.stop(&stop.stop_id);
        let steps = stop
            .path
            .with_waits()
            .iter()
            .map(|segment| StepView::from_segment(segment, feed))
            .collect();
        Self {
            stop_id: stop.stop_id.to_string(),
            name: feed.stop_name(&stop.stop_id),
            lat: record.map_or(f64::NAN, |r| r.lat),
            lon: record.map_or(f64::NAN, |r| r.lon),
            arrival_time: stop.arrival,
            is_valid_hiding_spot: stop.is_valid_hiding_spot,
            steps,
            narrative: stop.path.narrate(date, |id| feed.stop_name(id)),
        }
    }
}

/// Response for `POST /reach`.
#[derive(Debug, Serialize)]
pub struct ReachResponse {
    pub service_date: NaiveDate,
    pub trips_expanded: usize,
    pub stops: Vec<ReachedStopView>,
}

impl ReachResponse {
    pub fn from_result(result: &ReachResult, feed: &FeedTimetable) -> Self {
        Self {
            service_date: result.service_date,
            trips_expanded: result.trips_expanded,
            stops: result
                .stops
                .iter()
                .map(|stop| ReachedStopView::from_reached(stop, result.service_date, feed))
                .collect(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
