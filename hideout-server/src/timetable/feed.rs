//! In-memory timetable built from a JSON feed snapshot.
//!
//! The snapshot mirrors the GTFS tables the search needs (routes, stops,
//! calendars, trips, stop times). Loading validates every cross reference
//! and builds the per-stop and per-trip indexes once; queries afterwards are
//! read-only.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use super::calendar::ServiceCalendar;
use super::{Departure, ServicePeriod, Timetable, TimetableError, TripStop};
use crate::domain::{ModeSet, RouteCategory, RouteId, ServiceTime, StopId, TripId, UnknownMode};

/// Error loading a feed snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Could not read the snapshot file
    #[error("failed to read feed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot is not valid JSON for the expected schema
    #[error("failed to parse feed: {0}")]
    Json(#[from] serde_json::Error),

    /// A route has an unsupported `route_type`
    #[error("route {route}: {source}")]
    RouteType { route: RouteId, source: UnknownMode },

    /// A record refers to an id that is not defined
    #[error("{kind} {id} referenced by {from} is not defined")]
    Dangling {
        kind: &'static str,
        id: String,
        from: String,
    },

    /// The feed has no calendars, so no service period
    #[error("feed has no service calendars")]
    NoCalendars,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRow {
    pub route_id: RouteId,
    #[serde(default)]
    pub short_name: Option<String>,
    pub route_type: u16,
}

/// A stop with WGS84 coordinates.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct StopRecord {
    pub stop_id: StopId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripRow {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub service_id: String,
    #[serde(default)]
    pub direction_id: Option<u8>,
    #[serde(default)]
    pub headsign: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopTimeRow {
    pub trip_id: TripId,
    pub stop_id: StopId,
    pub stop_sequence: u32,
    pub arrival: ServiceTime,
    pub departure: ServiceTime,
}

/// The raw feed tables as stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSnapshot {
    #[serde(default)]
    pub routes: Vec<RouteRow>,
    #[serde(default)]
    pub stops: Vec<StopRecord>,
    #[serde(default)]
    pub calendars: Vec<ServiceCalendar>,
    #[serde(default)]
    pub trips: Vec<TripRow>,
    #[serde(default)]
    pub stop_times: Vec<StopTimeRow>,
}

#[derive(Debug)]
struct RouteInfo {
    short_name: Option<String>,
    category: RouteCategory,
}

/// One call at a stop, indexed by stop.
#[derive(Debug)]
struct StopCall {
    trip_id: TripId,
    arrival: ServiceTime,
    departure: ServiceTime,
    stop_sequence: u32,
}

/// Indexed, validated feed.
#[derive(Debug)]
pub struct FeedTimetable {
    stops: HashMap<StopId, StopRecord>,
    routes: HashMap<RouteId, RouteInfo>,
    trips: HashMap<TripId, TripRow>,
    calendars: HashMap<String, ServiceCalendar>,
    /// Calls per trip, sorted by stop sequence.
    trip_calls: HashMap<TripId, Vec<TripStop>>,
    /// Calls per stop, sorted by departure.
    stop_calls: HashMap<StopId, Vec<StopCall>>,
    stop_modes: HashMap<StopId, ModeSet>,
    period: ServicePeriod,
}

impl FeedTimetable {
    /// Read and index a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let snapshot: FeedSnapshot = serde_json::from_str(&raw)?;
        let feed = Self::from_snapshot(snapshot)?;
        info!(
            path = %path.display(),
            stops = feed.stops.len(),
            trips = feed.trips.len(),
            start = %feed.period.start,
            end = %feed.period.end,
            "Loaded feed"
        );
        Ok(feed)
    }

    /// Validate and index an already parsed snapshot.
    pub fn from_snapshot(snapshot: FeedSnapshot) -> Result<Self, LoadError> {
        let mut routes = HashMap::with_capacity(snapshot.routes.len());
        for row in snapshot.routes {
            let category =
                RouteCategory::from_code(row.route_type).map_err(|source| LoadError::RouteType {
                    route: row.route_id.clone(),
                    source,
                })?;
            routes.insert(
                row.route_id,
                RouteInfo {
                    short_name: row.short_name,
                    category,
                },
            );
        }

        let stops: HashMap<StopId, StopRecord> = snapshot
            .stops
            .into_iter()
            .map(|s| (s.stop_id.clone(), s))
            .collect();

        let period = snapshot
            .calendars
            .iter()
            .map(ServiceCalendar::span)
            .reduce(|(a_start, a_end), (b_start, b_end)| (a_start.min(b_start), a_end.max(b_end)))
            .map(|(start, end)| ServicePeriod { start, end })
            .ok_or(LoadError::NoCalendars)?;

        let calendars: HashMap<String, ServiceCalendar> = snapshot
            .calendars
            .into_iter()
            .map(|c| (c.service_id.clone(), c))
            .collect();

        let mut trips = HashMap::with_capacity(snapshot.trips.len());
        for trip in snapshot.trips {
            if !routes.contains_key(&trip.route_id) {
                return Err(LoadError::Dangling {
                    kind: "route",
                    id: trip.route_id.to_string(),
                    from: format!("trip {}", trip.trip_id),
                });
            }
            if !calendars.contains_key(&trip.service_id) {
                return Err(LoadError::Dangling {
                    kind: "service",
                    id: trip.service_id.clone(),
                    from: format!("trip {}", trip.trip_id),
                });
            }
            trips.insert(trip.trip_id.clone(), trip);
        }

        let mut trip_calls: HashMap<TripId, Vec<TripStop>> = HashMap::new();
        let mut stop_calls: HashMap<StopId, Vec<StopCall>> = HashMap::new();
        let mut stop_modes: HashMap<StopId, ModeSet> = HashMap::new();

        for row in snapshot.stop_times {
            let trip = trips.get(&row.trip_id).ok_or_else(|| LoadError::Dangling {
                kind: "trip",
                id: row.trip_id.to_string(),
                from: "stop_times".to_string(),
            })?;
            if !stops.contains_key(&row.stop_id) {
                return Err(LoadError::Dangling {
                    kind: "stop",
                    id: row.stop_id.to_string(),
                    from: format!("trip {}", row.trip_id),
                });
            }
            // Routes were checked when the trip was indexed.
            if let Some(route) = routes.get(&trip.route_id) {
                stop_modes
                    .entry(row.stop_id.clone())
                    .or_default()
                    .insert(route.category);
            }

            trip_calls.entry(row.trip_id.clone()).or_default().push(TripStop {
                stop_id: row.stop_id.clone(),
                arrival: row.arrival,
                stop_sequence: row.stop_sequence,
            });
            stop_calls.entry(row.stop_id).or_default().push(StopCall {
                trip_id: row.trip_id,
                arrival: row.arrival,
                departure: row.departure,
                stop_sequence: row.stop_sequence,
            });
        }

        for calls in trip_calls.values_mut() {
            calls.sort_by_key(|c| c.stop_sequence);
        }
        for calls in stop_calls.values_mut() {
            calls.sort_by(|a, b| {
                a.departure
                    .cmp(&b.departure)
                    .then_with(|| a.trip_id.cmp(&b.trip_id))
            });
        }

        debug!(
            routes = routes.len(),
            calendars = calendars.len(),
            "Indexed feed"
        );

        Ok(Self {
            stops,
            routes,
            trips,
            calendars,
            trip_calls,
            stop_calls,
            stop_modes,
            period,
        })
    }

    /// Look up a stop's name and coordinates.
    pub fn stop(&self, stop: &StopId) -> Option<&StopRecord> {
        self.stops.get(stop)
    }

    /// Every stop in the feed, in no particular order.
    pub fn stops(&self) -> impl Iterator<Item = &StopRecord> {
        self.stops.values()
    }

    /// Display name for a stop, falling back to its id.
    pub fn stop_name(&self, stop: &StopId) -> String {
        self.stops
            .get(stop)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| stop.to_string())
    }

    /// Stops served by at least one route in `modes`, sorted by name.
    pub fn stops_served_by(&self, modes: ModeSet) -> Vec<&StopRecord> {
        let mut matches: Vec<&StopRecord> = self
            .stops
            .values()
            .filter(|s| self.routes_serving(&s.stop_id).intersects(modes))
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.stop_id.cmp(&b.stop_id)));
        matches
    }

    fn runs_on(&self, trip: &TripRow, date: NaiveDate) -> bool {
        self.calendars
            .get(&trip.service_id)
            .is_some_and(|c| c.runs_on(date))
    }
}

impl Timetable for FeedTimetable {
    fn service_period(&self) -> ServicePeriod {
        self.period
    }

    fn contains_stop(&self, stop: &StopId) -> bool {
        self.stops.contains_key(stop)
    }

    fn stop_timetable(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Vec<Departure>, TimetableError> {
        if !self.contains_stop(stop) {
            return Err(TimetableError::UnknownStop(stop.clone()));
        }
        let Some(calls) = self.stop_calls.get(stop) else {
            return Ok(Vec::new());
        };

        let mut departures = Vec::new();
        for call in calls {
            let trip = self
                .trips
                .get(&call.trip_id)
                .ok_or_else(|| TimetableError::UnknownTrip(call.trip_id.clone()))?;
            if !self.runs_on(trip, date) {
                continue;
            }
            departures.push(Departure {
                trip_id: call.trip_id.clone(),
                route_id: trip.route_id.clone(),
                direction_id: trip.direction_id,
                arrival: call.arrival,
                departure: call.departure,
                stop_sequence: call.stop_sequence,
                headsign: trip.headsign.clone(),
            });
        }
        Ok(departures)
    }

    fn stops_after(
        &self,
        trip: &TripId,
        stop_sequence: u32,
    ) -> Result<Vec<TripStop>, TimetableError> {
        let calls = self
            .trip_calls
            .get(trip)
            .ok_or_else(|| TimetableError::UnknownTrip(trip.clone()))?;
        Ok(calls
            .iter()
            .filter(|c| c.stop_sequence > stop_sequence)
            .cloned()
            .collect())
    }

    fn routes_serving(&self, stop: &StopId) -> ModeSet {
        self.stop_modes.get(stop).copied().unwrap_or_default()
    }

    fn route_category(&self, trip: &TripId) -> Result<RouteCategory, TimetableError> {
        let row = self
            .trips
            .get(trip)
            .ok_or_else(|| TimetableError::UnknownTrip(trip.clone()))?;
        self.routes
            .get(&row.route_id)
            .map(|r| r.category)
            .ok_or_else(|| {
                TimetableError::Corrupt(format!("trip {trip} has unknown route {}", row.route_id))
            })
    }

    fn route_short_name(&self, route: &RouteId) -> Option<String> {
        self.routes.get(route).and_then(|r| r.short_name.clone())
    }
}
