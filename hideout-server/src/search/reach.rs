//! The public entry point: where can the hider get to, and where can they
//! hide?

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use super::ReachError;
use super::config::{ConfigError, SearchDefaults, deadline_after};
use super::engine::{ReachabilityEngine, SearchQuery};
use super::path::SegmentPath;
use crate::domain::{ModeSet, ServiceTime, StopId};
use crate::geometry::Geometry;
use crate::timetable::{ServicePeriod, Timetable, TimetableCache};

/// A reachability query as the caller states it.
#[derive(Debug, Clone)]
pub struct ReachRequest {
    pub start_stop: StopId,
    pub start: NaiveDateTime,
    pub deadline: NaiveDateTime,
    pub travel_modes: ModeSet,
    pub hiding_modes: ModeSet,
    /// Metres per second. Zero or negative disables walking.
    pub walking_speed: f64,
}

impl ReachRequest {
    /// A request running until `deadline`, with modes and walking speed
    /// taken from `defaults`.
    pub fn new(
        start_stop: StopId,
        start: NaiveDateTime,
        deadline: NaiveDateTime,
        defaults: &SearchDefaults,
    ) -> Self {
        Self {
            start_stop,
            start,
            deadline,
            travel_modes: defaults.travel_modes,
            hiding_modes: defaults.hiding_modes,
            walking_speed: defaults.walking_speed,
        }
    }

    /// A request whose deadline is `minutes` after `start`.
    pub fn for_hide_duration(
        start_stop: StopId,
        start: NaiveDateTime,
        minutes: i64,
        defaults: &SearchDefaults,
    ) -> Result<Self, ConfigError> {
        let deadline = deadline_after(start, minutes)?;
        Ok(Self::new(start_stop, start, deadline, defaults))
    }

    pub fn with_travel_modes(mut self, modes: ModeSet) -> Self {
        self.travel_modes = modes;
        self
    }

    pub fn with_hiding_modes(mut self, modes: ModeSet) -> Self {
        self.hiding_modes = modes;
        self
    }

    pub fn with_walking_speed(mut self, speed: f64) -> Self {
        self.walking_speed = speed;
        self
    }

    /// Check the request against a feed's service period and convert it to
    /// service-day terms.
    pub fn validate(&self, period: ServicePeriod) -> Result<SearchQuery, ConfigError> {
        if self.travel_modes.is_empty() {
            return Err(ConfigError::EmptyTravelModes);
        }
        if self.hiding_modes.is_empty() {
            return Err(ConfigError::EmptyHidingModes);
        }
        if self.walking_speed.is_infinite() || self.walking_speed.is_nan() {
            return Err(ConfigError::InvalidWalkingSpeed(self.walking_speed));
        }
        let before_start = ConfigError::DeadlineBeforeStart {
            start: self.start,
            deadline: self.deadline,
        };
        if self.deadline < self.start {
            return Err(before_start);
        }
        for (which, date) in [("start", self.start.date()), ("end", self.deadline.date())] {
            if !period.contains(date) {
                return Err(ConfigError::OutsideServicePeriod {
                    which,
                    date,
                    period,
                });
            }
        }

        let service_date = self.start.date();
        let start_time =
            ServiceTime::since_midnight(service_date, self.start).ok_or(before_start.clone())?;
        let deadline =
            ServiceTime::since_midnight(service_date, self.deadline).ok_or(before_start)?;
        Ok(SearchQuery {
            start_stop: self.start_stop.clone(),
            service_date,
            start_time,
            deadline,
            travel_modes: self.travel_modes,
            walking_speed: self.walking_speed,
        })
    }
}

/// A stop the hider can reach.
#[derive(Debug, Clone)]
pub struct ReachedStop {
    pub stop_id: StopId,
    pub arrival: ServiceTime,
    /// Fastest route here, without wait segments.
    pub path: SegmentPath,
    /// Served by at least one hiding-mode route.
    pub is_valid_hiding_spot: bool,
}

/// Every reachable stop, earliest arrival first.
#[derive(Debug, Clone)]
pub struct ReachResult {
    pub service_date: NaiveDate,
    pub stops: Vec<ReachedStop>,
    pub trips_expanded: usize,
    index: HashMap<StopId, usize>,
}

impl ReachResult {
    pub fn get(&self, stop: &StopId) -> Option<&ReachedStop> {
        self.index.get(stop).map(|&i| &self.stops[i])
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Reachable stops that are valid hiding spots.
    pub fn hiding_spots(&self) -> impl Iterator<Item = &ReachedStop> {
        self.stops.iter().filter(|s| s.is_valid_hiding_spot)
    }
}

/// Find every stop reachable from the request's start before its deadline.
pub fn find_reachable<T, G>(
    timetable: &T,
    geometry: &G,
    cache: &TimetableCache,
    request: &ReachRequest,
) -> Result<ReachResult, ReachError>
where
    T: Timetable + ?Sized,
    G: Geometry + ?Sized,
{
    let query = request.validate(timetable.service_period())?;
    let outcome = ReachabilityEngine::new(timetable, geometry, cache).search(&query)?;

    let mut stops = Vec::with_capacity(outcome.len());
    for (stop_id, label) in outcome.reached() {
        let Some(path) = outcome.path(stop_id) else {
            continue;
        };
        stops.push(ReachedStop {
            stop_id: stop_id.clone(),
            arrival: label.best_arrival,
            path,
            is_valid_hiding_spot: timetable
                .routes_serving(stop_id)
                .intersects(request.hiding_modes),
        });
    }
    let index = stops
        .iter()
        .enumerate()
        .map(|(i, s)| (s.stop_id.clone(), i))
        .collect();

    let result = ReachResult {
        service_date: query.service_date,
        stops,
        trips_expanded: outcome.trips_expanded,
        index,
    };
    info!(
        start = %request.start_stop,
        reached = result.len(),
        hiding_spots = result.hiding_spots().count(),
        trips_expanded = result.trips_expanded,
        "Reachability search complete"
    );
    Ok(result)
}
