//! Earliest-arrival label-setting search.
//!
//! The engine pops candidate paths in (arrival, hops) order. The first path
//! popped for a stop is final for that stop; it is then expanded by boarding
//! every useful trip that departs after the arrival and by walking to nearby
//! stops. Nothing is pushed that could not arrive by the deadline.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use tracing::{debug, trace};

use super::ReachError;
use super::frontier::Frontier;
use super::labels::{Label, LabelStore};
use super::path::{PathArena, PathId, RouteSegment, SegmentPath};
use crate::domain::{ModeSet, RouteId, ServiceTime, StopId};
use crate::geometry::Geometry;
use crate::timetable::{Departure, Timetable, TimetableCache};

/// A validated search, in service-day terms.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub start_stop: StopId,
    pub service_date: NaiveDate,
    pub start_time: ServiceTime,
    pub deadline: ServiceTime,
    pub travel_modes: ModeSet,
    /// Metres per second. Zero or negative disables walking.
    pub walking_speed: f64,
}

/// Everything a finished search found.
#[derive(Debug)]
pub struct SearchOutcome {
    arena: PathArena,
    reached: Vec<(StopId, PathId)>,
    index: HashMap<StopId, usize>,
    /// Distinct trips whose later stops were expanded.
    pub trips_expanded: usize,
    /// Frontier pops, including discarded ones.
    pub pops: usize,
}

impl SearchOutcome {
    fn new(arena: PathArena, reached: Vec<(StopId, PathId)>, trips_expanded: usize, pops: usize) -> Self {
        let index = reached
            .iter()
            .enumerate()
            .map(|(i, (stop, _))| (stop.clone(), i))
            .collect();
        Self {
            arena,
            reached,
            index,
            trips_expanded,
            pops,
        }
    }

    /// Number of stops reached.
    pub fn len(&self) -> usize {
        self.reached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reached.is_empty()
    }

    pub fn contains(&self, stop: &StopId) -> bool {
        self.index.contains_key(stop)
    }

    fn path_id(&self, stop: &StopId) -> Option<PathId> {
        self.index.get(stop).map(|&i| self.reached[i].1)
    }

    fn label_of(&self, path: PathId) -> Label {
        Label {
            best_arrival: self.arena.last(path).arrival,
            hop_count: self.arena.path_len(path),
        }
    }

    /// Final label for a reached stop.
    pub fn label(&self, stop: &StopId) -> Option<Label> {
        self.path_id(stop).map(|p| self.label_of(p))
    }

    /// Fastest path to a reached stop.
    pub fn path(&self, stop: &StopId) -> Option<SegmentPath> {
        self.path_id(stop).map(|p| self.arena.materialize(p))
    }

    /// Reached stops in the order they were finalized, which is
    /// non-decreasing arrival order.
    pub fn reached(&self) -> impl Iterator<Item = (&StopId, Label)> + '_ {
        self.reached
            .iter()
            .map(|(stop, path)| (stop, self.label_of(*path)))
    }
}

/// Per-run mutable state.
struct Run {
    arena: PathArena,
    frontier: Frontier,
    labels: LabelStore,
}

impl Run {
    /// Push `parent + segment` unless an equal or better candidate for the
    /// segment's stop is already known.
    fn push(&mut self, parent: PathId, segment: RouteSegment) {
        let stop = &segment.arrival_stop;
        if self.labels.is_finalized(stop) || !self.labels.offer(stop, segment.arrival) {
            return;
        }
        let arrival = segment.arrival;
        let path = self.arena.extend(parent, segment);
        self.frontier.push(path, arrival, self.arena.path_len(path));
    }
}

/// The reachability search over a timetable and a stop geometry.
pub struct ReachabilityEngine<'a, T: ?Sized, G: ?Sized> {
    timetable: &'a T,
    geometry: &'a G,
    cache: &'a TimetableCache,
}

impl<'a, T, G> ReachabilityEngine<'a, T, G>
where
    T: Timetable + ?Sized,
    G: Geometry + ?Sized,
{
    pub fn new(timetable: &'a T, geometry: &'a G, cache: &'a TimetableCache) -> Self {
        Self {
            timetable,
            geometry,
            cache,
        }
    }

    /// Run one search to completion.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, ReachError> {
        if !self.timetable.contains_stop(&query.start_stop) {
            return Err(ReachError::UnknownStartStop(query.start_stop.clone()));
        }
        debug!(
            start = %query.start_stop,
            date = %query.service_date,
            from = %query.start_time,
            until = %query.deadline,
            modes = %query.travel_modes,
            "Starting reachability search"
        );

        let mut run = Run {
            arena: PathArena::new(),
            frontier: Frontier::new(),
            labels: LabelStore::new(),
        };
        let root = run
            .arena
            .root(RouteSegment::start(query.start_time, query.start_stop.clone()));
        run.labels.offer(&query.start_stop, query.start_time);
        run.frontier.push(root, query.start_time, 1);

        let (mut pops, mut peak) = (0, 1);
        while let Some(path) = run.frontier.pop_min() {
            pops += 1;
            let last = run.arena.last(path);
            let (stop, arrival, walked) = (last.arrival_stop.clone(), last.arrival, last.is_walk());

            if run.labels.is_finalized(&stop) || arrival > query.deadline {
                continue;
            }
            run.labels.finalize(stop.clone(), path);
            trace!(stop = %stop, arrival = %arrival, "Finalized stop");

            self.expand_transit(query, &mut run, path, &stop, arrival)?;
            if !walked {
                self.expand_walks(query, &mut run, path, &stop, arrival)?;
            }
            peak = peak.max(run.frontier.len());
        }

        let trips_expanded = run.labels.trips_expanded();
        debug!(
            reached = run.labels.finalized_count(),
            trips_expanded,
            pops,
            peak_frontier = peak,
            segments = run.arena.node_count(),
            "Search finished"
        );
        Ok(SearchOutcome::new(
            run.arena,
            run.labels.into_finalized(),
            trips_expanded,
            pops,
        ))
    }

    /// Board the first departure of each (route, direction) and push every
    /// later stop of the trip.
    fn expand_transit(
        &self,
        query: &SearchQuery,
        run: &mut Run,
        path: PathId,
        stop: &StopId,
        now: ServiceTime,
    ) -> Result<(), ReachError> {
        let departures = self.cache.departures_from(
            self.timetable,
            stop,
            query.service_date,
            now,
            query.deadline,
        )?;

        let mut lines: HashSet<(RouteId, Option<u8>)> = HashSet::new();
        for departure in departures {
            if !lines.insert((departure.route_id.clone(), departure.direction_id)) {
                continue;
            }
            let category = self.timetable.route_category(&departure.trip_id)?;
            if !query.travel_modes.contains(category) {
                trace!(trip = %departure.trip_id, %category, "Mode not allowed");
                continue;
            }
            if !run.labels.claim_trip(&departure.trip_id) {
                continue;
            }

            let name = self.trip_name(&departure);
            for call in self
                .timetable
                .stops_after(&departure.trip_id, departure.stop_sequence)?
            {
                if call.arrival > query.deadline {
                    continue;
                }
                run.push(
                    path,
                    RouteSegment::transit(departure.departure, call.arrival, name.clone(), call.stop_id),
                );
            }
        }
        Ok(())
    }

    /// Walk to every stop reachable on foot before the deadline.
    fn expand_walks(
        &self,
        query: &SearchQuery,
        run: &mut Run,
        path: PathId,
        stop: &StopId,
        now: ServiceTime,
    ) -> Result<(), ReachError> {
        let speed = query.walking_speed;
        if speed.is_nan() || speed <= 0.0 {
            return Ok(());
        }
        let remaining_secs = (query.deadline - now).num_milliseconds() as f64 / 1000.0;
        let radius = remaining_secs * speed;

        for nearby in self.geometry.stops_within(stop, radius)? {
            if &nearby.stop_id == stop {
                continue;
            }
            let walk_millis = (nearby.distance / speed * 1000.0).round() as i64;
            let arrival = now + Duration::milliseconds(walk_millis);
            if arrival > query.deadline {
                continue;
            }
            run.push(
                path,
                RouteSegment::walk(now, arrival, nearby.distance, nearby.stop_id),
            );
        }
        Ok(())
    }

    /// Display name for a boarding: the headsign, or the route's short name
    /// marked as having no destination.
    fn trip_name(&self, departure: &Departure) -> String {
        match departure.headsign.as_deref().map(str::trim) {
            Some(headsign) if !headsign.is_empty() => headsign.to_string(),
            _ => {
                let short = self
                    .timetable
                    .route_short_name(&departure.route_id)
                    .unwrap_or_else(|| departure.route_id.to_string());
                format!("{short} (NO DEST)")
            }
        }
    }
}
