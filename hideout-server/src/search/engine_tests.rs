//! Behavioural tests for the reachability engine over small hand-built
//! networks.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use proptest::prelude::*;

use super::*;
use crate::domain::{ModeSet, RouteCategory, RouteId, ServiceTime, StopId, TripId};
use crate::geometry::{Geometry, NearbyStop, StopIndex};
use crate::timetable::{
    Departure, ServicePeriod, Timetable, TimetableCache, TimetableError, TripStop,
};

fn t(h: u32, m: u32) -> ServiceTime {
    ServiceTime::from_hms(h, m, 0)
}

fn stop(s: &str) -> StopId {
    StopId::new(s)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
}

struct TestRoute {
    category: RouteCategory,
    short_name: Option<String>,
}

struct TestTrip {
    id: TripId,
    route: RouteId,
    direction: Option<u8>,
    headsign: Option<String>,
    /// (stop, time); arrival and departure coincide.
    calls: Vec<(StopId, ServiceTime)>,
}

/// In-memory network for engine tests.
#[derive(Default)]
struct Network {
    positions: BTreeMap<StopId, [f64; 2]>,
    routes: HashMap<RouteId, TestRoute>,
    trips: Vec<TestTrip>,
}

impl Network {
    fn new() -> Self {
        Self::default()
    }

    /// Add a stop at a position in metres.
    fn stop(mut self, id: &str, x: f64, y: f64) -> Self {
        self.positions.insert(stop(id), [x, y]);
        self
    }

    fn route(mut self, id: &str, category: RouteCategory, short_name: Option<&str>) -> Self {
        self.routes.insert(
            RouteId::new(id),
            TestRoute {
                category,
                short_name: short_name.map(str::to_string),
            },
        );
        self
    }

    fn trip(
        mut self,
        id: &str,
        route: &str,
        direction: Option<u8>,
        headsign: Option<&str>,
        calls: &[(&str, ServiceTime)],
    ) -> Self {
        self.trips.push(TestTrip {
            id: TripId::new(id),
            route: RouteId::new(route),
            direction,
            headsign: headsign.map(str::to_string),
            calls: calls.iter().map(|(s, at)| (stop(s), *at)).collect(),
        });
        self
    }

    fn find_trip(&self, trip: &TripId) -> Result<&TestTrip, TimetableError> {
        self.trips
            .iter()
            .find(|t| &t.id == trip)
            .ok_or_else(|| TimetableError::UnknownTrip(trip.clone()))
    }

    fn index(&self) -> StopIndex {
        StopIndex::from_projected(self.positions.iter().map(|(s, p)| (s.clone(), *p))).unwrap()
    }
}

impl Timetable for Network {
    fn service_period(&self) -> ServicePeriod {
        ServicePeriod {
            start: day(),
            end: day(),
        }
    }

    fn contains_stop(&self, stop: &StopId) -> bool {
        self.positions.contains_key(stop)
    }

    fn stop_timetable(
        &self,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<Vec<Departure>, TimetableError> {
        if !self.contains_stop(stop) {
            return Err(TimetableError::UnknownStop(stop.clone()));
        }
        if date != day() {
            return Ok(Vec::new());
        }
        let mut departures: Vec<Departure> = self
            .trips
            .iter()
            .flat_map(|trip| {
                trip.calls
                    .iter()
                    .enumerate()
                    .filter(move |(_, (s, _))| s == stop)
                    .map(move |(i, (_, at))| Departure {
                        trip_id: trip.id.clone(),
                        route_id: trip.route.clone(),
                        direction_id: trip.direction,
                        arrival: *at,
                        departure: *at,
                        stop_sequence: i as u32 + 1,
                        headsign: trip.headsign.clone(),
                    })
            })
            .collect();
        departures.sort_by(|a, b| {
            a.departure
                .cmp(&b.departure)
                .then_with(|| a.trip_id.cmp(&b.trip_id))
        });
        Ok(departures)
    }

    fn stops_after(
        &self,
        trip: &TripId,
        stop_sequence: u32,
    ) -> Result<Vec<TripStop>, TimetableError> {
        let trip = self.find_trip(trip)?;
        Ok(trip
            .calls
            .iter()
            .enumerate()
            .map(|(i, (s, at))| TripStop {
                stop_id: s.clone(),
                arrival: *at,
                stop_sequence: i as u32 + 1,
            })
            .filter(|call| call.stop_sequence > stop_sequence)
            .collect())
    }

    fn routes_serving(&self, stop: &StopId) -> ModeSet {
        self.trips
            .iter()
            .filter(|trip| trip.calls.iter().any(|(s, _)| s == stop))
            .filter_map(|trip| self.routes.get(&trip.route).map(|r| r.category))
            .collect()
    }

    fn route_category(&self, trip: &TripId) -> Result<RouteCategory, TimetableError> {
        let trip = self.find_trip(trip)?;
        self.routes
            .get(&trip.route)
            .map(|r| r.category)
            .ok_or_else(|| TimetableError::Corrupt(format!("trip {} has no route", trip.id)))
    }

    fn route_short_name(&self, route: &RouteId) -> Option<String> {
        self.routes.get(route).and_then(|r| r.short_name.clone())
    }
}

/// Geometry that records which stops it was asked about.
struct RecordingGeometry {
    inner: StopIndex,
    centers: RefCell<Vec<StopId>>,
}

impl Geometry for RecordingGeometry {
    fn stops_within(
        &self,
        center: &StopId,
        radius: f64,
    ) -> Result<Vec<NearbyStop>, crate::geometry::GeometryError> {
        self.centers.borrow_mut().push(center.clone());
        self.inner.stops_within(center, radius)
    }
}

fn query(start: &str, from: ServiceTime, until: ServiceTime) -> SearchQuery {
    SearchQuery {
        start_stop: stop(start),
        service_date: day(),
        start_time: from,
        deadline: until,
        travel_modes: ModeSet::all(),
        walking_speed: 1.0,
    }
}

fn search(net: &Network, query: &SearchQuery) -> SearchOutcome {
    let index = net.index();
    let cache = TimetableCache::default();
    ReachabilityEngine::new(net, &index, &cache)
        .search(query)
        .unwrap()
}

fn reached_ids(outcome: &SearchOutcome) -> Vec<&str> {
    let mut ids: Vec<&str> = outcome.reached().map(|(s, _)| s.as_str()).collect();
    ids.sort();
    ids
}

/// A and B far apart, one light rail trip between them.
fn two_stop_line() -> Network {
    Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .route("RED", RouteCategory::LightRail, Some("Red"))
        .trip("R1", "RED", Some(0), Some("Parker Road"), &[("A", t(9, 5)), ("B", t(9, 20))])
}

#[test]
fn transit_between_two_stops() {
    let outcome = search(&two_stop_line(), &query("A", t(9, 0), t(10, 0)));

    assert_eq!(reached_ids(&outcome), vec!["A", "B"]);
    assert_eq!(outcome.label(&stop("B")).map(|l| l.best_arrival), Some(t(9, 20)));

    let path = outcome.path(&stop("B")).unwrap();
    assert_eq!(
        path.segments(),
        &[
            RouteSegment::start(t(9, 0), stop("A")),
            RouteSegment::transit(t(9, 5), t(9, 20), "Parker Road", stop("B")),
        ]
    );
    assert!(path.iter().all(|s| !s.is_walk()));
    assert_eq!(outcome.trips_expanded, 1);
}

#[test]
fn deadline_at_start_reaches_only_the_start() {
    let outcome = search(&two_stop_line(), &query("A", t(9, 0), t(9, 0)));

    assert_eq!(reached_ids(&outcome), vec!["A"]);
    let path = outcome.path(&stop("A")).unwrap();
    assert_eq!(path.segments(), &[RouteSegment::start(t(9, 0), stop("A"))]);
    assert_eq!(outcome.trips_expanded, 0);
}

#[test]
fn arrivals_after_the_deadline_are_not_reached() {
    let outcome = search(&two_stop_line(), &query("A", t(9, 0), t(9, 19)));
    assert_eq!(reached_ids(&outcome), vec!["A"]);
    // The trip was still boarded; its only later call was too late.
    assert_eq!(outcome.trips_expanded, 1);
}

#[test]
fn departures_before_the_start_are_ignored() {
    let outcome = search(&two_stop_line(), &query("A", t(9, 6), t(10, 0)));
    assert_eq!(reached_ids(&outcome), vec!["A"]);
    assert_eq!(outcome.trips_expanded, 0);
}

#[test]
fn only_first_departure_per_route_and_direction_is_boarded() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .stop("D", 0.0, 50_000.0)
        .route("RED", RouteCategory::LightRail, None)
        .trip("R1", "RED", Some(0), Some("B"), &[("A", t(9, 5)), ("B", t(9, 20))])
        .trip(
            "R2",
            "RED",
            Some(0),
            Some("B"),
            &[("A", t(9, 10)), ("D", t(9, 15)), ("B", t(9, 25))],
        );
    let outcome = search(&net, &query("A", t(9, 0), t(10, 0)));

    assert_eq!(reached_ids(&outcome), vec!["A", "B"]);
    assert_eq!(outcome.trips_expanded, 1);
}

#[test]
fn later_express_on_the_same_line_is_skipped() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .route("RED", RouteCategory::LightRail, None)
        .trip("SLOW", "RED", Some(0), Some("B"), &[("A", t(9, 5)), ("B", t(9, 40))])
        .trip("EXPRESS", "RED", Some(0), Some("B"), &[("A", t(9, 10)), ("B", t(9, 20))]);
    let outcome = search(&net, &query("A", t(9, 0), t(10, 0)));

    assert_eq!(outcome.label(&stop("B")).map(|l| l.best_arrival), Some(t(9, 40)));
    assert_eq!(outcome.trips_expanded, 1);
}

#[test]
fn opposite_directions_are_boarded_separately() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .stop("D", 0.0, 50_000.0)
        .route("RED", RouteCategory::LightRail, None)
        .trip("R1", "RED", Some(0), Some("B"), &[("A", t(9, 5)), ("B", t(9, 20))])
        .trip("R2", "RED", Some(1), Some("D"), &[("A", t(9, 10)), ("D", t(9, 25))]);
    let outcome = search(&net, &query("A", t(9, 0), t(10, 0)));

    assert_eq!(reached_ids(&outcome), vec!["A", "B", "D"]);
    assert_eq!(outcome.trips_expanded, 2);
}

#[test]
fn earlier_candidate_wins_and_later_ones_are_not_queued() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("X", 50_000.0, 0.0)
        .route("R1", RouteCategory::Bus, None)
        .route("R2", RouteCategory::Bus, None)
        .route("R3", RouteCategory::Bus, None)
        .trip("T1", "R1", None, Some("slow"), &[("A", t(9, 1)), ("X", t(9, 7))])
        .trip("T2", "R2", None, Some("fast"), &[("A", t(9, 2)), ("X", t(9, 5))])
        .trip("T3", "R3", None, Some("slower"), &[("A", t(9, 3)), ("X", t(9, 9))]);
    let outcome = search(&net, &query("A", t(9, 0), t(10, 0)));

    assert_eq!(outcome.label(&stop("X")).map(|l| l.best_arrival), Some(t(9, 5)));
    let path = outcome.path(&stop("X")).unwrap();
    assert_eq!(path.last().map(|s| s.label()), Some("fast".to_string()));
    // Start, X at 09:07, X at 09:05. The 09:09 candidate is dropped at push.
    assert_eq!(outcome.pops, 3);
    assert_eq!(outcome.trips_expanded, 3);
}

#[test]
fn equal_arrivals_prefer_fewer_hops() {
    // B by a direct trip at 09:20, or via C and a second trip, also 09:20.
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .stop("C", 0.0, 50_000.0)
        .route("R1", RouteCategory::Bus, None)
        .route("R2", RouteCategory::Bus, None)
        .route("R3", RouteCategory::Bus, None)
        .trip("T1", "R1", None, Some("C"), &[("A", t(9, 1)), ("C", t(9, 5))])
        .trip("T2", "R2", None, Some("B"), &[("C", t(9, 10)), ("B", t(9, 20))])
        .trip("T3", "R3", None, Some("B direct"), &[("A", t(9, 2)), ("B", t(9, 20))]);
    let outcome = search(&net, &query("A", t(9, 0), t(10, 0)));

    let label = outcome.label(&stop("B")).unwrap();
    assert_eq!(label.best_arrival, t(9, 20));
    assert_eq!(label.hop_count, 2);
}

#[test]
fn walking_reaches_nearby_stops() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 300.0, 0.0)
        .stop("FAR", 5_000.0, 0.0);
    // 10 minutes at 1 m/s is 600 m.
    let outcome = search(&net, &query("A", t(9, 0), t(9, 10)));

    assert_eq!(reached_ids(&outcome), vec!["A", "B"]);
    let path = outcome.path(&stop("B")).unwrap();
    assert_eq!(
        path.last(),
        Some(&RouteSegment::walk(t(9, 0), t(9, 5), 300.0, stop("B")))
    );
}

#[test]
fn walk_arrival_uses_speed() {
    let net = Network::new().stop("A", 0.0, 0.0).stop("B", 318.0, 0.0);
    let mut q = query("A", t(9, 0), t(10, 0));
    q.walking_speed = 1.06;
    let outcome = search(&net, &q);
    // 318 m at 1.06 m/s is exactly 300 s.
    assert_eq!(outcome.label(&stop("B")).map(|l| l.best_arrival), Some(t(9, 5)));
}

#[test]
fn non_positive_speed_disables_walking() {
    let net = Network::new().stop("A", 0.0, 0.0).stop("B", 10.0, 0.0);
    for speed in [0.0, -1.0] {
        let mut q = query("A", t(9, 0), t(10, 0));
        q.walking_speed = speed;
        assert_eq!(reached_ids(&search(&net, &q)), vec!["A"]);
    }
}

#[test]
fn no_walk_after_walk() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 300.0, 0.0)
        .stop("C", 600.0, 0.0);
    let geometry = RecordingGeometry {
        inner: net.index(),
        centers: RefCell::new(Vec::new()),
    };
    let cache = TimetableCache::default();
    let outcome = ReachabilityEngine::new(&net, &geometry, &cache)
        .search(&query("A", t(9, 0), t(9, 10)))
        .unwrap();

    assert_eq!(reached_ids(&outcome), vec!["A", "B", "C"]);
    // B and C were reached on foot, so only A was asked for walks.
    assert_eq!(*geometry.centers.borrow(), vec![stop("A")]);
    for (id, _) in outcome.reached() {
        let path = outcome.path(id).unwrap();
        let segments = path.segments();
        assert!(segments.windows(2).all(|w| !(w[0].is_walk() && w[1].is_walk())));
    }
}

#[test]
fn walk_after_transit() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .stop("C", 50_120.0, 0.0)
        .route("RED", RouteCategory::LightRail, None)
        .trip("R1", "RED", Some(0), Some("B"), &[("A", t(9, 5)), ("B", t(9, 20))]);
    let outcome = search(&net, &query("A", t(9, 0), t(9, 30)));

    let path = outcome.path(&stop("C")).unwrap();
    let labels: Vec<String> = path.iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["Start", "B", "Walk 0.07 miles (120 m)"]);
    assert_eq!(path.arrival(), Some(t(9, 22)));
}

#[test]
fn trips_are_expanded_once() {
    // R1 runs A -> B -> C. B is reached on foot before R1 gets there, so
    // R1 is seen again at B but not expanded again.
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 60.0, 0.0)
        .stop("C", 50_000.0, 0.0)
        .route("RED", RouteCategory::LightRail, None)
        .trip(
            "R1",
            "RED",
            Some(0),
            Some("C"),
            &[("A", t(9, 5)), ("B", t(9, 10)), ("C", t(9, 30))],
        );
    let outcome = search(&net, &query("A", t(9, 0), t(10, 0)));

    assert_eq!(reached_ids(&outcome), vec!["A", "B", "C"]);
    assert_eq!(outcome.label(&stop("B")).map(|l| l.best_arrival), Some(t(9, 1)));
    assert_eq!(outcome.trips_expanded, 1);
}

#[test]
fn missing_headsign_uses_route_name() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .stop("C", 0.0, 50_000.0)
        .route("R583", RouteCategory::Bus, Some("583"))
        .route("R9", RouteCategory::Bus, None)
        .trip("T1", "R583", None, None, &[("A", t(9, 5)), ("B", t(9, 20))])
        .trip("T2", "R9", None, Some("  "), &[("A", t(9, 5)), ("C", t(9, 20))]);
    let outcome = search(&net, &query("A", t(9, 0), t(10, 0)));

    let name = |s: &str| outcome.path(&stop(s)).and_then(|p| p.last().map(|l| l.label()));
    assert_eq!(name("B"), Some("583 (NO DEST)".to_string()));
    assert_eq!(name("C"), Some("R9 (NO DEST)".to_string()));
}

#[test]
fn travel_modes_gate_boarding() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .route("583", RouteCategory::Bus, Some("583"))
        .trip("T1", "583", None, Some("B"), &[("A", t(9, 5)), ("B", t(9, 20))]);
    let mut q = query("A", t(9, 0), t(10, 0));
    q.travel_modes = [RouteCategory::LightRail].into_iter().collect();
    let outcome = search(&net, &q);

    assert_eq!(reached_ids(&outcome), vec!["A"]);
    assert_eq!(outcome.trips_expanded, 0);
}

#[test]
fn unknown_start_stop() {
    let net = two_stop_line();
    let index = net.index();
    let cache = TimetableCache::default();
    let result = ReachabilityEngine::new(&net, &index, &cache).search(&query("Z", t(9, 0), t(10, 0)));
    assert_eq!(result.unwrap_err(), ReachError::UnknownStartStop(stop("Z")));
}

#[test]
fn timetable_failures_abort_the_search() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 50_000.0, 0.0)
        .trip("T1", "GHOST", None, Some("B"), &[("A", t(9, 5)), ("B", t(9, 20))]);
    let index = net.index();
    let cache = TimetableCache::default();
    let result = ReachabilityEngine::new(&net, &index, &cache).search(&query("A", t(9, 0), t(10, 0)));
    assert!(matches!(result, Err(ReachError::Timetable(TimetableError::Corrupt(_)))));
}

#[test]
fn reached_order_is_by_arrival() {
    let net = Network::new()
        .stop("A", 0.0, 0.0)
        .stop("B", 120.0, 0.0)
        .stop("C", 50_000.0, 0.0)
        .stop("D", 0.0, 50_000.0)
        .route("R1", RouteCategory::Bus, None)
        .route("R2", RouteCategory::Bus, None)
        .trip("T1", "R1", None, Some("D"), &[("A", t(9, 5)), ("D", t(9, 40))])
        .trip("T2", "R2", None, Some("C"), &[("A", t(9, 6)), ("C", t(9, 15))]);
    let outcome = search(&net, &query("A", t(9, 0), t(10, 0)));

    let arrivals: Vec<ServiceTime> = outcome.reached().map(|(_, l)| l.best_arrival).collect();
    assert_eq!(arrivals, vec![t(9, 0), t(9, 2), t(9, 15), t(9, 40)]);
}

mod find {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    /// A is served by light rail and bus, B only by light rail, C only by
    /// bus.
    fn network() -> Network {
        Network::new()
            .stop("A", 0.0, 0.0)
            .stop("B", 50_000.0, 0.0)
            .stop("C", 0.0, 50_000.0)
            .route("RED", RouteCategory::LightRail, Some("Red"))
            .route("583", RouteCategory::Bus, Some("583"))
            .trip("R1", "RED", Some(0), Some("B"), &[("A", t(9, 5)), ("B", t(9, 20))])
            .trip("B1", "583", Some(0), Some("C"), &[("A", t(9, 10)), ("C", t(9, 30))])
    }

    fn run(request: &ReachRequest) -> Result<ReachResult, ReachError> {
        let net = network();
        let index = net.index();
        find_reachable(&net, &index, &TimetableCache::default(), request)
    }

    fn request() -> ReachRequest {
        ReachRequest::new(stop("A"), at(9, 0), at(10, 0), &SearchDefaults::default())
    }

    #[test]
    fn classifies_hiding_spots() {
        let result = run(&request()).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result.service_date, day());
        assert!(result.get(&stop("A")).unwrap().is_valid_hiding_spot);
        assert!(result.get(&stop("B")).unwrap().is_valid_hiding_spot);
        assert!(!result.get(&stop("C")).unwrap().is_valid_hiding_spot);
        let hiding: Vec<&str> = result.hiding_spots().map(|s| s.stop_id.as_str()).collect();
        assert_eq!(hiding, vec!["A", "B"]);

        let c = result.get(&stop("C")).unwrap();
        assert_eq!(c.arrival, t(9, 30));
        assert_eq!(c.path.len(), 2);
        assert_eq!(result.trips_expanded, 2);
    }

    #[test]
    fn hiding_modes_do_not_affect_the_search() {
        let bus_only: ModeSet = [RouteCategory::Bus].into_iter().collect();
        let result = run(&request().with_hiding_modes(bus_only)).unwrap();
        assert_eq!(result.len(), 3);
        assert!(!result.get(&stop("B")).unwrap().is_valid_hiding_spot);
        assert!(result.get(&stop("C")).unwrap().is_valid_hiding_spot);
    }

    #[test]
    fn hide_duration_sets_the_deadline() {
        let request =
            ReachRequest::for_hide_duration(stop("A"), at(9, 0), 25, &SearchDefaults::default())
                .unwrap();
        let result = run(&request).unwrap();
        let mut ids: Vec<&str> = result.stops.iter().map(|s| s.stop_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert_eq!(
            run(&request().with_travel_modes(ModeSet::empty())).unwrap_err(),
            ReachError::Config(ConfigError::EmptyTravelModes)
        );
        assert_eq!(
            run(&request().with_hiding_modes(ModeSet::empty())).unwrap_err(),
            ReachError::Config(ConfigError::EmptyHidingModes)
        );
        assert!(matches!(
            run(&request().with_walking_speed(f64::NAN)),
            Err(ReachError::Config(ConfigError::InvalidWalkingSpeed(_)))
        ));

        let mut backwards = request();
        backwards.deadline = at(8, 0);
        assert!(matches!(
            run(&backwards),
            Err(ReachError::Config(ConfigError::DeadlineBeforeStart { .. }))
        ));

        let mut next_day = request();
        next_day.deadline = at(23, 0) + chrono::Duration::hours(2);
        assert!(matches!(
            run(&next_day),
            Err(ReachError::Config(ConfigError::OutsideServicePeriod { which: "end", .. }))
        ));
    }

    #[test]
    fn unknown_start_is_a_lookup_error() {
        let mut request = request();
        request.start_stop = stop("NOPE");
        assert_eq!(
            run(&request).unwrap_err(),
            ReachError::UnknownStartStop(stop("NOPE"))
        );
    }
}

/// Earliest arrival at every stop by exhaustive relaxation.
fn brute_force(
    net: &Network,
    start: &StopId,
    from: ServiceTime,
    until: ServiceTime,
) -> BTreeMap<StopId, ServiceTime> {
    let mut best = BTreeMap::new();
    best.insert(start.clone(), from);
    loop {
        let mut changed = false;
        for trip in &net.trips {
            for (i, (boarding, departs)) in trip.calls.iter().enumerate() {
                let Some(&ready) = best.get(boarding) else {
                    continue;
                };
                if *departs < ready || *departs > until {
                    continue;
                }
                for (alight, arrives) in &trip.calls[i + 1..] {
                    if *arrives > until {
                        continue;
                    }
                    if best.get(alight).is_none_or(|known| arrives < known) {
                        best.insert(alight.clone(), *arrives);
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            return best;
        }
    }
}

fn arb_trip(calls: std::ops::Range<usize>) -> impl Strategy<Value = (u32, Vec<(usize, u32)>)> {
    (0u32..90, prop::collection::vec((0usize..6, 1u32..20), calls))
}

/// Six far-apart stops and one bus route per trip, so neither walking nor
/// the per-line boarding rule comes into play.
fn random_network(trips: &[(u32, Vec<(usize, u32)>)]) -> Network {
    let mut net = Network::new();
    for i in 0..6 {
        net = net.stop(&format!("S{i}"), i as f64 * 50_000.0, 0.0);
    }
    for (n, (first, hops)) in trips.iter().enumerate() {
        let route = format!("R{n}");
        let mut minute = 8 * 60 + 30 + first;
        let calls: Vec<(String, ServiceTime)> = hops
            .iter()
            .map(|(s, gap)| {
                minute += gap;
                (format!("S{s}"), ServiceTime::from_hms(0, minute, 0))
            })
            .collect();
        let calls: Vec<(&str, ServiceTime)> =
            calls.iter().map(|(s, at)| (s.as_str(), *at)).collect();
        net = net
            .route(&route, RouteCategory::Bus, None)
            .trip(&format!("T{n}"), &route, Some(0), None, &calls);
    }
    net
}

fn arrivals(outcome: &SearchOutcome) -> BTreeMap<StopId, ServiceTime> {
    outcome
        .reached()
        .map(|(s, l)| (s.clone(), l.best_arrival))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn single_connections_match_brute_force(
        trips in prop::collection::vec(arb_trip(2..3), 0..12),
        budget in 0u32..120,
    ) {
        let net = random_network(&trips);
        let (from, until) = (t(9, 0), ServiceTime::from_hms(9, budget, 0));
        let mut q = query("S0", from, until);
        q.walking_speed = 0.0;
        let outcome = search(&net, &q);

        prop_assert_eq!(arrivals(&outcome), brute_force(&net, &stop("S0"), from, until));
    }

    #[test]
    fn multi_stop_trips_never_beat_brute_force(
        trips in prop::collection::vec(arb_trip(2..5), 0..10),
        budget in 0u32..120,
    ) {
        let net = random_network(&trips);
        let (from, until) = (t(9, 0), ServiceTime::from_hms(9, budget, 0));
        let mut q = query("S0", from, until);
        q.walking_speed = 0.0;
        let outcome = search(&net, &q);
        let best = brute_force(&net, &stop("S0"), from, until);

        // A trip is expanded from one boarding only, so some stops may be
        // missed, but nothing found can be earlier than possible.
        for (id, arrival) in arrivals(&outcome) {
            prop_assert!(best.get(&id).is_some_and(|b| *b <= arrival));
            prop_assert!(arrival <= until);
        }
        prop_assert!(outcome.contains(&stop("S0")));

        // Every path starts at the origin and never goes back in time.
        for (id, label) in outcome.reached() {
            let path = outcome.path(id).unwrap();
            prop_assert!(path.segments()[0].is_start());
            prop_assert_eq!(path.len(), label.hop_count);
            prop_assert!(path.segments().windows(2).all(|w| w[0].arrival <= w[1].departure));
        }
    }
}
