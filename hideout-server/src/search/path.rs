//! Route segments and the shared path arena.
//!
//! Every frontier entry is a path: its parent's path plus one new segment.
//! Paths are stored as `(parent, segment)` nodes in an arena so that
//! extending a path never copies its history. A path is only materialized
//! into a [`SegmentPath`] once the search is over.

use chrono::Duration;
use id_arena::{Arena, Id};

use crate::domain::{ServiceTime, StopId};

const METRES_PER_MILE: f64 = 1609.34;

/// What a segment represents.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentKind {
    /// Synthetic first segment: the traveler appears at the start stop.
    Start,
    /// A ride on a scheduled trip.
    Transit { name: String },
    /// A straight-line walk between stops.
    Walk { metres: f64 },
    /// Idle time at a stop between two other segments.
    Wait,
}

/// One step of a route: leave at `departure`, reach `arrival_stop` at
/// `arrival`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub departure: ServiceTime,
    pub arrival: ServiceTime,
    pub kind: SegmentKind,
    pub arrival_stop: StopId,
}

impl RouteSegment {
    /// The synthetic start marker at `stop`.
    pub fn start(at: ServiceTime, stop: StopId) -> Self {
        Self {
            departure: at,
            arrival: at,
            kind: SegmentKind::Start,
            arrival_stop: stop,
        }
    }

    pub fn transit(
        departure: ServiceTime,
        arrival: ServiceTime,
        name: impl Into<String>,
        stop: StopId,
    ) -> Self {
        Self {
            departure,
            arrival,
            kind: SegmentKind::Transit { name: name.into() },
            arrival_stop: stop,
        }
    }

    pub fn walk(departure: ServiceTime, arrival: ServiceTime, metres: f64, stop: StopId) -> Self {
        Self {
            departure,
            arrival,
            kind: SegmentKind::Walk { metres },
            arrival_stop: stop,
        }
    }

    pub fn wait(from: ServiceTime, until: ServiceTime, stop: StopId) -> Self {
        Self {
            departure: from,
            arrival: until,
            kind: SegmentKind::Wait,
            arrival_stop: stop,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, SegmentKind::Start)
    }

    pub fn is_walk(&self) -> bool {
        matches!(self.kind, SegmentKind::Walk { .. })
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, SegmentKind::Transit { .. })
    }

    /// Time spent on this segment.
    pub fn duration(&self) -> Duration {
        self.arrival.saturating_since(self.departure)
    }

    /// Display label, e.g. the trip's destination or "Walk 0.25 miles (402 m)".
    pub fn label(&self) -> String {
        match &self.kind {
            SegmentKind::Start => "Start".to_string(),
            SegmentKind::Transit { name } => name.clone(),
            SegmentKind::Walk { metres } => format!(
                "Walk {:.2} miles ({} m)",
                metres / METRES_PER_MILE,
                metres.round()
            ),
            SegmentKind::Wait => "Wait at stop".to_string(),
        }
    }
}

/// Arena node: a segment plus the path it extends.
#[derive(Debug)]
struct PathNode {
    parent: Option<PathId>,
    segment: RouteSegment,
    len: usize,
}

/// Handle to a path stored in a [`PathArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId(Id<PathNode>);

/// Append-only store of every path created during one search.
#[derive(Debug, Default)]
pub struct PathArena {
    nodes: Arena<PathNode>,
}

impl PathArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a one-segment path.
    pub fn root(&mut self, segment: RouteSegment) -> PathId {
        PathId(self.nodes.alloc(PathNode {
            parent: None,
            segment,
            len: 1,
        }))
    }

    /// Create the path `parent + segment`. The parent is left untouched.
    pub fn extend(&mut self, parent: PathId, segment: RouteSegment) -> PathId {
        let len = self.nodes[parent.0].len + 1;
        PathId(self.nodes.alloc(PathNode {
            parent: Some(parent),
            segment,
            len,
        }))
    }

    /// Last segment of a path.
    pub fn last(&self, path: PathId) -> &RouteSegment {
        &self.nodes[path.0].segment
    }

    /// Number of segments in a path.
    pub fn path_len(&self, path: PathId) -> usize {
        self.nodes[path.0].len
    }

    /// Total segments stored, across all paths.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Copy a path's segments out in travel order.
    pub fn materialize(&self, path: PathId) -> SegmentPath {
        let mut segments = Vec::with_capacity(self.path_len(path));
        let mut cursor = Some(path);
        while let Some(id) = cursor {
            let node = &self.nodes[id.0];
            segments.push(node.segment.clone());
            cursor = node.parent;
        }
        segments.reverse();
        SegmentPath(segments)
    }
}

/// A materialized route, first segment first.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPath(Vec<RouteSegment>);

impl SegmentPath {
    pub fn new(segments: Vec<RouteSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.0
    }

    pub fn last(&self) -> Option<&RouteSegment> {
        self.0.last()
    }

    /// Arrival time of the final segment.
    pub fn arrival(&self) -> Option<ServiceTime> {
        self.last().map(|s| s.arrival)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteSegment> {
        self.0.iter()
    }
}
