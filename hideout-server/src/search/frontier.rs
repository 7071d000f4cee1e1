//! Priority queue of candidate paths.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::path::PathId;
use crate::domain::ServiceTime;

/// Heap entry. `Ord` is reversed so the std max-heap pops the smallest key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    arrival: ServiceTime,
    hops: usize,
    seq: u64,
    path: PathId,
}

impl Entry {
    fn key(&self) -> (ServiceTime, usize, u64) {
        (self.arrival, self.hops, self.seq)
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Paths ordered by earliest arrival, then fewest segments, then insertion
/// order.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a path whose last segment arrives at `arrival` and which has
    /// `hops` segments.
    pub fn push(&mut self, path: PathId, arrival: ServiceTime, hops: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            arrival,
            hops,
            seq,
            path,
        });
    }

    pub fn pop_min(&mut self) -> Option<PathId> {
        self.heap.pop().map(|e| e.path)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;
    use crate::search::path::{PathArena, RouteSegment};

    fn t(h: u32, m: u32) -> ServiceTime {
        ServiceTime::from_hms(h, m, 0)
    }

    #[test]
    fn pops_by_arrival_then_hops_then_insertion() {
        let mut arena = PathArena::new();
        let ids: Vec<PathId> = (0..4)
            .map(|i| arena.root(RouteSegment::start(t(9, 0), StopId::new(format!("S{i}")))))
            .collect();

        let mut frontier = Frontier::new();
        frontier.push(ids[0], t(9, 30), 2);
        frontier.push(ids[1], t(9, 10), 3);
        frontier.push(ids[2], t(9, 10), 2);
        frontier.push(ids[3], t(9, 10), 2);
        assert_eq!(frontier.len(), 4);

        let order: Vec<PathId> = std::iter::from_fn(|| frontier.pop_min()).collect();
        assert_eq!(order, vec![ids[2], ids[3], ids[1], ids[0]]);
        assert!(frontier.is_empty());
    }

    #[test]
    fn empty_pop() {
        assert_eq!(Frontier::new().pop_min(), None);
    }
}
