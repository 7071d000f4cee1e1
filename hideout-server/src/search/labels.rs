//! Per-run label bookkeeping: finalized stops, best pending arrivals and
//! expanded trips.

use std::collections::{HashMap, HashSet};

use super::path::PathId;
use crate::domain::{ServiceTime, StopId, TripId};

/// Best known label for a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub best_arrival: ServiceTime,
    pub hop_count: usize,
}

#[derive(Debug, Default)]
pub struct LabelStore {
    finalized: HashMap<StopId, PathId>,
    order: Vec<StopId>,
    pending_best: HashMap<StopId, ServiceTime>,
    visited_trips: HashSet<TripId>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finalized(&self, stop: &StopId) -> bool {
        self.finalized.contains_key(stop)
    }

    /// Record the final path for `stop`. Returns false if the stop was
    /// already finalized, in which case nothing changes.
    pub fn finalize(&mut self, stop: StopId, path: PathId) -> bool {
        if self.finalized.contains_key(&stop) {
            return false;
        }
        self.finalized.insert(stop.clone(), path);
        self.order.push(stop);
        true
    }

    /// Offer a candidate arrival at `stop`.
    ///
    /// Returns true (and records the arrival) only if it beats every
    /// candidate already offered for the stop.
    pub fn offer(&mut self, stop: &StopId, arrival: ServiceTime) -> bool {
        match self.pending_best.get_mut(stop) {
            Some(best) if *best <= arrival => false,
            Some(best) => {
                *best = arrival;
                true
            }
            None => {
                self.pending_best.insert(stop.clone(), arrival);
                true
            }
        }
    }

    /// Mark a trip as expanded. Returns false if it already was.
    pub fn claim_trip(&mut self, trip: &TripId) -> bool {
        if self.visited_trips.contains(trip) {
            return false;
        }
        self.visited_trips.insert(trip.clone());
        true
    }

    pub fn trips_expanded(&self) -> usize {
        self.visited_trips.len()
    }

    pub fn finalized_count(&self) -> usize {
        self.order.len()
    }

    /// Finalized stops with their paths, in finalization order.
    pub fn into_finalized(self) -> Vec<(StopId, PathId)> {
        let mut finalized = self.finalized;
        self.order
            .into_iter()
            .filter_map(|stop| finalized.remove(&stop).map(|path| (stop, path)))
            .collect()
    }
}
