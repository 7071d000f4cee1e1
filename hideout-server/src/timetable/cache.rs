//! Memoized per-stop timetable slices.
//!
//! Building a stop's timetable for a date means filtering every call at the
//! stop by service calendar. A search asks for the same (stop, date) slice
//! once per finalized stop, and concurrent searches on the same day ask for
//! the same slices again, so the slices are memoized here.
//!
//! The cache holds only immutable feed data. It is owned by whoever owns the
//! timetable and handed to each engine explicitly.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache as MokaCache;

use super::{Departure, Timetable, TimetableError};
use crate::domain::{ServiceTime, StopId};

/// Cache key for timetable slices: (stop, service date).
type SliceKey = (StopId, NaiveDate);

/// Cached full-day timetable for one stop.
type SliceEntry = Arc<Vec<Departure>>;

/// Configuration for the slice cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached slices.
    pub max_capacity: u64,

    /// Slices unused for this long are evicted.
    pub time_to_idle: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 20_000,
            time_to_idle: Duration::from_secs(60 * 60),
        }
    }
}

/// Memo of `Timetable::stop_timetable` results.
pub struct TimetableCache {
    slices: MokaCache<SliceKey, SliceEntry>,
}

impl TimetableCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let slices = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_idle(config.time_to_idle)
            .build();
        Self { slices }
    }

    /// Full-day timetable for `stop` on `date`, loading it on a miss.
    pub fn stop_timetable<T: Timetable + ?Sized>(
        &self,
        timetable: &T,
        stop: &StopId,
        date: NaiveDate,
    ) -> Result<SliceEntry, TimetableError> {
        self.slices
            .try_get_with((stop.clone(), date), || {
                timetable.stop_timetable(stop, date).map(Arc::new)
            })
            .map_err(|e| (*e).clone())
    }

    /// Calls at `stop` departing no earlier than `not_before` whose arrival at
    /// the stop is no later than `not_after`, in departure order.
    pub fn departures_from<T: Timetable + ?Sized>(
        &self,
        timetable: &T,
        stop: &StopId,
        date: NaiveDate,
        not_before: ServiceTime,
        not_after: ServiceTime,
    ) -> Result<Vec<Departure>, TimetableError> {
        let slice = self.stop_timetable(timetable, stop, date)?;
        Ok(slice
            .iter()
            .filter(|d| d.departure >= not_before && d.arrival <= not_after)
            .cloned()
            .collect())
    }

    /// Number of cached slices (eventually consistent).
    pub fn entry_count(&self) -> u64 {
        self.slices.entry_count()
    }

    /// Drop every cached slice.
    pub fn invalidate_all(&self) {
        self.slices.invalidate_all();
    }
}

impl Default for TimetableCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
