//! Application state for the web layer.

use std::sync::Arc;

use crate::geometry::StopIndex;
use crate::search::SearchDefaults;
use crate::timetable::{FeedTimetable, TimetableCache};

/// Shared application state.
///
/// Everything here is read-only after startup; each request runs its own
/// search against it.
#[derive(Clone)]
pub struct AppState {
    /// Loaded feed
    pub feed: Arc<FeedTimetable>,

    /// Spatial index over the feed's stops
    pub stops: Arc<StopIndex>,

    /// Memoized per-stop timetables
    pub cache: Arc<TimetableCache>,

    /// Defaults for omitted request fields
    pub defaults: Arc<SearchDefaults>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        feed: FeedTimetable,
        stops: StopIndex,
        cache: TimetableCache,
        defaults: SearchDefaults,
    ) -> Self {
        Self {
            feed: Arc::new(feed),
            stops: Arc::new(stops),
            cache: Arc::new(cache),
            defaults: Arc::new(defaults),
        }
    }
}
