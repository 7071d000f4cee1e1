//! Search defaults and request validation.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::{ModeSet, RouteCategory, UnknownMode};
use crate::timetable::ServicePeriod;

/// A request that cannot be searched as given.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// No route category may be boarded
    #[error("travel mode filter is empty")]
    EmptyTravelModes,

    /// No route category counts as hideable
    #[error("hiding mode filter is empty")]
    EmptyHidingModes,

    /// Hide duration must be positive
    #[error("hide duration must be positive, got {0} minutes")]
    NonPositiveHideDuration(i64),

    /// Hide duration runs past the representable calendar
    #[error("hide duration of {0} minutes is too long")]
    HideDurationTooLong(i64),

    /// The deadline is before the start time
    #[error("deadline {deadline} is before start {start}")]
    DeadlineBeforeStart {
        start: NaiveDateTime,
        deadline: NaiveDateTime,
    },

    /// A date the search needs is not covered by the feed
    #[error("{which} date {date} is outside the feed's service period {}..={}", period.start, period.end)]
    OutsideServicePeriod {
        which: &'static str,
        date: NaiveDate,
        period: ServicePeriod,
    },

    /// Walking speed is NaN or infinite
    #[error("walking speed must be finite, got {0}")]
    InvalidWalkingSpeed(f64),

    /// A mode name did not parse
    #[error(transparent)]
    UnknownMode(#[from] UnknownMode),
}

/// Defaults applied to requests that leave a parameter out.
#[derive(Debug, Clone)]
pub struct SearchDefaults {
    /// Walking speed in metres per second.
    pub walking_speed: f64,

    /// Time the hider has before seekers start, in minutes.
    pub hide_duration_mins: i64,

    /// Route categories the hider may board.
    pub travel_modes: ModeSet,

    /// Route categories that make a stop a valid hiding spot.
    pub hiding_modes: ModeSet,
}

impl SearchDefaults {
    pub fn new(
        walking_speed: f64,
        hide_duration_mins: i64,
        travel_modes: ModeSet,
        hiding_modes: ModeSet,
    ) -> Self {
        Self {
            walking_speed,
            hide_duration_mins,
            travel_modes,
            hiding_modes,
        }
    }

    /// Returns the hide duration as a Duration.
    pub fn hide_duration(&self) -> Duration {
        Duration::minutes(self.hide_duration_mins)
    }
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            walking_speed: 1.06,
            hide_duration_mins: 90,
            travel_modes: ModeSet::all(),
            hiding_modes: [RouteCategory::LightRail].into_iter().collect(),
        }
    }
}

/// Deadline for a hide duration given in minutes.
pub fn deadline_after(start: NaiveDateTime, minutes: i64) -> Result<NaiveDateTime, ConfigError> {
    if minutes <= 0 {
        return Err(ConfigError::NonPositiveHideDuration(minutes));
    }
    Duration::try_minutes(minutes)
        .and_then(|hide| start.checked_add_signed(hide))
        .ok_or(ConfigError::HideDurationTooLong(minutes))
}
