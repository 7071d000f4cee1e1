//! Service-day time handling.
//!
//! GTFS feeds express stop times as "HH:MM:SS" offsets from the midnight that
//! starts the service day. Trips that run past midnight keep counting hours,
//! so "25:10:00" is ten past one on the following morning but still belongs
//! to the earlier service day. `ServiceTime` keeps that representation.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A non-negative offset from service-day midnight, with millisecond
/// precision.
///
/// Values above 24 hours are legal and describe the small hours of the next
/// calendar day.
///
/// # Examples
///
/// ```
/// use hideout_server::domain::ServiceTime;
///
/// let t: ServiceTime = "25:10:00".parse().unwrap();
/// assert_eq!(t.to_string(), "25:10:00");
/// assert!(t > ServiceTime::from_hms(23, 59, 59));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ServiceTime {
    millis: i64,
}

impl ServiceTime {
    /// Midnight at the start of the service day.
    pub const MIDNIGHT: ServiceTime = ServiceTime { millis: 0 };

    /// Build a time from hours, minutes and seconds past midnight.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        let secs = i64::from(hours) * 3600 + i64::from(minutes) * 60 + i64::from(seconds);
        Self {
            millis: secs * 1000,
        }
    }

    /// Build a time from a duration past midnight.
    ///
    /// Returns `None` for negative durations.
    pub fn from_duration(offset: Duration) -> Option<Self> {
        let millis = offset.num_milliseconds();
        (millis >= 0).then_some(Self { millis })
    }

    /// The offset of `at` from the midnight that starts `day`.
    ///
    /// Returns `None` if `at` lies before that midnight.
    pub fn since_midnight(day: NaiveDate, at: NaiveDateTime) -> Option<Self> {
        Self::from_duration(at.signed_duration_since(day.and_time(chrono::NaiveTime::MIN)))
    }

    /// Parse "HH:MM:SS" (or "HH:MM"); hours may exceed 23.
    pub fn parse_hms(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let hours = parse_field(parts.next(), "missing hours")?;
        let minutes = parse_field(parts.next(), "missing minutes")?;
        let seconds = match parts.next() {
            Some(field) => parse_field(Some(field), "missing seconds")?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(TimeError::new("too many fields"));
        }
        if minutes > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if seconds > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        Ok(Self::from_hms(hours, minutes, seconds))
    }

    /// The offset as a chrono duration.
    pub fn as_duration(&self) -> Duration {
        Duration::milliseconds(self.millis)
    }

    /// Whole seconds past midnight (fractions truncated).
    pub fn whole_seconds(&self) -> i64 {
        self.millis / 1000
    }

    /// The wall-clock datetime this offset denotes on `day`'s service.
    pub fn on(&self, day: NaiveDate) -> NaiveDateTime {
        day.and_time(chrono::NaiveTime::MIN) + self.as_duration()
    }

    /// Duration from `earlier` to `self`, clamped at zero.
    pub fn saturating_since(&self, earlier: ServiceTime) -> Duration {
        Duration::milliseconds((self.millis - earlier.millis).max(0))
    }
}

fn parse_field(field: Option<&str>, missing: &'static str) -> Result<u32, TimeError> {
    let field = field.ok_or_else(|| TimeError::new(missing))?;
    if field.is_empty() || field.len() > 3 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::new("fields must be 1-3 ASCII digits"));
    }
    field
        .parse()
        .map_err(|_| TimeError::new("fields must be 1-3 ASCII digits"))
}

impl Add<Duration> for ServiceTime {
    type Output = Self;

    /// Negative durations saturate at midnight.
    fn add(self, rhs: Duration) -> Self::Output {
        Self {
            millis: (self.millis + rhs.num_milliseconds()).max(0),
        }
    }
}

impl Sub for ServiceTime {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration::milliseconds(self.millis - rhs.millis)
    }
}

impl FromStr for ServiceTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hms(s)
    }
}

impl TryFrom<String> for ServiceTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hms(&value)
    }
}

impl From<ServiceTime> for String {
    fn from(value: ServiceTime) -> Self {
        value.to_string()
    }
}

impl serde::Serialize for ServiceTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ServiceTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_hms(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")?;
        if self.millis % 1000 != 0 {
            write!(f, "+{}ms", self.millis % 1000)?;
        }
        Ok(())
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.whole_seconds();
        write!(
            f,
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

/// Render a short duration as "XmYYs", the way itinerary steps show them.
pub fn format_minutes_seconds(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    format!("{}m{:02}s", secs / 60, secs % 60)
}
