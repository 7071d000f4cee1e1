//! Service calendars: which dates a trip runs on.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

/// A weekly service pattern with dated exceptions.
///
/// `weekdays` is indexed Monday first. Dates in `added` run regardless of the
/// pattern; dates in `removed` never run.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCalendar {
    pub service_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub weekdays: [bool; 7],
    #[serde(default)]
    pub added: HashSet<NaiveDate>,
    #[serde(default)]
    pub removed: HashSet<NaiveDate>,
}

impl ServiceCalendar {
    /// Whether this service runs on `date`.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if self.removed.contains(&date) {
            return false;
        }
        if self.added.contains(&date) {
            return true;
        }
        self.start_date <= date
            && date <= self.end_date
            && self.weekdays[date.weekday().num_days_from_monday() as usize]
    }

    /// First and last dates this service can run on, including exceptions.
    pub fn span(&self) -> (NaiveDate, NaiveDate) {
        let first = self
            .added
            .iter()
            .copied()
            .chain(std::iter::once(self.start_date))
            .min()
            .unwrap_or(self.start_date);
        let last = self
            .added
            .iter()
            .copied()
            .chain(std::iter::once(self.end_date))
            .max()
            .unwrap_or(self.end_date);
        (first, last)
    }
}
