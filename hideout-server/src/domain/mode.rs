//! Route categories and mode filters.

use std::fmt;
use std::str::FromStr;

/// Error returned when a mode name or code is not a known route category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route category: {0}")]
pub struct UnknownMode(pub String);

/// A GTFS `route_type` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteCategory {
    LightRail,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableTram,
    AerialLift,
    Funicular,
    Trolley,
    Monorail,
}

impl RouteCategory {
    /// Every category, in GTFS code order.
    pub const ALL: [RouteCategory; 10] = [
        RouteCategory::LightRail,
        RouteCategory::Subway,
        RouteCategory::Rail,
        RouteCategory::Bus,
        RouteCategory::Ferry,
        RouteCategory::CableTram,
        RouteCategory::AerialLift,
        RouteCategory::Funicular,
        RouteCategory::Trolley,
        RouteCategory::Monorail,
    ];

    /// The GTFS `route_type` code.
    pub fn code(self) -> u16 {
        match self {
            RouteCategory::LightRail => 0,
            RouteCategory::Subway => 1,
            RouteCategory::Rail => 2,
            RouteCategory::Bus => 3,
            RouteCategory::Ferry => 4,
            RouteCategory::CableTram => 5,
            RouteCategory::AerialLift => 6,
            RouteCategory::Funicular => 7,
            RouteCategory::Trolley => 11,
            RouteCategory::Monorail => 12,
        }
    }

    /// Look up a category by GTFS `route_type` code.
    pub fn from_code(code: u16) -> Result<Self, UnknownMode> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| UnknownMode(code.to_string()))
    }

    /// The upper-case name used in query strings, e.g. `LIGHT_RAIL`.
    pub fn name(self) -> &'static str {
        match self {
            RouteCategory::LightRail => "LIGHT_RAIL",
            RouteCategory::Subway => "SUBWAY",
            RouteCategory::Rail => "RAIL",
            RouteCategory::Bus => "BUS",
            RouteCategory::Ferry => "FERRY",
            RouteCategory::CableTram => "CABLE_TRAM",
            RouteCategory::AerialLift => "AERIAL_LIFT",
            RouteCategory::Funicular => "FUNICULAR",
            RouteCategory::Trolley => "TROLLEY",
            RouteCategory::Monorail => "MONORAIL",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl FromStr for RouteCategory {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMode(wanted.to_string()))
    }
}

impl fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of route categories, used both as the travel-mode filter and the
/// hiding-mode filter.
///
/// Built once at the request boundary; membership checks during the search
/// are a single bit test.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeSet(u16);

impl ModeSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Every known category.
    pub fn all() -> Self {
        RouteCategory::ALL.into_iter().collect()
    }

    /// Parse a comma separated list of category names, e.g.
    /// `"BUS,LIGHT_RAIL"`. Blank entries are ignored.
    pub fn parse_list(list: &str) -> Result<Self, UnknownMode> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(RouteCategory::from_str)
            .collect()
    }

    pub fn insert(&mut self, category: RouteCategory) {
        self.0 |= category.bit();
    }

    pub fn contains(&self, category: RouteCategory) -> bool {
        self.0 & category.bit() != 0
    }

    /// True if the two sets share at least one category.
    pub fn intersects(&self, other: ModeSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = RouteCategory> + '_ {
        RouteCategory::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<RouteCategory> for ModeSet {
    fn from_iter<I: IntoIterator<Item = RouteCategory>>(iter: I) -> Self {
        let mut set = ModeSet::empty();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(RouteCategory::name).collect();
        f.write_str(&names.join(","))
    }
}
