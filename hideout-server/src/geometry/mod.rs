//! Walking-distance queries between stops.
//!
//! The engine only needs "which stops lie within this radius of that stop,
//! and how far away is each". Distances are straight-line metres in a
//! projected plane.

mod index;

use crate::domain::StopId;

pub use index::StopIndex;

/// Error from a geometry query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// The centre stop has no known position
    #[error("no position for stop {0}")]
    UnknownStop(StopId),

    /// A stop position could not be projected
    #[error("invalid coordinates for stop {stop}: ({lat}, {lon})")]
    InvalidCoordinates { stop: StopId, lat: f64, lon: f64 },
}

/// A stop near a query centre.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStop {
    pub stop_id: StopId,
    /// Straight-line distance from the centre stop, in metres.
    pub distance: f64,
}

/// Spatial lookups over stop positions.
pub trait Geometry {
    /// Stops within `radius` metres of `center`, nearest first.
    ///
    /// The centre stop itself is included at distance zero.
    fn stops_within(&self, center: &StopId, radius: f64) -> Result<Vec<NearbyStop>, GeometryError>;
}
