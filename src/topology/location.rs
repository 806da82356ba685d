//! Graph vertices: road ends and intersections.

use geo::algorithm::geodesic_distance::GeodesicDistance;
use geo::Point;

/// Index of a [`Location`] within its [`Topology`](super::Topology).
///
/// Locations are deduplicated by coordinate at insertion, so id equality
/// coincides with coordinate equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(pub(crate) u32);

impl LocationId {
    /// Raw index into the topology's location arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A graph vertex: the start or end of a road, or an intersection.
#[derive(Debug, Clone)]
pub struct Location {
    /// X coordinate (longitude when geographic).
    pub x: f64,
    /// Y coordinate (latitude when geographic).
    pub y: f64,
    /// Whether the coordinates are true geographic coordinates.
    /// Distances are geodesic when set, Euclidean otherwise.
    pub geographic: bool,
    pub(crate) neighbors: Vec<LocationId>,
}

impl Location {
    pub(crate) fn new(x: f64, y: f64, geographic: bool) -> Self {
        Self {
            x,
            y,
            geographic,
            neighbors: Vec::new(),
        }
    }

    /// Adjacent locations, duplicates suppressed.
    pub fn neighbors(&self) -> &[LocationId] {
        &self.neighbors
    }

    pub(crate) fn add_neighbor(&mut self, id: LocationId) {
        if !self.neighbors.contains(&id) {
            self.neighbors.push(id);
        }
    }

    /// Distance to another location: kilometers for geographic
    /// coordinates, plain Euclidean units otherwise.
    pub fn distance_to(&self, other: &Location) -> f64 {
        if self.geographic {
            Point::new(self.x, self.y).geodesic_distance(&Point::new(other.x, other.y)) / 1000.0
        } else {
            ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
        }
    }
}

/// Coordinate key for exact-or-create vertex insertion. Bit-level
/// equality matches by-value coordinate identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CoordKey(u64, u64);

impl CoordKey {
    pub(crate) fn new(x: f64, y: f64) -> Self {
        Self(x.to_bits(), y.to_bits())
    }
}
