//! The road network graph.

use std::collections::HashMap;

use log::warn;

use super::location::{CoordKey, Location, LocationId};
use super::segment::{RoadSegment, SegmentId};

/// One road record for [`Topology::from_records`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadRecord {
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Road importance in [1, 100].
    pub priority: u32,
    /// Lane count, at least 1.
    pub lanes: u32,
}

impl From<((f64, f64), (f64, f64), u32, u32)> for RoadRecord {
    fn from((start, end, priority, lanes): ((f64, f64), (f64, f64), u32, u32)) -> Self {
        Self {
            start,
            end,
            priority,
            lanes,
        }
    }
}

/// The road network: locations, directed segments, and a designated
/// base (depot) location.
///
/// Structurally immutable once built. Invariant: both endpoints of every
/// segment are members of the location set, and the reverse segment
/// exists.
#[derive(Debug, Clone)]
pub struct Topology {
    locations: Vec<Location>,
    segments: Vec<RoadSegment>,
    coord_index: HashMap<CoordKey, LocationId>,
    segment_index: HashMap<(LocationId, LocationId), SegmentId>,
    outgoing: Vec<Vec<SegmentId>>,
    base: Option<LocationId>,
    geographic: bool,
}

impl Topology {
    pub fn new(geographic: bool) -> Self {
        Self {
            locations: Vec::new(),
            segments: Vec::new(),
            coord_index: HashMap::new(),
            segment_index: HashMap::new(),
            outgoing: Vec::new(),
            base: None,
            geographic,
        }
    }

    /// Builds a topology from a generic source of road records, then
    /// designates the base location.
    ///
    /// Malformed records — non-finite or coincident endpoints, priority
    /// outside [1, 100], zero lanes — are skipped with a warning;
    /// construction is never fatal.
    pub fn from_records<I, R>(records: I, base: (f64, f64), geographic: bool) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoadRecord>,
    {
        let mut topology = Self::new(geographic);
        for record in records {
            let record = record.into();
            if let Err(reason) = validate_record(&record) {
                warn!("skipping road record {record:?}: {reason}");
                continue;
            }
            topology.connect(record.start, record.end, record.priority, record.lanes);
        }
        topology.set_base(base.0, base.1);
        topology
    }

    /// Returns the existing location with these exact coordinates, or
    /// inserts a new one.
    pub fn get_or_create_location(&mut self, x: f64, y: f64) -> LocationId {
        let key = CoordKey::new(x, y);
        if let Some(&id) = self.coord_index.get(&key) {
            return id;
        }
        let id = LocationId(self.locations.len() as u32);
        self.locations.push(Location::new(x, y, self.geographic));
        self.outgoing.push(Vec::new());
        self.coord_index.insert(key, id);
        id
    }

    /// Designates the base (depot) location, creating it if absent.
    pub fn set_base(&mut self, x: f64, y: f64) -> LocationId {
        let id = self.get_or_create_location(x, y);
        self.base = Some(id);
        id
    }

    pub fn base(&self) -> Option<LocationId> {
        self.base
    }

    /// Inserts both directed segments for a physical road and registers
    /// mutual adjacency. A road between already-connected endpoints, or
    /// from a location to itself, is ignored.
    pub fn connect(&mut self, p1: (f64, f64), p2: (f64, f64), priority: u32, lanes: u32) {
        let a = self.get_or_create_location(p1.0, p1.1);
        let b = self.get_or_create_location(p2.0, p2.1);
        if a == b || self.segment_index.contains_key(&(a, b)) {
            return;
        }
        let length = self.distance(a, b);
        self.insert_segment(a, b, priority, lanes, length);
        self.insert_segment(b, a, priority, lanes, length);
        self.locations[a.index()].add_neighbor(b);
        self.locations[b.index()].add_neighbor(a);
    }

    fn insert_segment(
        &mut self,
        start: LocationId,
        end: LocationId,
        priority: u32,
        lanes: u32,
        length: f64,
    ) {
        let id = SegmentId(self.segments.len() as u32);
        self.segments
            .push(RoadSegment::new(start, end, priority, lanes, length));
        self.segment_index.insert((start, end), id);
        self.outgoing[start.index()].push(id);
    }

    /// Exact-coordinate location lookup.
    pub fn find_location(&self, x: f64, y: f64) -> Option<LocationId> {
        self.coord_index.get(&CoordKey::new(x, y)).copied()
    }

    /// Directed segment lookup by endpoint pair.
    pub fn find_segment(&self, a: LocationId, b: LocationId) -> Option<SegmentId> {
        self.segment_index.get(&(a, b)).copied()
    }

    /// All segments whose start is `location`.
    pub fn outgoing(&self, location: LocationId) -> &[SegmentId] {
        &self.outgoing[location.index()]
    }

    pub fn location(&self, id: LocationId) -> &Location {
        &self.locations[id.index()]
    }

    pub fn segment(&self, id: SegmentId) -> &RoadSegment {
        &self.segments[id.index()]
    }

    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    pub fn segment_ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.segments.len()).map(|i| SegmentId(i as u32))
    }

    /// Number of directed segments (two per physical road).
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Straight-line distance between two locations.
    pub fn distance(&self, a: LocationId, b: LocationId) -> f64 {
        self.locations[a.index()].distance_to(&self.locations[b.index()])
    }
}

fn validate_record(record: &RoadRecord) -> Result<(), &'static str> {
    let coords = [
        record.start.0,
        record.start.1,
        record.end.0,
        record.end.1,
    ];
    if coords.iter().any(|c| !c.is_finite()) {
        return Err("non-finite coordinate");
    }
    if record.start == record.end {
        return Err("coincident endpoints");
    }
    if !(1..=100).contains(&record.priority) {
        return Err("priority outside [1, 100]");
    }
    if record.lanes == 0 {
        return Err("zero lanes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Topology {
        // Unit square: (0,0)-(1,0)-(1,1)-(0,1), four roads.
        Topology::from_records(
            [
                ((0.0, 0.0), (1.0, 0.0), 10, 1),
                ((1.0, 0.0), (1.0, 1.0), 10, 1),
                ((1.0, 1.0), (0.0, 1.0), 10, 1),
                ((0.0, 1.0), (0.0, 0.0), 10, 1),
            ],
            (0.0, 0.0),
            false,
        )
    }

    #[test]
    fn test_get_or_create_deduplicates() {
        let mut topology = Topology::new(false);
        let a = topology.get_or_create_location(1.0, 2.0);
        let b = topology.get_or_create_location(1.0, 2.0);
        assert_eq!(a, b);
        assert_eq!(topology.location_count(), 1);
    }

    #[test]
    fn test_connect_inserts_both_directions() {
        let mut topology = Topology::new(false);
        topology.connect((0.0, 0.0), (1.0, 0.0), 40, 2);
        let a = topology.get_or_create_location(0.0, 0.0);
        let b = topology.get_or_create_location(1.0, 0.0);

        let forward = topology.find_segment(a, b).expect("forward segment");
        let reverse = topology.find_segment(b, a).expect("reverse segment");
        assert_ne!(forward, reverse);
        assert_eq!(
            topology.segment(forward).endpoints(),
            topology.segment(reverse).endpoints()
        );
        assert_eq!(topology.segment(forward).priority, 40);
        assert_eq!(topology.segment(reverse).lanes, 2);
    }

    #[test]
    fn test_connect_registers_adjacency() {
        let topology = square();
        let base = topology.base().unwrap();
        assert_eq!(topology.location(base).neighbors().len(), 2);
        assert_eq!(topology.outgoing(base).len(), 2);
        for &sid in topology.outgoing(base) {
            assert_eq!(topology.segment(sid).start, base);
        }
    }

    #[test]
    fn test_reverse_segment_invariant() {
        let topology = square();
        for segment in topology.segments() {
            assert!(topology.find_segment(segment.end, segment.start).is_some());
        }
    }

    #[test]
    fn test_duplicate_road_ignored() {
        let mut topology = Topology::new(false);
        topology.connect((0.0, 0.0), (1.0, 0.0), 40, 2);
        topology.connect((0.0, 0.0), (1.0, 0.0), 90, 1);
        assert_eq!(topology.segment_count(), 2);
    }

    #[test]
    fn test_from_records_skips_malformed() {
        let topology = Topology::from_records(
            [
                ((0.0, 0.0), (1.0, 0.0), 10, 1),
                ((0.0, 0.0), (0.0, 0.0), 10, 1),   // coincident
                ((0.0, 0.0), (2.0, 0.0), 0, 1),    // priority too low
                ((0.0, 0.0), (3.0, 0.0), 101, 1),  // priority too high
                ((0.0, 0.0), (4.0, 0.0), 10, 0),   // zero lanes
                ((f64::NAN, 0.0), (5.0, 0.0), 10, 1),
            ],
            (0.0, 0.0),
            false,
        );
        assert_eq!(topology.segment_count(), 2);
        assert!(topology.base().is_some());
    }

    #[test]
    fn test_base_reuses_existing_location() {
        let topology = square();
        let base = topology.base().unwrap();
        assert_eq!(base.index(), 0);
        assert_eq!(topology.location_count(), 4);
    }

    #[test]
    fn test_segment_length_from_distance() {
        let topology = square();
        for segment in topology.segments() {
            assert!((segment.length - 1.0).abs() < 1e-12);
        }
    }
}
