//! The machine type and route aliases.

use crate::topology::{SegmentId, Topology};

/// One stage's segment sequence.
pub type Stage = Vec<SegmentId>;

/// A full multi-stage route; stage count equals the forecast length.
pub type Route = Vec<Stage>;

/// A clearing machine: a speed and an owned staged route.
#[derive(Debug, Clone)]
pub struct Machine {
    /// Travel speed, distance units per hour.
    pub speed: f64,
    /// One segment sequence per forecast stage. Consecutive segments
    /// within a stage chain end to start.
    pub route: Route,
}

impl Machine {
    pub fn new(speed: f64) -> Self {
        Self {
            speed,
            route: Vec::new(),
        }
    }
}

/// Time to traverse `stage` at `speed`.
pub fn stage_time(topology: &Topology, stage: &[SegmentId], speed: f64) -> f64 {
    stage
        .iter()
        .map(|&sid| topology.segment(sid).length)
        .sum::<f64>()
        / speed
}
