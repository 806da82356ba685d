//! Greedy initial-route construction.

use rand::Rng;

use crate::topology::{LocationId, SegmentId, Topology};

use super::machine::{Machine, Stage};

impl Machine {
    /// Builds the initial staged route by a greedy walk from the base.
    ///
    /// Per stage: step to a neighbor of the current position, excluding
    /// the immediately-previous location unless it is the only option —
    /// uniformly at random, or by highest `priority + jitter` when
    /// `priority_aware` (the jitter breaks ties so equal-priority roads
    /// do not cycle deterministically). A stage ends when no valid
    /// neighbor exists, when the next step would reach or exceed `tmax`,
    /// or when the walk has returned to base after at least one segment.
    /// Each stage resumes where the previous one ended.
    pub fn generate_initial_route<R: Rng>(
        &mut self,
        topology: &Topology,
        tmax: f64,
        num_stages: usize,
        priority_aware: bool,
        rng: &mut R,
    ) {
        self.route.clear();
        let Some(base) = topology.base() else {
            self.route.resize(num_stages, Stage::new());
            return;
        };

        let mut current = base;
        let mut previous: Option<LocationId> = None;

        for _ in 0..num_stages {
            let mut elapsed = 0.0;
            let mut stage = Stage::new();

            loop {
                let neighbors = topology.location(current).neighbors();
                if neighbors.is_empty() {
                    break;
                }
                let valid: Vec<LocationId> = neighbors
                    .iter()
                    .copied()
                    .filter(|&n| Some(n) != previous || neighbors.len() == 1)
                    .collect();
                if valid.is_empty() {
                    break;
                }

                let Some((next, sid)) = self.pick_step(topology, current, &valid, priority_aware, rng)
                else {
                    break;
                };

                let cost = topology.segment(sid).length / self.speed;
                if elapsed + cost >= tmax {
                    break;
                }

                stage.push(sid);
                elapsed += cost;
                previous = Some(current);
                current = next;

                if current == base && !stage.is_empty() {
                    break;
                }
            }

            self.route.push(stage);
        }
    }

    fn pick_step<R: Rng>(
        &self,
        topology: &Topology,
        current: LocationId,
        valid: &[LocationId],
        priority_aware: bool,
        rng: &mut R,
    ) -> Option<(LocationId, SegmentId)> {
        if priority_aware {
            let mut best: Option<(f64, LocationId, SegmentId)> = None;
            for &n in valid {
                let sid = topology.find_segment(current, n)?;
                let adjusted =
                    f64::from(topology.segment(sid).priority) + rng.random_range(0.0..0.1);
                if best.is_none_or(|(p, _, _)| adjusted > p) {
                    best = Some((adjusted, n, sid));
                }
            }
            best.map(|(_, n, sid)| (n, sid))
        } else {
            let n = valid[rng.random_range(0..valid.len())];
            topology.find_segment(current, n).map(|sid| (n, sid))
        }
    }
}
