//! Time-budget enforcement and stage completion.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::fleet::{stage_time, Route};
use crate::topology::{LocationId, SegmentId, Topology};

/// Walks each stage left to right and evicts every segment whose
/// inclusion pushes the accumulated time past `tmax`. Evicted segments
/// keep their original order and are prepended to the next stage; the
/// final stage drops them instead. Each stage is re-scanned until no
/// eviction remains, so cascaded overflow settles in a single forward
/// pass over the stages.
pub fn enforce_time_budget(route: &mut Route, topology: &Topology, tmax: f64, speed: f64) {
    let num_stages = route.len();
    for idx in 0..num_stages {
        loop {
            let mut elapsed = 0.0;
            let mut evicted: Vec<usize> = Vec::new();
            for (pos, &sid) in route[idx].iter().enumerate() {
                elapsed += topology.segment(sid).length / speed;
                if elapsed > tmax {
                    evicted.push(pos);
                }
            }
            if evicted.is_empty() {
                break;
            }
            if idx + 1 < num_stages {
                let mut moved = Vec::with_capacity(evicted.len());
                for &pos in evicted.iter().rev() {
                    moved.push(route[idx].remove(pos));
                }
                moved.reverse();
                route[idx + 1].splice(0..0, moved);
            } else {
                for &pos in evicted.iter().rev() {
                    route[idx].remove(pos);
                }
            }
        }
    }
}

/// Extends `route[stage_idx]` with random outgoing segments while the
/// stage's time stays under `tmax`.
///
/// A candidate is skipped when its end revisits one of the stage's last
/// `lookback` visited locations (`lookback == 0` disables the
/// restriction) or when it no longer fits under `tmax`; the extension
/// stops at the first round with no qualifying candidate. An empty
/// stage starts from the previous stage's final position; with no such
/// position there is nothing to complete.
pub fn complete_stage<R: Rng>(
    route: &mut Route,
    stage_idx: usize,
    topology: &Topology,
    tmax: f64,
    speed: f64,
    lookback: usize,
    rng: &mut R,
) {
    let mut cursor = match route[stage_idx].last() {
        Some(&sid) => topology.segment(sid).end,
        None => {
            if stage_idx == 0 {
                return;
            }
            match route[stage_idx - 1].last() {
                Some(&sid) => topology.segment(sid).end,
                None => return,
            }
        }
    };

    let mut elapsed = stage_time(topology, &route[stage_idx], speed);
    while elapsed < tmax {
        let mut candidates: Vec<SegmentId> = topology.outgoing(cursor).to_vec();
        if candidates.is_empty() {
            break;
        }
        candidates.shuffle(rng);

        let recent: Vec<LocationId> = route[stage_idx]
            .iter()
            .rev()
            .take(lookback)
            .map(|&sid| topology.segment(sid).end)
            .collect();

        let chosen = candidates.into_iter().find(|&sid| {
            let segment = topology.segment(sid);
            if lookback > 0 && recent.contains(&segment.end) {
                return false;
            }
            elapsed + segment.length / speed <= tmax
        });
        let Some(sid) = chosen else {
            break;
        };

        route[stage_idx].push(sid);
        elapsed += topology.segment(sid).length / speed;
        cursor = topology.segment(sid).end;
    }
}
