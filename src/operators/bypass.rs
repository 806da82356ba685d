//! Bypass-one-vertex: replace the shared vertex of two consecutive
//! segments with a depth-bounded detour.

use rand::Rng;

use crate::fleet::{Route, Stage};
use crate::routing::{bounded_detour, complete_stage};
use crate::topology::{SegmentId, Topology};

use super::{Machine, OperatorOutcome};

/// Flattens the machine's staged route, scans consecutive-segment pairs
/// from a random start (wrapping once) for one whose middle vertex
/// admits a detour of at most `search_depth` hops, splices the first
/// hit in, re-splits into the original stage count honoring `tmax`, and
/// completes any stage left short. Larger `search_depth` admits longer
/// detours and therefore more disruptive candidates.
pub fn apply<R: Rng>(
    machines: &mut [Machine],
    topology: &Topology,
    tmax: f64,
    search_depth: usize,
    rng: &mut R,
) -> OperatorOutcome {
    let machine_idx = rng.random_range(0..machines.len());
    let speed = machines[machine_idx].speed;
    let num_stages = machines[machine_idx].route.len();
    let flat: Vec<SegmentId> = machines[machine_idx]
        .route
        .iter()
        .flatten()
        .copied()
        .collect();
    if flat.len() < 2 {
        return OperatorOutcome::Unchanged;
    }

    let mut idx = rng.random_range(0..flat.len() - 1);
    let stop = if idx == 0 { flat.len() - 2 } else { idx - 1 };
    let hit = loop {
        let first = topology.segment(flat[idx]);
        let second = topology.segment(flat[idx + 1]);
        if let Some(detour) =
            bounded_detour(topology, first.start, second.end, first.end, search_depth)
        {
            break Some((idx, detour));
        }
        idx = if idx == flat.len() - 2 { 0 } else { idx + 1 };
        if idx == stop {
            break None;
        }
    };
    let Some((idx, detour)) = hit else {
        return OperatorOutcome::Unchanged;
    };

    let mut combined = flat[..idx].to_vec();
    combined.extend(detour);
    combined.extend(&flat[idx + 2..]);

    machines[machine_idx].route = resplit(topology, &combined, num_stages, tmax, speed, rng);
    OperatorOutcome::Applied
}

/// Splits a flat segment sequence back into `num_stages` stages under
/// `tmax`, dropping whatever does not fit into the horizon, then
/// completes trailing stages left short.
fn resplit<R: Rng>(
    topology: &Topology,
    combined: &[SegmentId],
    num_stages: usize,
    tmax: f64,
    speed: f64,
    rng: &mut R,
) -> Route {
    let mut route: Route = vec![Stage::new(); num_stages];
    let mut stage = 0;
    let mut elapsed = 0.0;

    for &sid in combined {
        let cost = topology.segment(sid).length / speed;
        if elapsed + cost > tmax {
            stage += 1;
            elapsed = 0.0;
            if stage >= num_stages {
                break;
            }
        }
        route[stage].push(sid);
        elapsed += cost;
    }

    for idx in stage.min(num_stages)..num_stages {
        complete_stage(&mut route, idx, topology, tmax, speed, 0, rng);
    }
    route
}
