//! Reconstruct-from-stage: keep the early stages, rebuild the rest by
//! priority-greedy extension.

use std::collections::HashSet;

use rand::Rng;

use crate::fleet::{Route, Stage};
use crate::topology::{LocationId, SegmentId, Topology};

use super::{Machine, OperatorOutcome};

/// Picks a non-empty stage index ≥ 1 uniformly, keeps all earlier
/// stages verbatim, and rebuilds from there: each step takes the
/// highest-priority outgoing segment whose end neither revisits one of
/// the last `lookback` locations of the stage under construction nor
/// lies in the previous stage's visited-vertex set, falling back first
/// to a candidate that only avoids the recent window, then to the best
/// available outright. A stage ends when the next candidate would reach
/// or exceed `tmax`. Aborts without mutating when a rebuilt stage comes
/// out empty. Larger `lookback` means fewer repetitions but weaker
/// priority adherence.
pub fn apply<R: Rng>(
    machines: &mut [Machine],
    topology: &Topology,
    tmax: f64,
    lookback: usize,
    rng: &mut R,
) -> OperatorOutcome {
    let machine_idx = rng.random_range(0..machines.len());
    let speed = machines[machine_idx].speed;
    let route = &machines[machine_idx].route;
    let num_stages = route.len();
    if num_stages <= 1 {
        return OperatorOutcome::Unchanged;
    }

    let candidates: Vec<usize> = (1..num_stages).filter(|&i| !route[i].is_empty()).collect();
    if candidates.is_empty() {
        return OperatorOutcome::Unchanged;
    }
    let first_rebuilt = candidates[rng.random_range(0..candidates.len())];

    let mut new_route: Route = route[..first_rebuilt].to_vec();
    let mut cursor = topology.segment(route[first_rebuilt][0]).start;
    let mut blocked = stage_vertices(topology, &route[first_rebuilt - 1]);

    for _ in first_rebuilt..num_stages {
        let mut stage = Stage::new();
        let mut elapsed = 0.0;

        while elapsed < tmax {
            let Some(sid) = pick_segment(topology, cursor, &stage, lookback, &blocked) else {
                break;
            };
            let cost = topology.segment(sid).length / speed;
            if elapsed + cost >= tmax {
                break;
            }
            stage.push(sid);
            elapsed += cost;
            cursor = topology.segment(sid).end;
        }

        if stage.is_empty() {
            return OperatorOutcome::Unchanged;
        }
        blocked = stage_vertices(topology, &stage);
        new_route.push(stage);
    }

    machines[machine_idx].route = new_route;
    OperatorOutcome::Applied
}

/// Highest-priority admissible outgoing segment of `cursor`, with the
/// two-tier fallback described on [`apply`].
fn pick_segment(
    topology: &Topology,
    cursor: LocationId,
    stage: &[SegmentId],
    lookback: usize,
    blocked: &HashSet<LocationId>,
) -> Option<SegmentId> {
    let mut outgoing: Vec<SegmentId> = topology.outgoing(cursor).to_vec();
    outgoing.sort_by(|&a, &b| topology.segment(b).priority.cmp(&topology.segment(a).priority));

    let recent: Vec<LocationId> = stage
        .iter()
        .rev()
        .take(lookback)
        .map(|&sid| topology.segment(sid).start)
        .collect();

    outgoing
        .iter()
        .copied()
        .find(|&sid| {
            let end = topology.segment(sid).end;
            !recent.contains(&end) && !blocked.contains(&end)
        })
        .or_else(|| {
            outgoing
                .iter()
                .copied()
                .find(|&sid| !recent.contains(&topology.segment(sid).end))
        })
        .or_else(|| outgoing.first().copied())
}

fn stage_vertices(topology: &Topology, stage: &[SegmentId]) -> HashSet<LocationId> {
    stage
        .iter()
        .flat_map(|&sid| {
            let segment = topology.segment(sid);
            [segment.start, segment.end]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::stage_time;
    use crate::operators::test_support::{assert_stages_chained, seg, square};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_keeps_earlier_stages_and_rebuilds_rest() {
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let bc = seg(&topology, (1.0, 0.0), (1.0, 1.0));
        let cd = seg(&topology, (1.0, 1.0), (0.0, 1.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab], vec![bc], vec![cd]];
        let mut rng = StdRng::seed_from_u64(6);

        let outcome = apply(&mut machines, &topology, 2.5, 1, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        let route = &machines[0].route;
        assert_eq!(route.len(), 3);
        assert_eq!(route[0], vec![ab]);
        for stage in &route[1..] {
            assert!(!stage.is_empty());
            assert!(stage_time(&topology, stage, 1.0) < 2.5);
        }
        assert_stages_chained(&topology, &route[1..]);
    }

    #[test]
    fn test_rebuilt_stages_resume_from_kept_prefix() {
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let bc = seg(&topology, (1.0, 0.0), (1.0, 1.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab], vec![bc]];
        let mut rng = StdRng::seed_from_u64(6);

        let outcome = apply(&mut machines, &topology, 2.5, 1, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        // Stage 1 is the only rebuild candidate; it restarts where the
        // old stage 1 started.
        let rebuilt_start = topology.segment(machines[0].route[1][0]).start;
        assert_eq!(rebuilt_start, topology.segment(bc).start);
    }

    #[test]
    fn test_prefers_high_priority_roads() {
        // From (1,0) the continuation choices are priority 90 vs 5.
        let topology = Topology::from_records(
            [
                ((0.0, 0.0), (1.0, 0.0), 50, 1),
                ((1.0, 0.0), (1.0, 1.0), 90, 1),
                ((1.0, 0.0), (2.0, 0.0), 5, 1),
            ],
            (0.0, 0.0),
            false,
        );
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let low = seg(&topology, (1.0, 0.0), (2.0, 0.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab], vec![low]];
        let mut rng = StdRng::seed_from_u64(6);

        let outcome = apply(&mut machines, &topology, 1.5, 0, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        assert_eq!(topology.segment(machines[0].route[1][0]).priority, 90);
    }

    #[test]
    fn test_single_stage_route_is_noop() {
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab]];
        let before = machines[0].route.clone();
        let mut rng = StdRng::seed_from_u64(6);

        assert_eq!(
            apply(&mut machines, &topology, 2.5, 1, &mut rng),
            OperatorOutcome::Unchanged
        );
        assert_eq!(machines[0].route, before);
    }

    #[test]
    fn test_all_later_stages_empty_is_noop() {
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab], vec![], vec![]];
        let mut rng = StdRng::seed_from_u64(6);

        assert_eq!(
            apply(&mut machines, &topology, 2.5, 1, &mut rng),
            OperatorOutcome::Unchanged
        );
    }

    #[test]
    fn test_too_tight_budget_aborts_without_mutation() {
        // No segment fits under tmax, so the first rebuilt stage would
        // be empty and the route must stay as it was.
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let bc = seg(&topology, (1.0, 0.0), (1.0, 1.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab], vec![bc]];
        let before = machines[0].route.clone();
        let mut rng = StdRng::seed_from_u64(6);

        assert_eq!(
            apply(&mut machines, &topology, 0.5, 1, &mut rng),
            OperatorOutcome::Unchanged
        );
        assert_eq!(machines[0].route, before);
    }
}
