//! Target-least-frequent-segment: send a machine toward the road the
//! rest of the fleet visits least.

use std::collections::HashMap;

use rand::Rng;

use crate::fleet::{Route, Stage};
use crate::routing::{astar, enforce_time_budget};
use crate::topology::{EndpointPair, LocationId, SegmentId, Topology};

use super::{Machine, OperatorOutcome};

/// Scores every road by how rarely the other machines traverse it
/// (blended with an inverted-priority term when `priority_aware`),
/// routes from the base to the least-frequent reachable one via A*,
/// appends the target segment, fills remaining horizon time with a
/// random-walk extension, and re-splits into stages under `tmax`.
/// Falls through to the next candidate when one does not fit; a no-op
/// only when no candidate is reachable and time-feasible.
pub fn apply<R: Rng>(
    machines: &mut [Machine],
    topology: &Topology,
    tmax: f64,
    priority_aware: bool,
    rng: &mut R,
) -> OperatorOutcome {
    let machine_idx = rng.random_range(0..machines.len());
    let num_stages = machines[machine_idx].route.len();
    if num_stages == 0 {
        return OperatorOutcome::Unchanged;
    }
    let Some(base) = topology.base() else {
        return OperatorOutcome::Unchanged;
    };
    let speed = machines[machine_idx].speed;
    let horizon = tmax * num_stages as f64;

    let mut frequency: HashMap<EndpointPair, usize> = HashMap::new();
    for (idx, machine) in machines.iter().enumerate() {
        if idx == machine_idx {
            continue;
        }
        for stage in &machine.route {
            for &sid in stage {
                *frequency.entry(topology.segment(sid).endpoints()).or_insert(0) += 1;
            }
        }
    }

    let max_priority = topology
        .segments()
        .iter()
        .map(|s| s.priority)
        .max()
        .unwrap_or(1) as f64;
    let mut scored: Vec<(f64, SegmentId)> = topology
        .segment_ids()
        .map(|sid| {
            let segment = topology.segment(sid);
            let count = frequency
                .get(&segment.endpoints())
                .copied()
                .unwrap_or(0) as f64;
            let score = if priority_aware {
                let freq_score = if machines.len() > 1 {
                    count / (machines.len() - 1) as f64
                } else {
                    1.0
                };
                let priority_score = 1.0 - f64::from(segment.priority) / max_priority;
                (freq_score + priority_score) / 2.0
            } else {
                count
            };
            (score, sid)
        })
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (_, target) in scored {
        let target_segment = topology.segment(target);
        let Some(mut flat) = astar(topology, base, target_segment.start, None) else {
            continue;
        };
        flat.push(target);

        let total_time = flat
            .iter()
            .map(|&sid| topology.segment(sid).length)
            .sum::<f64>()
            / speed;
        if total_time > horizon {
            continue;
        }

        let remaining = horizon - total_time;
        if remaining > 0.0 {
            let extension =
                random_fill(topology, target_segment.end, base, remaining, speed, rng);
            flat.extend(extension);
        }

        let mut route: Route = vec![Stage::new(); num_stages];
        route[0] = flat;
        enforce_time_budget(&mut route, topology, tmax, speed);
        machines[machine_idx].route = route;
        return OperatorOutcome::Applied;
    }

    OperatorOutcome::Unchanged
}

/// Greedy random-walk extension from `start`: steps to a uniformly
/// chosen neighbor that is no dead end (unless it is the base) and not
/// the location just left, backtracking only when nothing else remains,
/// until the next step would exceed `remaining`.
fn random_fill<R: Rng>(
    topology: &Topology,
    start: LocationId,
    base: LocationId,
    remaining: f64,
    speed: f64,
    rng: &mut R,
) -> Vec<SegmentId> {
    let mut extension = Vec::new();
    let mut current = start;
    let mut last: Option<LocationId> = None;
    let mut used = 0.0;

    loop {
        let valid: Vec<LocationId> = topology
            .location(current)
            .neighbors()
            .iter()
            .copied()
            .filter(|&n| {
                (topology.location(n).neighbors().len() > 1 || n == base) && Some(n) != last
            })
            .collect();
        let next = if valid.is_empty() {
            match last {
                Some(l) => l,
                None => break,
            }
        } else {
            valid[rng.random_range(0..valid.len())]
        };

        let Some(sid) = topology.find_segment(current, next) else {
            break;
        };
        let cost = topology.segment(sid).length / speed;
        if used + cost > remaining {
            break;
        }

        extension.push(sid);
        used += cost;
        last = Some(current);
        current = next;
    }

    extension
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::stage_time;
    use crate::operators::test_support::{assert_stages_chained, seg, square};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_route_rebuilt_from_base_within_budget() {
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab], vec![]];
        let mut rng = StdRng::seed_from_u64(12);

        let outcome = apply(&mut machines, &topology, 2.5, false, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        let route = &machines[0].route;
        assert_eq!(route.len(), 2);
        assert!(!route[0].is_empty());
        assert_eq!(
            topology.segment(route[0][0]).start,
            topology.base().unwrap()
        );
        for stage in route {
            assert!(stage_time(&topology, stage, 1.0) <= 2.5 + 1e-9);
        }
        assert_stages_chained(&topology, route);
    }

    #[test]
    fn test_targets_road_other_machines_neglect() {
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let bc = seg(&topology, (1.0, 0.0), (1.0, 1.0));
        let da = seg(&topology, (0.0, 1.0), (0.0, 0.0));
        let cd = topology
            .segment(seg(&topology, (1.0, 1.0), (0.0, 1.0)))
            .endpoints();

        // Both machines cover AB/BC/DA, so whichever one the operator
        // draws, the other still leaves CD as the least-frequent road.
        let mut machines = vec![Machine::new(1.0), Machine::new(1.0)];
        machines[0].route = vec![vec![ab, bc, da]];
        machines[1].route = vec![vec![ab, bc, da]];
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = apply(&mut machines, &topology, 3.5, false, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        let visits_cd = machines
            .iter()
            .flat_map(|m| m.route.iter().flatten())
            .any(|&sid| topology.segment(sid).endpoints() == cd);
        assert!(visits_cd, "expected the rebuilt route to reach CD");
    }

    #[test]
    fn test_unreachable_targets_are_skipped() {
        // The disconnected road sorts first (equal scores, lower id)
        // but cannot be reached; the operator settles on a reachable
        // one instead of failing.
        let mut topology = Topology::new(false);
        topology.connect((5.0, 5.0), (6.0, 5.0), 10, 1);
        topology.connect((0.0, 0.0), (1.0, 0.0), 10, 1);
        topology.set_base(0.0, 0.0);
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![]];
        let mut rng = StdRng::seed_from_u64(3);

        let outcome = apply(&mut machines, &topology, 3.0, false, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        assert!(!machines[0].route[0].is_empty());
    }

    #[test]
    fn test_nothing_feasible_is_noop() {
        // The budget cannot fit even the shortest road.
        let topology = square();
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![]];
        let before = machines[0].route.clone();
        let mut rng = StdRng::seed_from_u64(3);

        let outcome = apply(&mut machines, &topology, 0.25, false, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Unchanged);
        assert_eq!(machines[0].route, before);
    }

    #[test]
    fn test_priority_aware_prefers_important_neglected_roads() {
        // Both roads untouched by others; the blend ranks the
        // high-priority one first.
        let topology = Topology::from_records(
            [
                ((0.0, 0.0), (1.0, 0.0), 100, 1),
                ((0.0, 0.0), (0.0, 1.0), 10, 1),
            ],
            (0.0, 0.0),
            false,
        );
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![]];
        let mut rng = StdRng::seed_from_u64(3);

        let outcome = apply(&mut machines, &topology, 1.5, true, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        assert_eq!(topology.segment(machines[0].route[0][0]).priority, 100);
    }
}
