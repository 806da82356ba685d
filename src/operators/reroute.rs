//! Remove-and-A*-repair: delete one segment and splice in the shortest
//! replacement path.

use rand::Rng;

use crate::routing::{astar, enforce_time_budget};
use crate::topology::Topology;

use super::{Machine, OperatorOutcome};

/// Picks a random stage and a random segment within it, searches for a
/// replacement path between the removed segment's endpoints with that
/// road excluded (both directions), splices the repair path in, and
/// re-applies the time budget across the whole route. An empty stage or
/// an unreachable repair leaves the route unchanged.
pub fn apply<R: Rng>(
    machines: &mut [Machine],
    topology: &Topology,
    tmax: f64,
    rng: &mut R,
) -> OperatorOutcome {
    let machine_idx = rng.random_range(0..machines.len());
    let speed = machines[machine_idx].speed;
    let route = &machines[machine_idx].route;
    if route.is_empty() {
        return OperatorOutcome::Unchanged;
    }

    let stage_idx = rng.random_range(0..route.len());
    if route[stage_idx].is_empty() {
        return OperatorOutcome::Unchanged;
    }
    let segment_idx = rng.random_range(0..route[stage_idx].len());
    let removed = topology.segment(route[stage_idx][segment_idx]);

    let Some(repair) = astar(topology, removed.start, removed.end, Some(removed.endpoints()))
    else {
        return OperatorOutcome::Unchanged;
    };

    let route = &mut machines[machine_idx].route;
    route[stage_idx].splice(segment_idx..=segment_idx, repair);
    enforce_time_budget(route, topology, tmax, speed);
    OperatorOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::stage_time;
    use crate::operators::test_support::{assert_stages_chained, seg, square};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_replaces_segment_with_detour() {
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab]];
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = apply(&mut machines, &topology, 10.0, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        let stage = &machines[0].route[0];
        // AB replaced by the three-segment way around the square.
        assert_eq!(stage.len(), 3);
        assert_eq!(
            topology.segment(stage[0]).start,
            topology.segment(ab).start
        );
        assert_eq!(
            topology.segment(*stage.last().unwrap()).end,
            topology.segment(ab).end
        );
        assert!(stage
            .iter()
            .all(|&sid| topology.segment(sid).endpoints() != topology.segment(ab).endpoints()));
        assert_stages_chained(&topology, &machines[0].route);
    }

    #[test]
    fn test_isolated_road_reports_infeasible() {
        // Two-node graph: no alternate path exists, so the operator
        // must leave the route alone and not fault.
        let mut topology = Topology::new(false);
        topology.connect((0.0, 0.0), (1.0, 0.0), 10, 1);
        topology.set_base(0.0, 0.0);
        let a = topology.find_location(0.0, 0.0).unwrap();
        let b = topology.find_location(1.0, 0.0).unwrap();
        let ab = topology.find_segment(a, b).unwrap();
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab]];
        let before = machines[0].route.clone();
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = apply(&mut machines, &topology, 10.0, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Unchanged);
        assert_eq!(machines[0].route, before);
    }

    #[test]
    fn test_empty_stage_draw_is_noop() {
        let topology = square();
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![]];
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(
            apply(&mut machines, &topology, 10.0, &mut rng),
            OperatorOutcome::Unchanged
        );
    }

    #[test]
    fn test_budget_enforced_after_splice() {
        let topology = square();
        let ab = seg(&topology, (0.0, 0.0), (1.0, 0.0));
        let mut machines = vec![Machine::new(1.0)];
        machines[0].route = vec![vec![ab]];
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = apply(&mut machines, &topology, 2.5, &mut rng);

        assert_eq!(outcome, OperatorOutcome::Applied);
        // The three-segment repair exceeds the budget; the single (and
        // therefore last) stage drops the excess.
        assert_eq!(machines[0].route[0].len(), 2);
        assert!(stage_time(&topology, &machines[0].route[0], 1.0) <= 2.5 + 1e-9);
    }
}
