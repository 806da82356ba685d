//! Snow accrual and danger scoring for a candidate fleet-wide solution.

use std::collections::HashSet;

use crate::fleet::Machine;
use crate::topology::{EndpointPair, RoadSegment, Topology};

/// Scores a fleet-wide solution against a snowfall forecast.
///
/// Works on a private copy of the segment set, so the caller's topology
/// is never polluted. Per stage, in order: every segment cleared by any
/// machine during that stage resets to zero snow (clearing either
/// direction clears the physical road), all other segments accrue the
/// stage's snowfall, and the stage's danger is the sum of
/// `snow_level * priority * lanes` over all segments. Returns the total
/// across stages.
///
/// Clearing resets snow only at that moment — it re-accrues from the
/// next uncleared stage on, so repeated clearing across stages matters.
pub fn simulate_danger(topology: &Topology, machines: &[Machine], forecast: &[u32]) -> f64 {
    let mut working = topology.segments().to_vec();
    let mut total = 0.0;

    for (stage_idx, &snowfall) in forecast.iter().enumerate() {
        let cleared: HashSet<EndpointPair> = machines
            .iter()
            .filter_map(|m| m.route.get(stage_idx))
            .flatten()
            .map(|&sid| topology.segment(sid).endpoints())
            .collect();

        for segment in &mut working {
            if cleared.contains(&segment.endpoints()) {
                segment.snow_level = 0.0;
            } else {
                segment.snow_level += f64::from(snowfall);
            }
        }

        total += working.iter().map(RoadSegment::danger_level).sum::<f64>();
    }

    total
}
