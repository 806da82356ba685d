//! Graph searches shared by the neighborhood operators.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::topology::{EndpointPair, LocationId, SegmentId, Topology};

/// Open-set entry; the heap is ordered so the smallest f-score pops
/// first.
struct OpenEntry {
    f_score: f64,
    location: LocationId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| self.location.cmp(&other.location))
    }
}

/// A* shortest path from `start` to `goal` over accumulated geometric
/// distance, with straight-line distance to `goal` as the heuristic.
///
/// `excluded` removes one physical road — both directed segments — from
/// consideration. Returns the connecting segment sequence (empty when
/// `start == goal`), or `None` when the goal is unreachable.
pub fn astar(
    topology: &Topology,
    start: LocationId,
    goal: LocationId,
    excluded: Option<EndpointPair>,
) -> Option<Vec<SegmentId>> {
    let mut open = BinaryHeap::new();
    let mut closed: HashSet<LocationId> = HashSet::new();
    let mut came_from: HashMap<LocationId, SegmentId> = HashMap::new();
    let mut g_score: HashMap<LocationId, f64> = HashMap::new();

    g_score.insert(start, 0.0);
    open.push(OpenEntry {
        f_score: topology.distance(start, goal),
        location: start,
    });

    while let Some(OpenEntry {
        location: current, ..
    }) = open.pop()
    {
        if current == goal {
            return Some(reconstruct(topology, &came_from, start, goal));
        }
        if !closed.insert(current) {
            continue;
        }
        let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);

        for &sid in topology.outgoing(current) {
            let segment = topology.segment(sid);
            if excluded == Some(segment.endpoints()) {
                continue;
            }
            if closed.contains(&segment.end) {
                continue;
            }
            let tentative = current_g + segment.length;
            if tentative < g_score.get(&segment.end).copied().unwrap_or(f64::INFINITY) {
                came_from.insert(segment.end, sid);
                g_score.insert(segment.end, tentative);
                open.push(OpenEntry {
                    f_score: tentative + topology.distance(segment.end, goal),
                    location: segment.end,
                });
            }
        }
    }

    None
}

fn reconstruct(
    topology: &Topology,
    came_from: &HashMap<LocationId, SegmentId>,
    start: LocationId,
    goal: LocationId,
) -> Vec<SegmentId> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&sid) => {
                path.push(sid);
                current = topology.segment(sid).start;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Depth-first, stack-based search for a path from `start` to `goal` of
/// at most `max_depth` hops that never visits `avoid`.
///
/// Returns `None` when no non-empty path exists within the bound; in
/// particular `start == goal` yields `None`, so a caller always gets a
/// real detour.
pub fn bounded_detour(
    topology: &Topology,
    start: LocationId,
    goal: LocationId,
    avoid: LocationId,
    max_depth: usize,
) -> Option<Vec<SegmentId>> {
    let mut visited: HashSet<LocationId> = HashSet::new();
    visited.insert(avoid);
    let mut stack: Vec<(LocationId, usize, Vec<SegmentId>)> = vec![(start, 0, Vec::new())];

    while let Some((current, depth, path)) = stack.pop() {
        if depth > max_depth {
            continue;
        }
        if current == goal {
            if path.is_empty() {
                return None;
            }
            return Some(path);
        }
        if !visited.insert(current) {
            continue;
        }
        for &sid in topology.outgoing(current) {
            let segment = topology.segment(sid);
            if visited.contains(&segment.end) {
                continue;
            }
            let mut next_path = path.clone();
            next_path.push(sid);
            stack.push((segment.end, depth + 1, next_path));
        }
    }

    None
}
