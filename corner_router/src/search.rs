// Greedy A* over the waypoint graph plus the two query endpoints.
//
// The search space uses `VirtualId`s: 0 is the origin, 1 the target, and
// graph node `i` is `i + 2`. Edges are the origin's dynamic links (0 -> node),
// the target's dynamic links (node -> 1) and the graph's own edges. Step cost
// is either 1 per edge (`use_unit_cost`) or the selected distance metric.
//
// The heuristic is `heuristic_weight * metric(point, target)`. Weights above
// 1.0 make it inadmissible: the search reaches the target sooner but the
// route is not guaranteed shortest. Routes only need to be plausible, so the
// weight is left to configuration.
//
// The open set is a `BinaryHeap` (min-heap via reversed ordering, the same
// pattern as the event queue in a tick simulation). There is no closed set
// and no decrease-key: improved costs push a new entry, and a popped entry
// whose `g` is worse than the best known `g` for its id is stale and skipped.
// Ties on `f` pop the lower virtual id first.
//
// Scores and breadcrumbs live in `Vec`s indexed by virtual id.
//
// See also: `links.rs` for how the endpoint links are chosen, `router.rs`
// for the failure handling around a `None` result.

use crate::config::{DistanceMetric, SearchParams};
use crate::graph::WaypointGraph;
use crate::types::{NodeId, Vec3, VirtualId};
use log::trace;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A route through the graph, endpoints included.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub ids: Vec<VirtualId>,
    pub points: Vec<Vec3>,
    /// Accumulated step cost (not necessarily the geometric length).
    pub cost: f32,
    pub expansions: usize,
}

/// Open-set entry. `g` is carried so stale entries can be recognized.
struct OpenEntry {
    id: VirtualId,
    f_score: f32,
    g_score: f32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score.total_cmp(&other.f_score) == Ordering::Equal && self.id == other.id
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
        // Reversed for min-heap: smallest f_score is "greatest".
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.id.cmp(&self.id))
    }
}

pub fn metric_distance(metric: DistanceMetric, a: Vec3, b: Vec3) -> f32 {
    match metric {
        DistanceMetric::Euclidean => a.distance(b),
        DistanceMetric::Manhattan => a.manhattan_distance(b),
    }
}

/// The query endpoints and their dynamic links.
#[derive(Clone, Copy, Debug)]
pub struct SearchQuery<'a> {
    pub origin: Vec3,
    pub target: Vec3,
    pub origin_links: &'a [NodeId],
    pub target_links: &'a [NodeId],
}

/// Run greedy A* from virtual id 0 to virtual id 1.
///
/// Returns `None` if the heap empties or `max_search_expansions` is exceeded.
pub fn greedy_astar(
    graph: &WaypointGraph,
    query: &SearchQuery<'_>,
    params: &SearchParams,
) -> Option<SearchResult> {
    let n = graph.node_count() + 2;
    let position = |id: VirtualId| match id.node() {
        Some(node) => graph.position(node),
        None if id == VirtualId::ORIGIN => query.origin,
        None => query.target,
    };
    let step_cost = |a: Vec3, b: Vec3| {
        if params.use_unit_cost {
            1.0
        } else {
            metric_distance(params.distance_metric, a, b)
        }
    };
    let heuristic =
        |p: Vec3| params.heuristic_weight * metric_distance(params.distance_metric, p, query.target);

    let mut links_target = vec![false; graph.node_count()];
    for node in query.target_links {
        if let Some(flag) = links_target.get_mut(node.index()) {
            *flag = true;
        }
    }

    let mut g_score = vec![f32::INFINITY; n];
    let mut came_from: Vec<Option<VirtualId>> = vec![None; n];
    let mut open = BinaryHeap::new();
    let mut expansions = 0usize;
    let mut successors: Vec<VirtualId> = Vec::new();

    g_score[VirtualId::ORIGIN.index()] = 0.0;
    open.push(OpenEntry {
        id: VirtualId::ORIGIN,
        f_score: heuristic(query.origin),
        g_score: 0.0,
    });

    while let Some(current) = open.pop() {
        let ci = current.id.index();
        if current.id == VirtualId::TARGET {
            trace!("search reached target after {expansions} expansions");
            let ids = reconstruct(&came_from, VirtualId::TARGET);
            let points = ids.iter().map(|&id| position(id)).collect();
            return Some(SearchResult {
                ids,
                points,
                cost: current.g_score,
                expansions,
            });
        }
        if current.g_score > g_score[ci] {
            continue;
        }

        expansions += 1;
        if expansions > params.max_search_expansions as usize {
            trace!("search gave up after {expansions} expansions");
            return None;
        }

        successors.clear();
        match current.id.node() {
            None => successors.extend(query.origin_links.iter().map(|&n| VirtualId::from_node(n))),
            Some(node) => {
                successors.extend(graph.neighbors(node).map(VirtualId::from_node));
                if links_target[node.index()] {
                    successors.push(VirtualId::TARGET);
                }
            }
        }

        let here = position(current.id);
        for &next in &successors {
            let ni = next.index();
            let there = position(next);
            let tentative = current.g_score + step_cost(here, there);
            if tentative < g_score[ni] {
                g_score[ni] = tentative;
                came_from[ni] = Some(current.id);
                open.push(OpenEntry {
                    id: next,
                    f_score: tentative + heuristic(there),
                    g_score: tentative,
                });
            }
        }
    }

    trace!("search exhausted the open set after {expansions} expansions");
    None
}

fn reconstruct(came_from: &[Option<VirtualId>], goal: VirtualId) -> Vec<VirtualId> {
    let mut ids = vec![goal];
    let mut current = goal;
    while let Some(prev) = came_from[current.index()] {
        ids.push(prev);
        current = prev;
    }
    ids.reverse();
    ids
}
