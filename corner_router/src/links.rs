// Dynamic links: connecting a query endpoint into the static graph.
//
// The origin and target move every query and are never graph nodes. Each is
// linked to a handful of visible nodes instead. Nodes are ranked by
//
//     distance(point, node) + 0.25 * distance(node, other_endpoint)
//
// so links that also lead toward the other end of the route win ties with
// links that lead away from it. Only the best `limit * multiplier` ranked
// nodes are visibility-tested, in ranking order, and testing stops once
// `limit` visible links are found. This bounds collision queries per
// endpoint regardless of graph size.
//
// See also: `search.rs`, which treats the returned links as the edges out of
// virtual id 0 and into virtual id 1.

use crate::collision::{CollisionQuery, Probe};
use crate::graph::WaypointGraph;
use crate::types::{NodeId, Vec3};
use log::trace;
use std::cmp::Ordering;

/// Weight of the node-to-other-endpoint term in the link ranking.
pub const OTHER_ENDPOINT_BIAS: f32 = 0.25;

/// Visible graph nodes for `point`, best ranked first. Empty when the graph
/// is empty or nothing in the candidate window is visible.
pub fn resolve_links<Q: CollisionQuery + ?Sized>(
    graph: &WaypointGraph,
    point: Vec3,
    other_endpoint: Vec3,
    limit: usize,
    multiplier: usize,
    probe: &mut Probe<'_, Q>,
) -> Vec<NodeId> {
    let window = limit.saturating_mul(multiplier);
    if graph.is_empty() || window == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(f32, NodeId)> = graph
        .node_ids()
        .map(|id| {
            let p = graph.position(id);
            (point.distance(p) + OTHER_ENDPOINT_BIAS * p.distance(other_endpoint), id)
        })
        .collect();
    let by_score = |a: &(f32, NodeId), b: &(f32, NodeId)| -> Ordering {
        a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
    };
    if ranked.len() > window {
        ranked.select_nth_unstable_by(window, by_score);
        ranked.truncate(window);
    }
    ranked.sort_by(by_score);

    let mut links = Vec::with_capacity(limit);
    for &(_, id) in &ranked {
        if probe.segment_clear(point, graph.position(id)) {
            links.push(id);
            if links.len() == limit {
                break;
            }
        }
    }
    trace!(
        "linked {} to {} of {} candidates",
        point,
        links.len(),
        ranked.len()
    );
    links
}
