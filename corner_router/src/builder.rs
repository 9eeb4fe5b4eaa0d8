// Graph construction: random-sample graphs and reachable flood scans.
//
// `GraphBuilder` owns the cached sample offsets and remembers which
// parameters the current graph was built with, so it can answer
// `needs_rebuild()` cheaply every recompute. A build always produces a fresh
// `WaypointGraph` value; the caller swaps it in whole, so the search never
// sees a half-built graph.
//
// Two strategies (`GraphStrategy`):
//
// - **Random samples.** Candidate offsets from `SampleSet`, scaled by
//   `navigation_radius` around the anchor. Clear candidates become nodes.
//   Each node then tries its nearest neighbors (squared distance, at most
//   `graph_neighbor_limit`, within `max_connection_distance`) and keeps the
//   edges whose segment and interior checkpoints are clear.
// - **Reachable scan.** Breadth-first flood over a regular grid anchored at
//   the anchor, one node per reachable cell. A neighbor cell becomes a node
//   when its center is clear and the segment from the current cell is clear.
//   Already-discovered neighbors are linked as well, so the result is a
//   lattice rather than a tree. Stops adding nodes at `scan_max_cells`.
//
// All collision traffic goes through a `Probe`, whose cache the caller clears
// before the build.
//
// See also: `graph.rs` for the result type, `sampling.rs` for candidate
// offsets, `router.rs` for the rebuild triggers in context.
//
// **Critical constraint: determinism.** Candidate order, neighbor order and
// BFS order are all fixed, so the same scene and parameters always produce
// the same node ids.

use crate::collision::{CollisionQuery, Probe};
use crate::config::{GraphParams, GraphStrategy, ScanNeighborhood};
use crate::graph::WaypointGraph;
use crate::sampling::SampleSet;
use crate::types::{NodeId, Vec3};
use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Summary of one graph build.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub strategy: GraphStrategy,
    pub node_count: usize,
    pub edge_count: usize,
    /// The scan stopped at `scan_max_cells` with cells left to visit.
    pub capped: bool,
}

#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    samples: Option<SampleSet>,
    built_with: Option<GraphParams>,
    dirty: bool,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next `needs_rebuild()` to return true.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn needs_rebuild(&self, graph: &WaypointGraph, anchor: Vec3, params: &GraphParams) -> bool {
        self.dirty
            || graph.is_empty()
            || self.built_with.as_ref() != Some(params)
            || anchor.distance(graph.anchor) > params.graph_recenter_distance
    }

    /// Build a new graph around `anchor`.
    pub fn build<Q: CollisionQuery + ?Sized>(
        &mut self,
        anchor: Vec3,
        params: &GraphParams,
        probe: &mut Probe<'_, Q>,
    ) -> (WaypointGraph, BuildReport) {
        let (graph, capped) = match params.strategy {
            GraphStrategy::RandomSamples => (self.build_random(anchor, params, probe), false),
            GraphStrategy::ReachableScan => build_scan(anchor, params, probe),
        };

        self.built_with = Some(params.clone());
        self.dirty = false;

        let report = BuildReport {
            strategy: params.strategy,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            capped,
        };
        debug!(
            "built {:?} graph at {}: {} nodes, {} edges{}",
            report.strategy,
            anchor,
            report.node_count,
            report.edge_count,
            if capped { " (capped)" } else { "" }
        );
        (graph, report)
    }

    fn build_random<Q: CollisionQuery + ?Sized>(
        &mut self,
        anchor: Vec3,
        params: &GraphParams,
        probe: &mut Probe<'_, Q>,
    ) -> WaypointGraph {
        let samples = self
            .samples
            .get_or_insert_with(|| SampleSet::generate(params.sample_point_count, params.sample_seed));
        samples.refresh(params.sample_point_count, params.sample_seed);

        let mut graph = WaypointGraph::new(anchor);
        for point in samples.world_points(anchor, params.navigation_radius) {
            if probe.point_clear(point) {
                graph.add_node(point);
            }
        }

        let limit = params.graph_neighbor_limit as usize;
        let max_d2 = params.max_connection_distance * params.max_connection_distance;
        let mut candidates: Vec<(f32, NodeId)> = Vec::new();

        for a in graph.node_ids() {
            let pa = graph.position(a);
            candidates.clear();
            candidates.extend(graph.node_ids().filter(|&b| b != a).filter_map(|b| {
                let d2 = pa.distance_squared(graph.position(b));
                (d2 <= max_d2).then_some((d2, b))
            }));
            candidates.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

            for &(_, b) in candidates.iter().take(limit) {
                if !graph.can_link(a, b, limit) {
                    continue;
                }
                if probe.edge_clear(pa, graph.position(b), params.edge_clearance_checks) {
                    graph.try_add_edge(a, b, limit);
                }
            }
        }
        graph
    }
}

/// Integer cell offsets of the scan stencil, in a fixed order.
fn stencil(neighborhood: ScanNeighborhood) -> Vec<[i32; 3]> {
    let max_nonzero = match neighborhood {
        ScanNeighborhood::Six => 1,
        ScanNeighborhood::Eighteen => 2,
        ScanNeighborhood::TwentySix => 3,
    };
    let mut out = Vec::with_capacity(26);
    for dy in -1..=1 {
        for dz in -1..=1 {
            for dx in -1..=1 {
                let nonzero = [dx, dy, dz].iter().filter(|&&d| d != 0).count();
                if nonzero > 0 && nonzero <= max_nonzero {
                    out.push([dx, dy, dz]);
                }
            }
        }
    }
    out
}

fn build_scan<Q: CollisionQuery + ?Sized>(
    anchor: Vec3,
    params: &GraphParams,
    probe: &mut Probe<'_, Q>,
) -> (WaypointGraph, bool) {
    let mut graph = WaypointGraph::new(anchor);
    if !probe.point_clear(anchor) {
        return (graph, false);
    }

    let size = params.scan_cell_size;
    let cap = params.scan_max_cells as usize;
    let limit = params.graph_neighbor_limit as usize;
    let offsets = stencil(params.scan_neighborhood);
    let center = |c: [i32; 3]| anchor + Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32) * size;
    let in_extent = |p: Vec3| match params.scan_extent_limit {
        Some([ex, ey, ez]) => {
            let d = p - anchor;
            d.x.abs() <= ex && d.y.abs() <= ey && d.z.abs() <= ez
        }
        None => true,
    };

    let mut cells: FxHashMap<[i32; 3], NodeId> = FxHashMap::default();
    let mut queue = VecDeque::new();
    cells.insert([0, 0, 0], graph.add_node(anchor));
    queue.push_back([0, 0, 0]);
    let mut capped = false;

    while let Some(cell) = queue.pop_front() {
        let a = cells[&cell];
        let pa = center(cell);
        for off in &offsets {
            let next = [cell[0] + off[0], cell[1] + off[1], cell[2] + off[2]];
            let pn = center(next);
            if !in_extent(pn) {
                continue;
            }
            if let Some(&b) = cells.get(&next) {
                if graph.can_link(a, b, limit) && probe.segment_clear(pa, pn) {
                    graph.try_add_edge(a, b, limit);
                }
                continue;
            }
            if graph.degree(a) >= limit {
                continue;
            }
            if graph.node_count() >= cap {
                capped = true;
                continue;
            }
            if !probe.point_clear(pn) || !probe.segment_clear(pa, pn) {
                continue;
            }
            let b = graph.add_node(pn);
            graph.try_add_edge(a, b, limit);
            cells.insert(next, b);
            queue.push_back(next);
        }
    }

    (graph, capped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{ExclusionSet, QueryCache};
    use crate::scene::BoxScene;

    fn build(scene: &BoxScene, anchor: Vec3, params: &GraphParams) -> (WaypointGraph, BuildReport) {
        let exclusions = ExclusionSet::new();
        let mut cache = QueryCache::new();
        let mut probe = Probe::new(scene, &exclusions, &mut cache);
        GraphBuilder::new().build(anchor, params, &mut probe)
    }

    fn assert_symmetric_and_bounded(graph: &WaypointGraph, limit: usize) {
        for a in graph.node_ids() {
            assert!(graph.degree(a) <= limit, "node {a:?} exceeds degree limit");
            for b in graph.neighbors(a) {
                assert!(graph.has_edge(b, a), "edge {a:?}-{b:?} is one-sided");
            }
        }
    }

    fn walled_scene() -> BoxScene {
        let mut scene = BoxScene::new(0.2);
        scene.add_box(Vec3::new(2.0, -20.0, -20.0), Vec3::new(2.5, 20.0, 6.0));
        scene
    }

    #[test]
    fn random_build_is_deterministic() {
        let scene = walled_scene();
        let params = GraphParams::default();
        let (a, _) = build(&scene, Vec3::ZERO, &params);
        let (b, _) = build(&scene, Vec3::ZERO, &params);
        assert_eq!(a.positions(), b.positions());
        for id in a.node_ids() {
            let na: Vec<_> = a.neighbors(id).collect();
            let nb: Vec<_> = b.neighbors(id).collect();
            assert_eq!(na, nb);
        }
    }

    #[test]
    fn random_build_respects_symmetry_degree_and_walls() {
        let scene = walled_scene();
        let params = GraphParams {
            graph_neighbor_limit: 5,
            ..GraphParams::default()
        };
        let (graph, report) = build(&scene, Vec3::ZERO, &params);
        assert!(report.node_count > 0);
        assert!(!report.capped);
        assert_eq!(report.edge_count, graph.edge_count());
        assert_symmetric_and_bounded(&graph, 5);

        let none = ExclusionSet::new();
        for a in graph.node_ids() {
            assert!(scene.is_point_clear(graph.position(a), &none));
            for b in graph.neighbors(a) {
                let (pa, pb) = (graph.position(a), graph.position(b));
                assert!(pa.distance(pb) <= params.max_connection_distance + 1e-4);
                assert!(scene.first_blocking_hit(pa, pb, &none).is_none());
            }
        }
    }

    #[test]
    fn scan_stops_at_cell_cap() {
        let scene = BoxScene::new(0.1);
        let params = GraphParams {
            strategy: GraphStrategy::ReachableScan,
            scan_max_cells: 10,
            ..GraphParams::default()
        };
        let (graph, report) = build(&scene, Vec3::ZERO, &params);
        assert_eq!(graph.node_count(), 10);
        assert_eq!(report.node_count, 10);
        assert!(report.capped);
    }

    #[test]
    fn scan_fills_extent_as_a_lattice() {
        let scene = BoxScene::new(0.1);
        let params = GraphParams {
            strategy: GraphStrategy::ReachableScan,
            scan_cell_size: 1.0,
            scan_extent_limit: Some([1.0, 1.0, 1.0]),
            ..GraphParams::default()
        };
        let (graph, report) = build(&scene, Vec3::new(5.0, 5.0, 5.0), &params);
        // 3x3x3 cells, 6-connected: 3 axes * 9 lines * 2 edges.
        assert_eq!(report.node_count, 27);
        assert_eq!(report.edge_count, 54);
        assert!(!report.capped);
        assert_symmetric_and_bounded(&graph, 8);
    }

    #[test]
    fn wider_stencil_adds_diagonals() {
        let scene = BoxScene::new(0.1);
        let mut params = GraphParams {
            strategy: GraphStrategy::ReachableScan,
            scan_cell_size: 1.0,
            scan_extent_limit: Some([1.0, 1.0, 1.0]),
            graph_neighbor_limit: 26,
            ..GraphParams::default()
        };
        let (six, _) = build(&scene, Vec3::ZERO, &params);
        params.scan_neighborhood = ScanNeighborhood::TwentySix;
        let (full, _) = build(&scene, Vec3::ZERO, &params);
        assert_eq!(full.node_count(), 27);
        assert!(full.edge_count() > six.edge_count());
        // The center cell touches every other cell.
        assert_eq!(full.degree(NodeId(0)), 26);
    }

    #[test]
    fn scan_does_not_cross_walls() {
        let mut scene = BoxScene::new(0.1);
        scene.add_box(Vec3::new(1.4, -50.0, -50.0), Vec3::new(1.6, 50.0, 50.0));
        let params = GraphParams {
            strategy: GraphStrategy::ReachableScan,
            scan_cell_size: 1.0,
            scan_extent_limit: Some([4.0, 1.0, 1.0]),
            ..GraphParams::default()
        };
        let (graph, _) = build(&scene, Vec3::ZERO, &params);
        assert!(graph.node_count() > 0);
        assert!(graph.positions().iter().all(|p| p.x < 1.4));
    }

    #[test]
    fn blocked_anchor_yields_empty_scan() {
        let mut scene = BoxScene::new(0.1);
        scene.add_box(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let params = GraphParams {
            strategy: GraphStrategy::ReachableScan,
            ..GraphParams::default()
        };
        let (graph, report) = build(&scene, Vec3::ZERO, &params);
        assert!(graph.is_empty());
        assert_eq!(report.node_count, 0);
    }

    #[test]
    fn rebuild_triggers() {
        let scene = BoxScene::new(0.1);
        let exclusions = ExclusionSet::new();
        let mut cache = QueryCache::new();
        let mut probe = Probe::new(&scene, &exclusions, &mut cache);
        let mut builder = GraphBuilder::new();
        let params = GraphParams::default();

        let empty = WaypointGraph::new(Vec3::ZERO);
        assert!(builder.needs_rebuild(&empty, Vec3::ZERO, &params));

        let (graph, _) = builder.build(Vec3::ZERO, &params, &mut probe);
        assert!(!builder.needs_rebuild(&graph, Vec3::ZERO, &params));
        assert!(!builder.needs_rebuild(&graph, Vec3::new(3.9, 0.0, 0.0), &params));
        assert!(builder.needs_rebuild(&graph, Vec3::new(4.1, 0.0, 0.0), &params));

        let changed = GraphParams {
            sample_seed: 99,
            ..params.clone()
        };
        assert!(builder.needs_rebuild(&graph, Vec3::ZERO, &changed));

        builder.invalidate();
        assert!(builder.needs_rebuild(&graph, Vec3::ZERO, &params));
    }
}
