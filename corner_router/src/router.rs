// The router: owns the graph, the caches and the follower, and runs one tick
// per frame.
//
// `CornerRouter` is constructed with everything it talks to: a
// `CollisionQuery`, two `PositionProvider`s (origin and target), a
// `ProxySink` and a shared `EffectsContext`. Nothing is looked up at runtime.
//
// Per tick:
//
// 1. Resolve origin and target. A missing origin skips the tick. A missing
//    target keeps the published route (logged once per outage).
// 2. If the update timer elapsed and the endpoints moved past their
//    thresholds (or the forced interval elapsed, or a full resolve is
//    pending), run a full resolve:
//    clear the query cache, rebuild the graph if needed, then
//    direct line -> cached route -> links + greedy A* + smoothing.
// 3. Advance the follower on the published route and forward its output to
//    the sink.
//
// The published route is swapped in with a single assignment after the
// resolve completes, so `path()` never exposes a partial result.
//
// See also: `resolve_route()` below for the pipeline on its own (usable with
// a hand-built graph), `follower.rs` for the proxy motion, `event.rs` for
// what a tick reports.

use crate::builder::{BuildReport, GraphBuilder};
use crate::collision::{CollisionQuery, ExclusionSet, Probe, QueryCache};
use crate::config::{ConfigError, RouterConfig};
use crate::error::{FailureReason, RouteFailure};
use crate::event::{NavigationDebugInfo, RouterEvent};
use crate::follower::{FollowerOutput, FollowerState, ProxyFollower};
use crate::graph::WaypointGraph;
use crate::links::resolve_links;
use crate::path::RoutePath;
use crate::reuse::PathCache;
use crate::search::{SearchQuery, greedy_astar};
use crate::smoothing::smooth_path;
use crate::types::{ColliderId, Vec3};
use log::{debug, trace, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Proxy moves smaller than this do not produce `ProxyMoved` (m).
const PROXY_MOVED_EPSILON: f32 = 1e-4;

// ---------------------------------------------------------------------------
// Collaborator interfaces
// ---------------------------------------------------------------------------

/// Supplies a world position each tick, or `None` when unavailable.
pub trait PositionProvider {
    fn position(&self) -> Option<Vec3>;
}

impl<F: Fn() -> Option<Vec3>> PositionProvider for F {
    fn position(&self) -> Option<Vec3> {
        self()
    }
}

/// The audio-side stand-in the router drives.
pub trait ProxySink {
    fn set_position(&mut self, position: Vec3);
    fn set_external_volume_offset_db(&mut self, offset_db: f32);
    fn set_external_occlusion_hold(&mut self, seconds: f32);
    fn clear_external_occlusion_hold(&mut self);
    fn set_external_navigation_debug_data(&mut self, active: bool, info: &NavigationDebugInfo);
    fn clear_external_navigation_debug_data(&mut self);
    fn set_inner_radius_override(&mut self, radius: Option<f32>);
}

/// Engine-wide switch for reflected-audio effects, shared by every router.
#[derive(Clone, Debug)]
pub struct EffectsContext {
    enabled: Arc<AtomicBool>,
}

impl Default for EffectsContext {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EffectsContext {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Route resolution
// ---------------------------------------------------------------------------

/// A resolved route and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOutcome {
    pub path: RoutePath,
    pub reused: bool,
}

/// Resolve one origin/target pair against an existing graph: direct line,
/// then the cached route, then a full graph search.
pub fn resolve_route<Q: CollisionQuery + ?Sized>(
    graph: &WaypointGraph,
    origin: Vec3,
    target: Vec3,
    config: &RouterConfig,
    path_cache: &PathCache,
    probe: &mut Probe<'_, Q>,
) -> Result<RouteOutcome, RouteFailure> {
    if probe.segment_clear(origin, target) {
        return Ok(RouteOutcome {
            path: RoutePath::straight(origin, target),
            reused: false,
        });
    }

    if config.reuse.reuse_enabled {
        match path_cache.try_reuse(origin, target, &config.reuse, probe) {
            Ok(points) => {
                trace!("reused cached route with {} points", points.len());
                return Ok(RouteOutcome {
                    path: RoutePath::new(points, false),
                    reused: true,
                });
            }
            Err(rejection) => trace!("cached route rejected: {rejection}"),
        }
    }

    let fail = |reason| RouteFailure::NoDirectOrGraphPath {
        origin,
        target,
        reason,
    };
    if graph.is_empty() {
        return Err(fail(FailureReason::EmptyGraph));
    }

    let search = &config.search;
    let limit = search.dynamic_connection_limit as usize;
    let multiplier = search.dynamic_candidate_multiplier as usize;
    let origin_links = resolve_links(graph, origin, target, limit, multiplier, probe);
    if origin_links.is_empty() {
        return Err(fail(FailureReason::OriginUnlinked));
    }
    let target_links = resolve_links(graph, target, origin, limit, multiplier, probe);
    if target_links.is_empty() {
        return Err(fail(FailureReason::TargetUnlinked));
    }

    let query = SearchQuery {
        origin,
        target,
        origin_links: &origin_links,
        target_links: &target_links,
    };
    let result = greedy_astar(graph, &query, search)
        .ok_or_else(|| fail(FailureReason::SearchExhausted))?;

    let points = if config.update.smoothing_enabled {
        smooth_path(&result.points, |a, b| probe.segment_clear(a, b))
    } else {
        result.points
    };
    Ok(RouteOutcome {
        path: RoutePath::new(points, false),
        reused: false,
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// What one tick produced.
#[derive(Clone, Debug, Default)]
pub struct TickResult {
    pub events: Vec<RouterEvent>,
    /// Set when a full resolve failed or the target was unavailable.
    pub failure: Option<RouteFailure>,
}

pub struct CornerRouter<Q, O, T, S> {
    config: RouterConfig,
    query: Q,
    origin: O,
    target: T,
    sink: S,
    effects: EffectsContext,

    own_colliders: ExclusionSet,
    listener_collider: Option<ColliderId>,

    graph: WaypointGraph,
    builder: GraphBuilder,
    last_report: Option<BuildReport>,
    query_cache: QueryCache,
    path_cache: PathCache,

    path: Option<RoutePath>,
    path_reused: bool,
    follower: ProxyFollower,

    since_update: f32,
    since_full_resolve: f32,
    last_solved: Option<(Vec3, Vec3)>,
    pending_full_resolve: bool,
    target_missing: bool,
    last_proxy_position: Option<Vec3>,
}

impl<Q, O, T, S> CornerRouter<Q, O, T, S>
where
    Q: CollisionQuery,
    O: PositionProvider,
    T: PositionProvider,
    S: ProxySink,
{
    pub fn new(
        config: RouterConfig,
        query: Q,
        origin: O,
        target: T,
        sink: S,
        effects: EffectsContext,
    ) -> Result<Self, ConfigError> {
        let mut config = config;
        config.reapply_profile();
        config.validate()?;
        let start = origin.position().unwrap_or(Vec3::ZERO);
        Ok(Self {
            config,
            query,
            origin,
            target,
            sink,
            effects,
            own_colliders: ExclusionSet::new(),
            listener_collider: None,
            graph: WaypointGraph::new(start),
            builder: GraphBuilder::new(),
            last_report: None,
            query_cache: QueryCache::new(),
            path_cache: PathCache::new(),
            path: None,
            path_reused: false,
            follower: ProxyFollower::new(start),
            since_update: 0.0,
            since_full_resolve: 0.0,
            last_solved: None,
            pending_full_resolve: true,
            target_missing: false,
            last_proxy_position: None,
        })
    }

    // -- accessors ---------------------------------------------------------

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&RoutePath> {
        self.path.as_ref()
    }

    pub fn graph(&self) -> &WaypointGraph {
        &self.graph
    }

    pub fn last_build_report(&self) -> Option<&BuildReport> {
        self.last_report.as_ref()
    }

    pub fn follower_state(&self) -> FollowerState {
        self.follower.state()
    }

    pub fn proxy_position(&self) -> Vec3 {
        self.follower.proxy().position
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Mutable access to the collision world. Call `invalidate_graph()`
    /// afterwards if static geometry changed.
    pub fn query_mut(&mut self) -> &mut Q {
        &mut self.query
    }

    pub fn effects(&self) -> &EffectsContext {
        &self.effects
    }

    // -- configuration -----------------------------------------------------

    /// Replace the configuration. Graph-affecting changes force a rebuild;
    /// any accepted change drops the cached route and forces a full resolve.
    pub fn set_config(&mut self, mut config: RouterConfig) -> Result<(), ConfigError> {
        config.reapply_profile();
        if let Err(err) = config.validate() {
            warn!("rejected router config: {err}");
            return Err(err);
        }
        if config.graph != self.config.graph {
            self.builder.invalidate();
        }
        self.config = config;
        self.path_cache.clear();
        self.pending_full_resolve = true;
        Ok(())
    }

    /// Colliders that belong to the router's own source and must never
    /// block its routes.
    pub fn set_own_colliders(&mut self, colliders: ExclusionSet) {
        self.own_colliders = colliders;
        self.pending_full_resolve = true;
    }

    /// The listener's collider, excluded so the listener does not occlude
    /// itself.
    pub fn set_listener_collider(&mut self, collider: Option<ColliderId>) {
        if self.listener_collider != collider {
            self.listener_collider = collider;
            self.pending_full_resolve = true;
        }
    }

    /// Rebuild the graph and re-resolve on the next tick.
    pub fn invalidate_graph(&mut self) {
        self.builder.invalidate();
        self.pending_full_resolve = true;
    }

    // -- tick --------------------------------------------------------------

    pub fn tick(&mut self, delta: f32) -> TickResult {
        let mut result = TickResult::default();
        let Some(origin) = self.origin.position() else {
            trace!("origin unavailable; skipping tick");
            return result;
        };

        if !self.effects.is_enabled() {
            self.disable(origin, &mut result);
            return result;
        }

        self.since_update += delta;
        self.since_full_resolve += delta;

        match self.target.position() {
            None => {
                if !self.target_missing {
                    debug!("target unavailable; keeping the last route");
                    self.target_missing = true;
                }
                result.failure = Some(RouteFailure::NoTargetResolved);
            }
            Some(target) => {
                self.target_missing = false;
                if self.full_resolve_due(origin, target) {
                    self.full_resolve(origin, target, &mut result);
                }
            }
        }

        let output = self.follower.tick(
            delta,
            origin,
            self.path.as_ref(),
            &self.config.proxy,
            &self.config.modulation,
        );
        self.publish(output, &mut result);
        result
    }

    fn full_resolve_due(&mut self, origin: Vec3, target: Vec3) -> bool {
        let update = &self.config.update;
        if !self.pending_full_resolve && self.since_update < update.update_interval {
            return false;
        }
        self.since_update = 0.0;

        let moved = match self.last_solved {
            None => true,
            Some((o, t)) => {
                o.distance(origin) > update.origin_move_threshold
                    || t.distance(target) > update.target_move_threshold
            }
        };
        self.pending_full_resolve
            || moved
            || self.since_full_resolve >= update.forced_recompute_interval
    }

    fn exclusions(&self) -> ExclusionSet {
        self.own_colliders.with(self.listener_collider)
    }

    fn ensure_graph(&mut self, anchor: Vec3, exclusions: &ExclusionSet, result: &mut TickResult) {
        if !self
            .builder
            .needs_rebuild(&self.graph, anchor, &self.config.graph)
        {
            return;
        }
        self.query_cache.clear();
        let mut probe = Probe::new(&self.query, exclusions, &mut self.query_cache);
        let (graph, report) = self.builder.build(anchor, &self.config.graph, &mut probe);
        self.graph = graph;
        self.query_cache.clear();
        self.path_cache.clear();
        self.last_report = Some(report);
        result.events.push(RouterEvent::GraphRebuilt {
            node_count: report.node_count,
            edge_count: report.edge_count,
            capped: report.capped,
        });
    }

    fn full_resolve(&mut self, origin: Vec3, target: Vec3, result: &mut TickResult) {
        self.pending_full_resolve = false;
        self.since_full_resolve = 0.0;
        self.last_solved = Some((origin, target));
        self.query_cache.clear();

        let exclusions = self.exclusions();
        self.ensure_graph(origin, &exclusions, result);

        let mut probe = Probe::new(&self.query, &exclusions, &mut self.query_cache);
        let outcome = resolve_route(
            &self.graph,
            origin,
            target,
            &self.config,
            &self.path_cache,
            &mut probe,
        );

        match outcome {
            Ok(RouteOutcome { path, reused }) => {
                if reused {
                    debug!("reused cached route ({:.2} m)", path.length);
                } else if !path.direct {
                    self.path_cache.store(&path.points);
                }
                let changed = self
                    .path
                    .as_ref()
                    .is_none_or(|old| old.points != path.points || old.direct != path.direct);
                if changed {
                    result.events.push(RouterEvent::PathUpdated {
                        points: path.points.clone(),
                        direct: path.direct,
                    });
                }
                self.path_reused = reused;
                self.path = Some(path);
            }
            Err(failure) => {
                debug!("route failed: {failure}");
                self.path = None;
                self.path_reused = false;
                result.events.push(RouterEvent::PathFailed { origin, target });
                result.failure = Some(failure);
            }
        }
    }

    fn publish(&mut self, output: FollowerOutput, result: &mut TickResult) {
        self.sink.set_position(output.position);
        self.sink.set_external_volume_offset_db(output.volume_offset_db);
        self.sink.set_inner_radius_override(output.inner_radius_override);
        match output.occlusion_hold {
            Some(seconds) => self.sink.set_external_occlusion_hold(seconds),
            None => self.sink.clear_external_occlusion_hold(),
        }
        if self.config.modulation.debug_info_enabled {
            let info = self.debug_info();
            self.sink.set_external_navigation_debug_data(true, &info);
        } else {
            self.sink.clear_external_navigation_debug_data();
        }

        let moved = self
            .last_proxy_position
            .is_none_or(|last| last.distance(output.position) > PROXY_MOVED_EPSILON);
        if moved {
            self.last_proxy_position = Some(output.position);
            result.events.push(RouterEvent::ProxyMoved {
                position: output.position,
            });
        }
    }

    /// Effects switched off: park the proxy and withdraw everything the sink
    /// was given. A full resolve runs once effects come back.
    fn disable(&mut self, origin: Vec3, result: &mut TickResult) {
        let output = self.follower.park(origin);
        self.pending_full_resolve = true;
        self.sink.set_position(output.position);
        self.sink.set_external_volume_offset_db(0.0);
        self.sink.set_inner_radius_override(None);
        self.sink.clear_external_occlusion_hold();
        self.sink.clear_external_navigation_debug_data();
        let moved = self
            .last_proxy_position
            .is_none_or(|last| last.distance(origin) > PROXY_MOVED_EPSILON);
        if moved {
            self.last_proxy_position = Some(origin);
            result.events.push(RouterEvent::ProxyMoved { position: origin });
        }
    }

    /// Snapshot of the current navigation state.
    pub fn debug_info(&self) -> NavigationDebugInfo {
        let proxy = self.follower.proxy();
        NavigationDebugInfo {
            state: Some(self.follower.state()),
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            graph_capped: self.last_report.is_some_and(|r| r.capped),
            path: self
                .path
                .as_ref()
                .map(|p| p.points.clone())
                .unwrap_or_default(),
            direct: self.path.as_ref().is_some_and(|p| p.direct),
            reused: self.path_reused,
            distance_from_end: proxy.distance_from_end,
            proxy_position: proxy.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GraphStrategy, NavigationProfile};
    use crate::scene::BoxScene;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct RecordingSink {
        position: Option<Vec3>,
        volume_db: f32,
        hold: Option<f32>,
        inner_radius: Option<f32>,
        debug: Option<NavigationDebugInfo>,
    }

    impl ProxySink for RecordingSink {
        fn set_position(&mut self, position: Vec3) {
            self.position = Some(position);
        }
        fn set_external_volume_offset_db(&mut self, offset_db: f32) {
            self.volume_db = offset_db;
        }
        fn set_external_occlusion_hold(&mut self, seconds: f32) {
            self.hold = Some(seconds);
        }
        fn clear_external_occlusion_hold(&mut self) {
            self.hold = None;
        }
        fn set_external_navigation_debug_data(&mut self, _active: bool, info: &NavigationDebugInfo) {
            self.debug = Some(info.clone());
        }
        fn clear_external_navigation_debug_data(&mut self) {
            self.debug = None;
        }
        fn set_inner_radius_override(&mut self, radius: Option<f32>) {
            self.inner_radius = radius;
        }
    }

    type Shared = Rc<Cell<Option<Vec3>>>;

    fn provider(cell: &Shared) -> impl Fn() -> Option<Vec3> + use<> {
        let cell = Rc::clone(cell);
        move || cell.get()
    }

    /// Wall across x = 5 with a gap between z = 2 and z = 4.
    fn gapped_wall() -> BoxScene {
        let mut scene = BoxScene::new(0.25);
        scene.add_box(Vec3::new(4.9, -1000.0, -1000.0), Vec3::new(5.1, 1000.0, 2.0));
        scene.add_box(Vec3::new(4.9, -1000.0, 4.0), Vec3::new(5.1, 1000.0, 1000.0));
        scene
    }

    fn router(
        scene: BoxScene,
        config: RouterConfig,
        origin: &Shared,
        target: &Shared,
    ) -> CornerRouter<BoxScene, impl Fn() -> Option<Vec3>, impl Fn() -> Option<Vec3>, RecordingSink> {
        CornerRouter::new(
            config,
            scene,
            provider(origin),
            provider(target),
            RecordingSink::default(),
            EffectsContext::default(),
        )
        .unwrap()
    }

    /// Reachable scan on a unit grid, confined to a slab around the wall.
    fn hallway_config() -> RouterConfig {
        let mut config = RouterConfig::default();
        config.graph.strategy = GraphStrategy::ReachableScan;
        config.graph.scan_cell_size = 1.0;
        config.graph.scan_extent_limit = Some([12.0, 1.0, 4.0]);
        config.graph.scan_max_cells = 2000;
        config
    }

    fn hand_graph() -> WaypointGraph {
        let mut g = WaypointGraph::new(Vec3::ZERO);
        g.add_node(Vec3::new(5.0, 0.0, 3.0));
        g
    }

    #[test]
    fn direct_line_short_circuits() {
        let scene = BoxScene::new(0.25);
        let excl = ExclusionSet::new();
        let mut cache = QueryCache::new();
        let mut probe = Probe::new(&scene, &excl, &mut cache);
        let outcome = resolve_route(
            &WaypointGraph::default(),
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            &RouterConfig::default(),
            &PathCache::new(),
            &mut probe,
        )
        .unwrap();
        assert!(outcome.path.direct);
        assert_eq!(outcome.path.points, vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)]);
    }

    #[test]
    fn blocked_line_routes_through_the_gap() {
        let scene = gapped_wall();
        let excl = ExclusionSet::new();
        let mut cache = QueryCache::new();
        let mut probe = Probe::new(&scene, &excl, &mut cache);
        let outcome = resolve_route(
            &hand_graph(),
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            &RouterConfig::default(),
            &PathCache::new(),
            &mut probe,
        )
        .unwrap();
        assert!(!outcome.path.direct);
        assert!(!outcome.reused);
        assert_eq!(outcome.path.points[1], Vec3::new(5.0, 0.0, 3.0));
    }

    #[test]
    fn failure_reasons() {
        let scene = gapped_wall();
        let excl = ExclusionSet::new();
        let mut cache = QueryCache::new();
        let mut probe = Probe::new(&scene, &excl, &mut cache);
        let config = RouterConfig::default();
        let empty = resolve_route(
            &WaypointGraph::default(),
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            &config,
            &PathCache::new(),
            &mut probe,
        );
        assert!(matches!(
            empty,
            Err(RouteFailure::NoDirectOrGraphPath {
                reason: FailureReason::EmptyGraph,
                ..
            })
        ));

        // A node only the origin can see.
        let mut one_sided = WaypointGraph::default();
        one_sided.add_node(Vec3::new(2.0, 0.0, 0.0));
        let unlinked = resolve_route(
            &one_sided,
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            &config,
            &PathCache::new(),
            &mut probe,
        );
        assert!(matches!(
            unlinked,
            Err(RouteFailure::NoDirectOrGraphPath {
                reason: FailureReason::TargetUnlinked,
                ..
            })
        ));
    }

    #[test]
    fn first_tick_builds_and_resolves() {
        let origin: Shared = Rc::new(Cell::new(Some(Vec3::ZERO)));
        let target: Shared = Rc::new(Cell::new(Some(Vec3::new(10.0, 0.0, 0.0))));
        let mut r = router(BoxScene::new(0.25), RouterConfig::default(), &origin, &target);
        let result = r.tick(0.016);
        assert!(matches!(result.events[0], RouterEvent::GraphRebuilt { .. }));
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, RouterEvent::PathUpdated { direct: true, .. })));
        assert_eq!(r.follower_state(), FollowerState::Direct);
        assert_eq!(r.sink().position, Some(Vec3::ZERO));
    }

    #[test]
    fn small_moves_skip_the_full_resolve() {
        let origin: Shared = Rc::new(Cell::new(Some(Vec3::ZERO)));
        let target: Shared = Rc::new(Cell::new(Some(Vec3::new(10.0, 0.0, 0.0))));
        let mut r = router(BoxScene::new(0.25), RouterConfig::default(), &origin, &target);
        r.tick(0.016);

        target.set(Some(Vec3::new(10.05, 0.0, 0.0)));
        for _ in 0..10 {
            let result = r.tick(0.016);
            assert!(result.events.iter().all(|e| !matches!(e, RouterEvent::PathUpdated { .. })));
        }
        assert_eq!(r.path().unwrap().target(), Some(Vec3::new(10.0, 0.0, 0.0)));

        // Past the threshold, the next update interval re-resolves.
        target.set(Some(Vec3::new(11.0, 0.0, 0.0)));
        let updated = (0..10).any(|_| {
            r.tick(0.016)
                .events
                .iter()
                .any(|e| matches!(e, RouterEvent::PathUpdated { .. }))
        });
        assert!(updated);
        assert_eq!(r.path().unwrap().target(), Some(Vec3::new(11.0, 0.0, 0.0)));
    }

    #[test]
    fn forced_interval_resolves_without_movement() {
        let origin: Shared = Rc::new(Cell::new(Some(Vec3::ZERO)));
        let target: Shared = Rc::new(Cell::new(Some(Vec3::new(10.0, 0.0, 0.0))));
        let mut r = router(BoxScene::new(0.25), RouterConfig::default(), &origin, &target);
        r.tick(0.016);
        // Block the line without moving anything; only the forced resolve notices.
        r.query_mut()
            .add_box(Vec3::new(4.9, -1.0, -1.0), Vec3::new(5.1, 1.0, 1.0));
        let mut saw_reflected = false;
        for _ in 0..80 {
            r.tick(0.016);
            if r.path().is_some_and(|p| !p.direct) {
                saw_reflected = true;
                break;
            }
        }
        assert!(saw_reflected);
    }

    #[test]
    fn missing_target_keeps_route_and_reports_once() {
        let origin: Shared = Rc::new(Cell::new(Some(Vec3::ZERO)));
        let target: Shared = Rc::new(Cell::new(Some(Vec3::new(10.0, 0.0, 0.0))));
        let mut r = router(BoxScene::new(0.25), RouterConfig::default(), &origin, &target);
        r.tick(0.016);
        target.set(None);
        for _ in 0..20 {
            let result = r.tick(0.05);
            assert_eq!(result.failure, Some(RouteFailure::NoTargetResolved));
            assert!(result
                .events
                .iter()
                .all(|e| !matches!(e, RouterEvent::PathFailed { .. } | RouterEvent::PathUpdated { .. })));
        }
        assert!(r.path().is_some());
    }

    #[test]
    fn effects_toggle_parks_and_clears() {
        let origin: Shared = Rc::new(Cell::new(Some(Vec3::ZERO)));
        let target: Shared = Rc::new(Cell::new(Some(Vec3::new(10.0, 0.0, 0.0))));
        let mut config = hallway_config();
        config.modulation.debug_info_enabled = true;
        config.proxy.audio_proxy_lerp_speed = 0.0;
        let mut r = router(gapped_wall(), config, &origin, &target);
        r.tick(0.016);
        assert_eq!(r.follower_state(), FollowerState::Reflected);
        assert!(r.sink().hold.is_some());
        assert!(r.sink().debug.is_some());

        let effects = r.effects().clone();
        effects.set_enabled(false);
        r.tick(0.016);
        assert_eq!(r.follower_state(), FollowerState::Idle);
        assert_eq!(r.sink().position, Some(Vec3::ZERO));
        assert_eq!(r.sink().hold, None);
        assert_eq!(r.sink().debug, None);
        assert_eq!(r.sink().inner_radius, None);

        effects.set_enabled(true);
        r.tick(0.016);
        assert_eq!(r.follower_state(), FollowerState::Reflected);
    }

    #[test]
    fn set_config_validates_and_invalidates() {
        let origin: Shared = Rc::new(Cell::new(Some(Vec3::ZERO)));
        let target: Shared = Rc::new(Cell::new(Some(Vec3::new(10.0, 0.0, 0.0))));
        let mut r = router(BoxScene::new(0.25), RouterConfig::default(), &origin, &target);
        r.tick(0.016);

        let mut bad = RouterConfig::default();
        bad.graph.scan_cell_size = -1.0;
        assert!(r.set_config(bad).is_err());
        assert_eq!(r.config(), &RouterConfig::default());

        let mut seeded = RouterConfig::default();
        seeded.graph.sample_seed = 4242;
        r.set_config(seeded).unwrap();
        let result = r.tick(0.016);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, RouterEvent::GraphRebuilt { .. })));
    }

    #[test]
    fn set_config_applies_the_recorded_profile() {
        let origin: Shared = Rc::new(Cell::new(Some(Vec3::ZERO)));
        let target: Shared = Rc::new(Cell::new(Some(Vec3::new(10.0, 0.0, 0.0))));
        let mut r = router(BoxScene::new(0.25), RouterConfig::default(), &origin, &target);

        let mut config = RouterConfig::default();
        config.profile = NavigationProfile::HallWays;
        r.set_config(config).unwrap();
        assert_eq!(r.config(), &RouterConfig::with_profile(NavigationProfile::HallWays));
        assert_eq!(r.config().graph.strategy, GraphStrategy::ReachableScan);
    }

    #[test]
    fn listener_collider_is_excluded() {
        let mut scene = BoxScene::new(0.1);
        let listener_box = scene.add_box(Vec3::new(9.5, -0.5, -0.5), Vec3::new(10.5, 0.5, 0.5));
        let origin: Shared = Rc::new(Cell::new(Some(Vec3::ZERO)));
        let target: Shared = Rc::new(Cell::new(Some(Vec3::new(10.0, 0.0, 0.0))));
        let mut r = router(scene, RouterConfig::default(), &origin, &target);
        r.set_listener_collider(Some(listener_box));
        r.tick(0.016);
        assert!(r.path().unwrap().direct);
    }
}
