// Data-driven router configuration.
//
// Every tunable lives in `RouterConfig`, loadable from JSON. Parameters are
// grouped into nested structs the same way each group is consumed: graph
// construction (`GraphParams`), search and dynamic linking (`SearchParams`),
// path reuse (`ReuseParams`), recompute scheduling (`UpdateParams`), proxy
// motion (`ProxyParams`) and the modulation handed to the audio layer
// (`ModulationParams`).
//
// Named navigation profiles (`NavigationProfile::OpenAreas`, `::HallWays`)
// overwrite a documented bundle of graph/search tunables; `Custom` leaves the
// manual values alone. The recorded profile is authoritative: `from_json()`,
// `CornerRouter::new()` and `CornerRouter::set_config()` re-apply it, so a
// loaded `HallWays` config always carries the `HallWays` bundle. `validate()`
// checks ranges and runs at the same three entry points.
//
// Units: meters, seconds, decibels.
//
// See also: `router.rs`, which owns the active config and decides when a
// change invalidates the graph (any difference in `GraphParams`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which graph construction algorithm is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphStrategy {
    /// Seeded random points in a sphere, connected to nearby visible nodes.
    /// Cheap; suited to open areas.
    RandomSamples,
    /// Breadth-first flood over a regular grid from the anchor. Hugs
    /// navigable interior space; suited to corridors.
    ReachableScan,
}

/// Neighbor stencil for the reachable scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanNeighborhood {
    /// Face neighbors only.
    Six,
    /// Faces and edges.
    Eighteen,
    /// Faces, edges and corners.
    TwentySix,
}

/// Metric for search step costs and the heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
}

/// Preset bundles of graph/search tunables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationProfile {
    /// Keep manually configured values.
    Custom,
    /// Random samples over a large radius.
    OpenAreas,
    /// Dense 26-connected reachable scan.
    HallWays,
}

// ---------------------------------------------------------------------------
// Parameter groups
// ---------------------------------------------------------------------------

/// Graph construction. Any change here forces a rebuild.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphParams {
    pub strategy: GraphStrategy,
    /// Radius of the random sample sphere around the anchor (m).
    pub navigation_radius: f32,
    /// Number of random candidate points.
    pub sample_point_count: u32,
    /// Seed for the candidate points. Same seed, same offsets.
    pub sample_seed: u64,
    /// Longest edge considered by the random-sample graph (m).
    pub max_connection_distance: f32,
    /// Maximum adjacency list length per node.
    pub graph_neighbor_limit: u32,
    /// Interior clearance probes per edge (0 disables).
    pub edge_clearance_checks: u32,
    /// Anchor drift that triggers a rebuild (m).
    pub graph_recenter_distance: f32,
    /// Grid spacing of the reachable scan (m).
    pub scan_cell_size: f32,
    pub scan_neighborhood: ScanNeighborhood,
    /// Hard cap on reachable-scan nodes.
    pub scan_max_cells: u32,
    /// Optional per-axis half extent around the anchor (m); cells outside it
    /// are not scanned.
    pub scan_extent_limit: Option<[f32; 3]>,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            strategy: GraphStrategy::RandomSamples,
            navigation_radius: 12.0,
            sample_point_count: 160,
            sample_seed: 1337,
            max_connection_distance: 6.0,
            graph_neighbor_limit: 8,
            edge_clearance_checks: 1,
            graph_recenter_distance: 4.0,
            scan_cell_size: 1.5,
            scan_neighborhood: ScanNeighborhood::Six,
            scan_max_cells: 512,
            scan_extent_limit: None,
        }
    }
}

/// Dynamic linking and greedy A*.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Visible links collected per query endpoint.
    pub dynamic_connection_limit: u32,
    /// Candidates tested per link: `limit * multiplier`.
    pub dynamic_candidate_multiplier: u32,
    /// Heuristic multiplier. Values above 1.0 trade optimality for speed.
    pub heuristic_weight: f32,
    /// Every step costs 1 instead of its length.
    pub use_unit_cost: bool,
    pub distance_metric: DistanceMetric,
    /// Node expansions before the search gives up.
    pub max_search_expansions: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            dynamic_connection_limit: 4,
            dynamic_candidate_multiplier: 4,
            heuristic_weight: 1.5,
            use_unit_cost: false,
            distance_metric: DistanceMetric::Euclidean,
            max_search_expansions: 4096,
        }
    }
}

/// Reuse of the previous solution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReuseParams {
    pub reuse_enabled: bool,
    pub reuse_origin_tolerance: f32,
    pub reuse_target_tolerance: f32,
    /// Reused length may not exceed this multiple of the direct distance.
    pub reuse_max_detour_ratio: f32,
}

impl Default for ReuseParams {
    fn default() -> Self {
        Self {
            reuse_enabled: true,
            reuse_origin_tolerance: 0.75,
            reuse_target_tolerance: 1.0,
            reuse_max_detour_ratio: 2.5,
        }
    }
}

/// Recompute scheduling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateParams {
    /// Seconds between route evaluations.
    pub update_interval: f32,
    /// Origin movement below this skips a full resolve (m).
    pub origin_move_threshold: f32,
    /// Target movement below this skips a full resolve (m).
    pub target_move_threshold: f32,
    /// A full resolve runs at least this often regardless of movement (s).
    pub forced_recompute_interval: f32,
    pub smoothing_enabled: bool,
}

impl Default for UpdateParams {
    fn default() -> Self {
        Self {
            update_interval: 0.1,
            origin_move_threshold: 0.1,
            target_move_threshold: 0.1,
            forced_recompute_interval: 1.0,
            smoothing_enabled: true,
        }
    }
}

/// Proxy placement and motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProxyParams {
    /// Park the proxy at the origin whenever the direct line is clear.
    pub proxy_only_when_blocked: bool,
    /// Path waypoint used as the base target. Negative values count from the
    /// end: -1 is the target itself, -2 the last corner before it.
    pub proxy_waypoint_index: i32,
    pub spring_arm_enabled: bool,
    /// Spring arm: keep the proxy at least this far from the listener (m).
    pub min_listener_distance: f32,
    /// Spring arm: rate when retreating along the path (1/s).
    pub push_speed: f32,
    /// Spring arm: rate when relaxing back toward the base target (1/s).
    pub return_speed: f32,
    /// Legacy backoff: engage below this listener distance (m).
    pub proxy_min_listener_distance: f32,
    /// Legacy backoff: release above this listener distance (m).
    pub proxy_backoff_release_distance: f32,
    /// Legacy backoff: retreat distance from the path end while engaged (m).
    pub proxy_backoff_path_distance: f32,
    /// Proxy interpolation rate (1/s). 0 snaps.
    pub audio_proxy_lerp_speed: f32,
    /// Proxy interpolation rate while backing off (1/s). 0 snaps.
    pub audio_proxy_backoff_lerp_speed: f32,
}

impl Default for ProxyParams {
    fn default() -> Self {
        Self {
            proxy_only_when_blocked: true,
            proxy_waypoint_index: -2,
            spring_arm_enabled: true,
            min_listener_distance: 2.0,
            push_speed: 6.0,
            return_speed: 2.0,
            proxy_min_listener_distance: 2.0,
            proxy_backoff_release_distance: 3.0,
            proxy_backoff_path_distance: 2.5,
            audio_proxy_lerp_speed: 8.0,
            audio_proxy_backoff_lerp_speed: 4.0,
        }
    }
}

/// Values handed to the audio collaborator alongside the proxy position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModulationParams {
    /// Attenuation per meter of path between the origin and the proxy (dB/m).
    pub volume_loss_db_per_meter: f32,
    /// Cap on that attenuation (dB, positive).
    pub max_volume_loss_db: f32,
    /// Inner radius forced on the source while the route is reflected (m).
    pub reflected_inner_radius: f32,
    /// Occlusion hold requested while the route is reflected (s).
    pub occlusion_hold_seconds: f32,
    /// Publish `NavigationDebugInfo` to the sink every tick.
    pub debug_info_enabled: bool,
}

impl Default for ModulationParams {
    fn default() -> Self {
        Self {
            volume_loss_db_per_meter: 0.35,
            max_volume_loss_db: 18.0,
            reflected_inner_radius: 0.5,
            occlusion_hold_seconds: 0.25,
            debug_info_enabled: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Complete router configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub profile: NavigationProfile,
    pub graph: GraphParams,
    pub search: SearchParams,
    pub reuse: ReuseParams,
    pub update: UpdateParams,
    pub proxy: ProxyParams,
    pub modulation: ModulationParams,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            profile: NavigationProfile::Custom,
            graph: GraphParams::default(),
            search: SearchParams::default(),
            reuse: ReuseParams::default(),
            update: UpdateParams::default(),
            proxy: ProxyParams::default(),
            modulation: ModulationParams::default(),
        }
    }
}

/// A rejected configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("config JSON could not be parsed: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouterConfig {
    /// Default values with a navigation profile applied.
    pub fn with_profile(profile: NavigationProfile) -> Self {
        let mut config = Self::default();
        config.apply_profile(profile);
        config
    }

    /// Overwrite the profile's bundle of tunables and record the profile.
    pub fn apply_profile(&mut self, profile: NavigationProfile) {
        self.profile = profile;
        match profile {
            NavigationProfile::Custom => {}
            NavigationProfile::OpenAreas => {
                let g = &mut self.graph;
                g.strategy = GraphStrategy::RandomSamples;
                g.navigation_radius = 16.0;
                g.sample_point_count = 192;
                g.max_connection_distance = 7.0;
                g.graph_neighbor_limit = 8;
                g.edge_clearance_checks = 1;
                let s = &mut self.search;
                s.dynamic_connection_limit = 4;
                s.dynamic_candidate_multiplier = 3;
                s.heuristic_weight = 1.6;
            }
            NavigationProfile::HallWays => {
                let g = &mut self.graph;
                g.strategy = GraphStrategy::ReachableScan;
                g.scan_cell_size = 1.25;
                g.scan_neighborhood = ScanNeighborhood::TwentySix;
                g.scan_max_cells = 600;
                g.graph_neighbor_limit = 26;
                let s = &mut self.search;
                s.dynamic_connection_limit = 6;
                s.dynamic_candidate_multiplier = 4;
                s.heuristic_weight = 1.25;
            }
        }
    }

    /// Re-apply the recorded profile's bundle over the current values.
    pub fn reapply_profile(&mut self) {
        self.apply_profile(self.profile);
    }

    /// Parse a JSON config, apply its profile and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.reapply_profile();
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check every tunable's documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.graph;
        non_negative("graph.navigation_radius", g.navigation_radius)?;
        at_least_one("graph.sample_point_count", g.sample_point_count)?;
        non_negative("graph.max_connection_distance", g.max_connection_distance)?;
        at_least_one("graph.graph_neighbor_limit", g.graph_neighbor_limit)?;
        non_negative("graph.graph_recenter_distance", g.graph_recenter_distance)?;
        positive("graph.scan_cell_size", g.scan_cell_size)?;
        at_least_one("graph.scan_max_cells", g.scan_max_cells)?;
        if let Some(extent) = g.scan_extent_limit {
            for axis in extent {
                positive("graph.scan_extent_limit", axis)?;
            }
        }

        let s = &self.search;
        at_least_one("search.dynamic_connection_limit", s.dynamic_connection_limit)?;
        at_least_one("search.dynamic_candidate_multiplier", s.dynamic_candidate_multiplier)?;
        non_negative("search.heuristic_weight", s.heuristic_weight)?;
        at_least_one("search.max_search_expansions", s.max_search_expansions)?;

        let r = &self.reuse;
        non_negative("reuse.reuse_origin_tolerance", r.reuse_origin_tolerance)?;
        non_negative("reuse.reuse_target_tolerance", r.reuse_target_tolerance)?;
        if !(r.reuse_max_detour_ratio >= 1.0) {
            return Err(invalid("reuse.reuse_max_detour_ratio", "must be at least 1.0"));
        }

        let u = &self.update;
        non_negative("update.update_interval", u.update_interval)?;
        non_negative("update.origin_move_threshold", u.origin_move_threshold)?;
        non_negative("update.target_move_threshold", u.target_move_threshold)?;
        non_negative("update.forced_recompute_interval", u.forced_recompute_interval)?;

        let p = &self.proxy;
        non_negative("proxy.min_listener_distance", p.min_listener_distance)?;
        non_negative("proxy.push_speed", p.push_speed)?;
        non_negative("proxy.return_speed", p.return_speed)?;
        non_negative("proxy.proxy_min_listener_distance", p.proxy_min_listener_distance)?;
        non_negative("proxy.proxy_backoff_path_distance", p.proxy_backoff_path_distance)?;
        non_negative("proxy.audio_proxy_lerp_speed", p.audio_proxy_lerp_speed)?;
        non_negative("proxy.audio_proxy_backoff_lerp_speed", p.audio_proxy_backoff_lerp_speed)?;
        if p.proxy_backoff_release_distance < p.proxy_min_listener_distance {
            return Err(invalid(
                "proxy.proxy_backoff_release_distance",
                "must not be below proxy_min_listener_distance",
            ));
        }

        let m = &self.modulation;
        non_negative("modulation.volume_loss_db_per_meter", m.volume_loss_db_per_meter)?;
        non_negative("modulation.max_volume_loss_db", m.max_volume_loss_db)?;
        non_negative("modulation.reflected_inner_radius", m.reflected_inner_radius)?;
        non_negative("modulation.occlusion_hold_seconds", m.occlusion_hold_seconds)?;

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("{value} is not a finite value >= 0")))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("{value} is not a finite value > 0")))
    }
}

fn at_least_one(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(invalid(field, "must be at least 1"))
    }
}
