// Router events and the navigation debug snapshot.
//
// `RouterEvent`s are returned from `CornerRouter::tick()` in the order they
// happened during the tick; the router never calls back into the host for
// them. `NavigationDebugInfo` is the serde-serializable snapshot published to
// the sink when debug output is enabled, for overlays and offline tuning.

use crate::follower::FollowerState;
use crate::types::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RouterEvent {
    /// A full resolve produced a route different from the published one.
    PathUpdated { points: Vec<Vec3>, direct: bool },
    /// A full resolve found neither a direct line nor a graph route.
    PathFailed { origin: Vec3, target: Vec3 },
    /// The proxy moved this tick.
    ProxyMoved { position: Vec3 },
    /// The waypoint graph was replaced.
    GraphRebuilt {
        node_count: usize,
        edge_count: usize,
        capped: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationDebugInfo {
    pub state: Option<FollowerState>,
    pub node_count: usize,
    pub edge_count: usize,
    pub graph_capped: bool,
    pub path: Vec<Vec3>,
    pub direct: bool,
    /// The published route came from the cache rather than a search.
    pub reused: bool,
    pub distance_from_end: f32,
    pub proxy_position: Vec3,
}
