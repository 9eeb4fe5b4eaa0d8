// corner_router: corner-aware 3D path routing for reflected audio proxies.
//
// Given an origin (a sound source) and a moving target (the listener), this
// crate keeps a collision-aware route between them and drives a proxy
// position along it, so an occluded source appears to sound from the last
// plausible corner instead of leaking through walls. It has no engine
// dependencies: collision queries, position sources and the audio proxy are
// traits the host implements.
//
// Module overview:
// - `router.rs`:    CornerRouter tick loop, collaborator traits, `resolve_route()`.
// - `builder.rs`:   Graph construction (random samples / reachable flood scan) + rebuild triggers.
// - `graph.rs`:     WaypointGraph: nodes and symmetric, degree-bounded adjacency.
// - `sampling.rs`:  Seeded unit-ball candidate offsets.
// - `links.rs`:     Dynamic links from the moving endpoints into the graph.
// - `search.rs`:    Greedy A* over virtual ids (origin, target, graph nodes).
// - `smoothing.rs`: Line-of-sight string pulling.
// - `reuse.rs`:     Single-entry path cache + reuse policy.
// - `path.rs`:      RoutePath and arc-length helpers.
// - `follower.rs`:  Proxy follower state machine (spring arm, legacy backoff, modulation).
// - `collision.rs`: CollisionQuery trait, exclusions, per-resolve query caches.
// - `scene.rs`:     BoxScene: axis-aligned box reference collision world.
// - `voxel.rs`:     VoxelOccupancy: dense grid reference collision world (DDA).
// - `config.rs`:    RouterConfig + nested parameter groups + navigation profiles.
// - `event.rs`:     RouterEvent + NavigationDebugInfo.
// - `error.rs`:     RouteFailure / ReuseRejection.
// - `prng`:         Re-exported from `corner_router_prng`: xoshiro256++ PRNG with SplitMix64 seeding.
// - `types.rs`:     Vec3, quantized cache keys, node / virtual / collider ids.
//
// **Critical constraint: determinism.** Given the same scene, configuration
// and endpoint positions, the router builds the same graph and resolves the
// same route. Sampling uses the seeded PRNG; hash maps are only used for
// lookups, never iterated to produce output.

pub mod builder;
pub mod collision;
pub mod config;
pub mod error;
pub mod event;
pub mod follower;
pub mod graph;
pub mod links;
pub mod path;
pub use corner_router_prng as prng;
pub mod reuse;
pub mod router;
pub mod sampling;
pub mod scene;
pub mod search;
pub mod smoothing;
pub mod types;
pub mod voxel;

pub use config::{ConfigError, NavigationProfile, RouterConfig};
pub use event::{NavigationDebugInfo, RouterEvent};
pub use router::{CornerRouter, EffectsContext, PositionProvider, ProxySink, TickResult};
pub use types::Vec3;
