// Collision query interface and the per-recompute result caches.
//
// The router never talks to a physics engine directly. Hosts implement
// `CollisionQuery` (point clearance + first blocking hit along a segment) and
// the router reaches it through a `Probe`, which layers two memo tables on top:
// one for point clearance and one for segment visibility. Both are keyed by
// `QuantizedPoint` (two decimal places, see `types.rs`), so repeated checks of
// the same waypoint pair within one recompute are free.
//
// The memo tables live in `QueryCache`, owned by the router. They are cleared
// at the start of every full recompute and whenever the graph is rebuilt:
// geometry may have moved between recomputes, and a stale "clear" answer
// would let a route pass through a door that has since closed.
//
// See also: `scene.rs` and `voxel.rs` for the two reference implementations,
// `builder.rs`, `links.rs`, `reuse.rs` and `smoothing.rs` for the callers.

use crate::types::{ColliderId, QuantizedPoint, SegmentKey, Vec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The first obstruction found along a segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub position: Vec3,
    pub normal: Vec3,
    pub collider: ColliderId,
}

/// Collision objects a query must ignore: the router's own colliders and,
/// optionally, the listener's.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    ids: BTreeSet<ColliderId>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = ColliderId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, id: ColliderId) {
        self.ids.insert(id);
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// A copy of this set with one extra id (used for the listener).
    pub fn with(&self, extra: Option<ColliderId>) -> Self {
        let mut out = self.clone();
        if let Some(id) = extra {
            out.insert(id);
        }
        out
    }
}

/// Host-provided collision queries. Implementations must always return a
/// best-effort answer; the router has no error path for query failures.
pub trait CollisionQuery {
    /// `true` if a probe placed at `point` overlaps nothing outside `exclusions`.
    fn is_point_clear(&self, point: Vec3, exclusions: &ExclusionSet) -> bool;

    /// The first hit travelling from `from` to `to`, ignoring `exclusions`.
    fn first_blocking_hit(&self, from: Vec3, to: Vec3, exclusions: &ExclusionSet) -> Option<Hit>;
}

impl<Q: CollisionQuery + ?Sized> CollisionQuery for &Q {
    fn is_point_clear(&self, point: Vec3, exclusions: &ExclusionSet) -> bool {
        (**self).is_point_clear(point, exclusions)
    }

    fn first_blocking_hit(&self, from: Vec3, to: Vec3, exclusions: &ExclusionSet) -> Option<Hit> {
        (**self).first_blocking_hit(from, to, exclusions)
    }
}

impl<Q: CollisionQuery + ?Sized> CollisionQuery for Box<Q> {
    fn is_point_clear(&self, point: Vec3, exclusions: &ExclusionSet) -> bool {
        (**self).is_point_clear(point, exclusions)
    }

    fn first_blocking_hit(&self, from: Vec3, to: Vec3, exclusions: &ExclusionSet) -> Option<Hit> {
        (**self).first_blocking_hit(from, to, exclusions)
    }
}

/// Memoized clearance and visibility answers for one recompute.
#[derive(Debug, Default)]
pub struct QueryCache {
    points: FxHashMap<QuantizedPoint, bool>,
    segments: FxHashMap<SegmentKey, bool>,
    /// Queries that actually reached the collaborator since the last clear.
    misses: usize,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.segments.clear();
        self.misses = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.segments.is_empty()
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

/// A collision collaborator bound to one exclusion set and one cache.
pub struct Probe<'a, Q: CollisionQuery + ?Sized> {
    query: &'a Q,
    exclusions: &'a ExclusionSet,
    cache: &'a mut QueryCache,
}

impl<'a, Q: CollisionQuery + ?Sized> Probe<'a, Q> {
    pub fn new(query: &'a Q, exclusions: &'a ExclusionSet, cache: &'a mut QueryCache) -> Self {
        Self {
            query,
            exclusions,
            cache,
        }
    }

    pub fn point_clear(&mut self, point: Vec3) -> bool {
        let key = QuantizedPoint::from_vec(point);
        if let Some(&hit) = self.cache.points.get(&key) {
            return hit;
        }
        self.cache.misses += 1;
        let clear = self.query.is_point_clear(point, self.exclusions);
        self.cache.points.insert(key, clear);
        clear
    }

    pub fn segment_clear(&mut self, from: Vec3, to: Vec3) -> bool {
        let key = SegmentKey::new(from, to);
        if let Some(&hit) = self.cache.segments.get(&key) {
            return hit;
        }
        self.cache.misses += 1;
        let clear = self
            .query
            .first_blocking_hit(from, to, self.exclusions)
            .is_none();
        self.cache.segments.insert(key, clear);
        clear
    }

    /// Segment visibility plus `checkpoints` evenly spaced interior clearance
    /// probes. Catches gaps that a thin ray passes but a body would not.
    pub fn edge_clear(&mut self, from: Vec3, to: Vec3, checkpoints: u32) -> bool {
        if !self.segment_clear(from, to) {
            return false;
        }
        let steps = checkpoints + 1;
        (1..steps).all(|i| {
            let t = i as f32 / steps as f32;
            self.point_clear(from.lerp(to, t))
        })
    }
}
