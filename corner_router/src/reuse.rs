// Single-entry path cache and the reuse policy.
//
// After every successful non-direct resolve the router stores the path's
// interior waypoints (endpoints excluded, since they move every query)
// together with the origin, target and length it was solved for. On the next
// recompute the candidate
//
//     [new_origin] + cached interior + [new_target]
//
// is accepted instead of a full search when all of these hold:
//
// (a) the origin moved at most `reuse_origin_tolerance`,
// (b) the target moved at most `reuse_target_tolerance`,
// (c) every candidate segment is visible,
// (d) the candidate is at most `MAX_CACHED_GROWTH` times the cached length,
// (e) the candidate is at most `reuse_max_detour_ratio` times the direct
//     origin-target distance.
//
// The cheap distance checks run before the visibility checks. A rejection is
// never an error for the caller; it only means a full search.
//
// See also: `router.rs`, which clears the cache on every graph rebuild and
// configuration change.

use crate::collision::{CollisionQuery, Probe};
use crate::config::ReuseParams;
use crate::error::ReuseRejection;
use crate::types::{Vec3, polyline_length};
use serde::{Deserialize, Serialize};

/// How much longer than the cached solution a reused path may grow.
pub const MAX_CACHED_GROWTH: f32 = 1.20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedPath {
    pub origin: Vec3,
    pub target: Vec3,
    pub length: f32,
    pub interior: Vec<Vec3>,
}

#[derive(Clone, Debug, Default)]
pub struct PathCache {
    entry: Option<CachedPath>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a solved path. Paths with fewer than two points are ignored.
    pub fn store(&mut self, points: &[Vec3]) {
        let (Some(&origin), Some(&target)) = (points.first(), points.last()) else {
            return;
        };
        if points.len() < 2 {
            return;
        }
        self.entry = Some(CachedPath {
            origin,
            target,
            length: polyline_length(points),
            interior: points[1..points.len() - 1].to_vec(),
        });
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn get(&self) -> Option<&CachedPath> {
        self.entry.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// The cached route re-anchored on the new endpoints, if it passes every
    /// reuse check.
    pub fn try_reuse<Q: CollisionQuery + ?Sized>(
        &self,
        origin: Vec3,
        target: Vec3,
        params: &ReuseParams,
        probe: &mut Probe<'_, Q>,
    ) -> Result<Vec<Vec3>, ReuseRejection> {
        let cached = self.entry.as_ref().ok_or(ReuseRejection::Empty)?;

        let origin_moved = origin.distance(cached.origin);
        if origin_moved > params.reuse_origin_tolerance {
            return Err(ReuseRejection::OriginMoved(origin_moved));
        }
        let target_moved = target.distance(cached.target);
        if target_moved > params.reuse_target_tolerance {
            return Err(ReuseRejection::TargetMoved(target_moved));
        }

        let mut candidate = Vec::with_capacity(cached.interior.len() + 2);
        candidate.push(origin);
        candidate.extend_from_slice(&cached.interior);
        candidate.push(target);
        let length = polyline_length(&candidate);

        let growth_limit = cached.length * MAX_CACHED_GROWTH;
        if length > growth_limit {
            return Err(ReuseRejection::TooLongVersusCached {
                candidate: length,
                limit: growth_limit,
            });
        }
        let detour_limit = origin.distance(target) * params.reuse_max_detour_ratio;
        if length > detour_limit {
            return Err(ReuseRejection::DetourTooLong {
                candidate: length,
                limit: detour_limit,
            });
        }

        if let Some(blocked) = candidate
            .windows(2)
            .position(|pair| !probe.segment_clear(pair[0], pair[1]))
        {
            return Err(ReuseRejection::SegmentBlocked(blocked));
        }

        Ok(candidate)
    }
}
