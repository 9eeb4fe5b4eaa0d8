// Proxy follower: turns the published route into a moving proxy position.
//
// Three states:
//
// - `Idle`: no route (failure, no target, or effects disabled). The proxy is
//   parked on the origin immediately.
// - `Direct`: the origin sees the target. With `proxy_only_when_blocked` the
//   proxy glides back to the origin; otherwise it tracks the configured
//   waypoint like the reflected case.
// - `Reflected`: the route bends around geometry. The proxy tracks the
//   waypoint at `proxy_waypoint_index` (by default the last corner before the
//   listener).
//
// The tracked position is expressed as a distance from the end of the path.
// With the spring arm enabled that distance grows when the tracked point
// comes within `min_listener_distance` of the listener and relaxes back
// afterwards, at asymmetric rates. With the spring arm disabled the legacy
// backoff applies instead: a hysteresis band between
// `proxy_min_listener_distance` and `proxy_backoff_release_distance`, and a
// fixed retreat to `proxy_backoff_path_distance` while engaged.
//
// The proxy then moves toward the tracked point by exponential-style lerp,
// snapping when the configured speed is zero.
//
// See also: `path.rs` for the arc-length helpers, `router.rs` which drives
// `tick()` once per frame and forwards `FollowerOutput` to the sink.

use crate::config::{ModulationParams, ProxyParams};
use crate::path::RoutePath;
use crate::types::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowerState {
    Idle,
    Direct,
    Reflected,
}

/// Retreat beyond the base distance that counts as "backing off" for the
/// spring arm (m).
const SPRING_BACKOFF_EPSILON: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProxyState {
    pub position: Vec3,
    /// The point on the path the proxy is moving toward.
    pub target_position: Vec3,
    /// Arc length from the tracked point to the end of the path.
    pub distance_from_end: f32,
    pub backing_off: bool,
}

/// What the sink receives for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowerOutput {
    pub state: FollowerState,
    pub position: Vec3,
    pub volume_offset_db: f32,
    pub inner_radius_override: Option<f32>,
    pub occlusion_hold: Option<f32>,
}

#[derive(Clone, Debug)]
pub struct ProxyFollower {
    state: FollowerState,
    proxy: ProxyState,
}

impl ProxyFollower {
    pub fn new(origin: Vec3) -> Self {
        Self {
            state: FollowerState::Idle,
            proxy: ProxyState {
                position: origin,
                target_position: origin,
                distance_from_end: 0.0,
                backing_off: false,
            },
        }
    }

    pub fn state(&self) -> FollowerState {
        self.state
    }

    pub fn proxy(&self) -> &ProxyState {
        &self.proxy
    }

    /// Drop to `Idle` and snap the proxy onto `origin`.
    pub fn park(&mut self, origin: Vec3) -> FollowerOutput {
        self.state = FollowerState::Idle;
        self.proxy = ProxyState {
            position: origin,
            target_position: origin,
            distance_from_end: 0.0,
            backing_off: false,
        };
        FollowerOutput {
            state: FollowerState::Idle,
            position: origin,
            volume_offset_db: 0.0,
            inner_radius_override: None,
            occlusion_hold: None,
        }
    }

    /// Advance one frame. `path` is the currently published route (its last
    /// point is the listener); `None` parks the proxy.
    pub fn tick(
        &mut self,
        delta: f32,
        origin: Vec3,
        path: Option<&RoutePath>,
        proxy: &ProxyParams,
        modulation: &ModulationParams,
    ) -> FollowerOutput {
        let Some((path, listener)) = path.and_then(|p| p.target().map(|t| (p, t))) else {
            return self.park(origin);
        };

        let state = if path.direct {
            FollowerState::Direct
        } else {
            FollowerState::Reflected
        };

        let base = if path.direct && proxy.proxy_only_when_blocked {
            path.length
        } else {
            path.distance_from_end_of(path.resolve_index(proxy.proxy_waypoint_index))
        };

        if self.state == FollowerState::Idle {
            self.proxy.distance_from_end = base;
            self.proxy.backing_off = false;
        }
        self.state = state;

        let distance = if proxy.spring_arm_enabled {
            self.spring_arm(delta, base, path, listener, proxy)
        } else {
            self.legacy_backoff(base, path, listener, proxy)
        };
        self.proxy.distance_from_end = distance;
        self.proxy.target_position = path.point_at_distance_from_end(distance);

        let speed = if self.proxy.backing_off {
            proxy.audio_proxy_backoff_lerp_speed
        } else {
            proxy.audio_proxy_lerp_speed
        };
        self.proxy.position = if speed <= 0.0 {
            self.proxy.target_position
        } else {
            let t = (delta * speed).clamp(0.0, 1.0);
            self.proxy.position.lerp(self.proxy.target_position, t)
        };

        let along = path.distance_along(self.proxy.position);
        let loss = (along * modulation.volume_loss_db_per_meter).min(modulation.max_volume_loss_db);
        let reflected = state == FollowerState::Reflected;
        FollowerOutput {
            state,
            position: self.proxy.position,
            volume_offset_db: -loss,
            inner_radius_override: reflected.then_some(modulation.reflected_inner_radius),
            occlusion_hold: reflected.then_some(modulation.occlusion_hold_seconds),
        }
    }

    fn spring_arm(
        &mut self,
        delta: f32,
        base: f32,
        path: &RoutePath,
        listener: Vec3,
        proxy: &ProxyParams,
    ) -> f32 {
        let probe = path.point_at_distance_from_end(base);
        let shortfall = proxy.min_listener_distance - probe.distance(listener);
        let desired = base.max(base + shortfall);

        let current = self.proxy.distance_from_end.clamp(0.0, path.length);
        let speed = if desired > current {
            proxy.push_speed
        } else {
            proxy.return_speed
        };
        let t = (delta * speed).clamp(0.0, 1.0);
        let next = (current + (desired - current) * t).clamp(0.0, path.length);
        self.proxy.backing_off = next > base + SPRING_BACKOFF_EPSILON;
        next
    }

    fn legacy_backoff(&mut self, base: f32, path: &RoutePath, listener: Vec3, proxy: &ProxyParams) -> f32 {
        let probe = path.point_at_distance_from_end(base);
        let d = probe.distance(listener);
        if !self.proxy.backing_off && d < proxy.proxy_min_listener_distance {
            self.proxy.backing_off = true;
        } else if self.proxy.backing_off && d > proxy.proxy_backoff_release_distance {
            self.proxy.backing_off = false;
        }
        if self.proxy.backing_off {
            base.max(proxy.proxy_backoff_path_distance).min(path.length)
        } else {
            base
        }
    }
}
