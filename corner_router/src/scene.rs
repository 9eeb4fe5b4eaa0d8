// Axis-aligned box scene: a reference `CollisionQuery` implementation.
//
// Hosts with a physics engine implement `CollisionQuery` themselves; this
// module exists so the router can run headless (tests, benchmarks, offline
// tuning tools) against simple blockout geometry. Each `SceneBox` carries a
// `ColliderId` so exclusion lists behave the way they do against a real
// engine.
//
// Point clearance treats the probe as a sphere of `probe_radius`. Segment
// queries are a slab test against each box and report the nearest entry
// point. A box that already contains the segment's start is ignored, which
// matches the usual engine default of not reporting hits from inside.

use crate::collision::{CollisionQuery, ExclusionSet, Hit};
use crate::types::{ColliderId, Vec3};
use serde::{Deserialize, Serialize};

/// One solid axis-aligned box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneBox {
    pub min: Vec3,
    pub max: Vec3,
    pub collider: ColliderId,
}

impl SceneBox {
    pub fn new(min: Vec3, max: Vec3, collider: ColliderId) -> Self {
        Self { min, max, collider }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x > self.min.x
            && p.x < self.max.x
            && p.y > self.min.y
            && p.y < self.max.y
            && p.z > self.min.z
            && p.z < self.max.z
    }

    /// Squared distance from `p` to the closest point of the box (0 inside).
    pub fn distance_squared_to(&self, p: Vec3) -> f32 {
        let dx = (self.min.x - p.x).max(0.0).max(p.x - self.max.x);
        let dy = (self.min.y - p.y).max(0.0).max(p.y - self.max.y);
        let dz = (self.min.z - p.z).max(0.0).max(p.z - self.max.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Entry parameter `t` in [0, 1] and face normal where the segment enters
    /// the box, if it does.
    fn segment_entry(&self, from: Vec3, to: Vec3) -> Option<(f32, Vec3)> {
        let dir = (to - from).to_array();
        let origin = from.to_array();
        let lo = self.min.to_array();
        let hi = self.max.to_array();

        let mut t_enter = 0.0f32;
        let mut t_exit = 1.0f32;
        let mut enter_axis: Option<(usize, f32)> = None;

        for axis in 0..3 {
            if dir[axis].abs() < 1e-9 {
                if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir[axis];
            let mut t0 = (lo[axis] - origin[axis]) * inv;
            let mut t1 = (hi[axis] - origin[axis]) * inv;
            // Entering through the min face means the outward normal is -axis.
            let mut sign = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                sign = 1.0;
            }
            // `>=` on the first entering axis so a segment starting on a face
            // and heading inward still reports that face.
            if t0 > t_enter || (enter_axis.is_none() && t0 >= t_enter) {
                t_enter = t0;
                enter_axis = Some((axis, sign));
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        let (axis, sign) = enter_axis?;
        let mut normal = [0.0f32; 3];
        normal[axis] = sign;
        Some((t_enter, Vec3::from_array(normal)))
    }
}

/// A set of solid boxes plus the probe radius used for point clearance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoxScene {
    pub boxes: Vec<SceneBox>,
    pub probe_radius: f32,
}

impl BoxScene {
    pub fn new(probe_radius: f32) -> Self {
        Self {
            boxes: Vec::new(),
            probe_radius,
        }
    }

    /// Add a box and return its collider id (sequential from 1).
    pub fn add_box(&mut self, min: Vec3, max: Vec3) -> ColliderId {
        let id = ColliderId(self.boxes.len() as u64 + 1);
        self.boxes.push(SceneBox::new(min, max, id));
        id
    }

    /// Add the six walls of a closed room with inner bounds `min..max`.
    pub fn add_closed_room(&mut self, min: Vec3, max: Vec3, thickness: f32) -> Vec<ColliderId> {
        let t = thickness;
        let outer_min = min - Vec3::new(t, t, t);
        let outer_max = max + Vec3::new(t, t, t);
        vec![
            self.add_box(outer_min, Vec3::new(min.x, outer_max.y, outer_max.z)),
            self.add_box(Vec3::new(max.x, outer_min.y, outer_min.z), outer_max),
            self.add_box(outer_min, Vec3::new(outer_max.x, min.y, outer_max.z)),
            self.add_box(Vec3::new(outer_min.x, max.y, outer_min.z), outer_max),
            self.add_box(outer_min, Vec3::new(outer_max.x, outer_max.y, min.z)),
            self.add_box(Vec3::new(outer_min.x, outer_min.y, max.z), outer_max),
        ]
    }

    fn active<'a>(&'a self, exclusions: &'a ExclusionSet) -> impl Iterator<Item = &'a SceneBox> + 'a {
        self.boxes
            .iter()
            .filter(move |b| !exclusions.contains(b.collider))
    }
}

impl CollisionQuery for BoxScene {
    fn is_point_clear(&self, point: Vec3, exclusions: &ExclusionSet) -> bool {
        let r2 = self.probe_radius * self.probe_radius;
        self.active(exclusions)
            .all(|b| b.distance_squared_to(point) > r2)
    }

    fn first_blocking_hit(&self, from: Vec3, to: Vec3, exclusions: &ExclusionSet) -> Option<Hit> {
        self.active(exclusions)
            .filter(|b| !b.contains(from))
            .filter_map(|b| {
                b.segment_entry(from, to)
                    .map(|(t, normal)| (t, normal, b.collider))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, normal, collider)| Hit {
                position: from.lerp(to, t),
                normal,
                collider,
            })
    }
}
