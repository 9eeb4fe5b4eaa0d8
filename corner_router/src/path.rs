// The published route and arc-length helpers over it.
//
// A `RoutePath` runs from origin to target inclusive. `direct` marks the
// straight-line case. The follower addresses positions on the path by
// "distance from end" (0 is the target, `length` is the origin), which stays
// meaningful when the endpoints slide between recomputes.

use crate::types::{Vec3, polyline_length};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub points: Vec<Vec3>,
    pub direct: bool,
    pub length: f32,
}

impl RoutePath {
    pub fn new(points: Vec<Vec3>, direct: bool) -> Self {
        let length = polyline_length(&points);
        Self {
            points,
            direct,
            length,
        }
    }

    pub fn straight(origin: Vec3, target: Vec3) -> Self {
        Self::new(vec![origin, target], true)
    }

    pub fn origin(&self) -> Option<Vec3> {
        self.points.first().copied()
    }

    pub fn target(&self) -> Option<Vec3> {
        self.points.last().copied()
    }

    /// Interior waypoints (endpoints excluded).
    pub fn interior(&self) -> &[Vec3] {
        match self.points.len() {
            0..=2 => &[],
            n => &self.points[1..n - 1],
        }
    }

    /// Map a configured waypoint index onto this path. Negative values count
    /// from the end (-1 is the last point). Out-of-range values clamp.
    pub fn resolve_index(&self, index: i32) -> usize {
        let len = self.points.len() as i64;
        if len == 0 {
            return 0;
        }
        let raw = if index < 0 {
            len + index as i64
        } else {
            index as i64
        };
        raw.clamp(0, len - 1) as usize
    }

    /// Path length from waypoint `index` to the target.
    pub fn distance_from_end_of(&self, index: usize) -> f32 {
        if index >= self.points.len() {
            return 0.0;
        }
        polyline_length(&self.points[index..])
    }

    /// The point `distance` back from the target along the path, clamped to
    /// the path.
    pub fn point_at_distance_from_end(&self, distance: f32) -> Vec3 {
        let Some(mut point) = self.target() else {
            return Vec3::ZERO;
        };
        let mut remaining = distance.max(0.0);
        for pair in self.points.windows(2).rev() {
            let (a, b) = (pair[0], pair[1]);
            let seg = a.distance(b);
            if remaining <= seg {
                return if seg > 0.0 {
                    b.lerp(a, remaining / seg)
                } else {
                    b
                };
            }
            remaining -= seg;
            point = a;
        }
        point
    }

    /// Arc length from the origin to the point of the path closest to `p`.
    pub fn distance_along(&self, p: Vec3) -> f32 {
        let mut best = (f32::INFINITY, 0.0f32);
        let mut travelled = 0.0;
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let ab = b - a;
            let len2 = ab.length_squared();
            let t = if len2 > 0.0 {
                ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let d2 = p.distance_squared(a + ab * t);
            if d2 < best.0 {
                best = (d2, travelled + len2.sqrt() * t);
            }
            travelled += len2.sqrt();
        }
        best.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner() -> RoutePath {
        RoutePath::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 4.0),
                Vec3::new(3.0, 0.0, 4.0),
            ],
            false,
        )
    }

    #[test]
    fn length_and_interior() {
        let path = corner();
        assert_eq!(path.length, 7.0);
        assert_eq!(path.interior(), &[Vec3::new(0.0, 0.0, 4.0)]);
        assert!(RoutePath::straight(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)).interior().is_empty());
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let path = corner();
        assert_eq!(path.resolve_index(-1), 2);
        assert_eq!(path.resolve_index(-2), 1);
        assert_eq!(path.resolve_index(-9), 0);
        assert_eq!(path.resolve_index(1), 1);
        assert_eq!(path.resolve_index(40), 2);
    }

    #[test]
    fn distance_from_end_round_trips_through_points() {
        let path = corner();
        assert_eq!(path.distance_from_end_of(1), 3.0);
        assert_eq!(path.point_at_distance_from_end(3.0), Vec3::new(0.0, 0.0, 4.0));
        assert!(path.point_at_distance_from_end(1.0).distance(Vec3::new(2.0, 0.0, 4.0)) < 1e-5);
        assert_eq!(path.point_at_distance_from_end(5.0), Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(path.point_at_distance_from_end(-1.0), Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(path.point_at_distance_from_end(100.0), Vec3::ZERO);
    }

    #[test]
    fn distance_along_projects_onto_the_path() {
        let path = corner();
        assert_eq!(path.distance_along(Vec3::ZERO), 0.0);
        assert_eq!(path.distance_along(Vec3::new(0.0, 0.0, 4.0)), 4.0);
        assert!((path.distance_along(Vec3::new(1.0, 0.5, 4.2)) - 5.0).abs() < 1e-5);
    }
}
