// Line-of-sight path smoothing (string pulling).
//
// Starting from the first point, look backward from the end of the path for
// the furthest point visible from the current anchor, keep it, and make it
// the new anchor. When nothing past the next point is visible the next point
// is kept. The result never has more points than the input and, by the
// triangle inequality, is never longer. Smoothing a smoothed path returns it
// unchanged.
//
// Visibility is a closure so the router can route it through its cached
// `Probe` and tests can use plain geometry.

use crate::types::Vec3;

pub fn smooth_path<F>(points: &[Vec3], mut visible: F) -> Vec<Vec3>
where
    F: FnMut(Vec3, Vec3) -> bool,
{
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut smoothed = vec![points[0]];
    let mut anchor = 0;

    while anchor < last {
        let furthest = (anchor + 2..=last)
            .rev()
            .find(|&j| visible(points[anchor], points[j]))
            .unwrap_or(anchor + 1);
        smoothed.push(points[furthest]);
        anchor = furthest;
    }

    smoothed
}
