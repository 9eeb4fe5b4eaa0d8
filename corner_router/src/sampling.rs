// Reproducible candidate offsets for the random-sample graph.
//
// `SampleSet` holds `count` offsets drawn uniformly from the unit ball by
// rejection sampling (see `RouteRng::unit_ball_point`). Offsets are stored
// unscaled so a change of `navigation_radius` only rescales them at build
// time; the set is regenerated only when the count or the seed changes.
//
// **Critical constraint: determinism.** Same seed and count, same offsets,
// on every platform. The generator is `corner_router_prng::RouteRng`, never
// OS entropy.

use crate::types::Vec3;
use corner_router_prng::RouteRng;

#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet {
    seed: u64,
    offsets: Vec<Vec3>,
}

impl SampleSet {
    pub fn generate(count: u32, seed: u64) -> Self {
        let mut rng = RouteRng::new(seed);
        let offsets = (0..count)
            .map(|_| Vec3::from_array(rng.unit_ball_point()))
            .collect();
        Self { seed, offsets }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Unit-ball offsets in generation order.
    pub fn offsets(&self) -> &[Vec3] {
        &self.offsets
    }

    /// Regenerate in place if `count` or `seed` differ. Returns whether the
    /// offsets changed.
    pub fn refresh(&mut self, count: u32, seed: u64) -> bool {
        if self.seed == seed && self.offsets.len() == count as usize {
            return false;
        }
        *self = Self::generate(count, seed);
        true
    }

    /// World-space candidates around `anchor`.
    pub fn world_points(&self, anchor: Vec3, radius: f32) -> impl Iterator<Item = Vec3> + '_ {
        self.offsets.iter().map(move |&o| anchor + o * radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_offsets() {
        let a = SampleSet::generate(64, 42);
        let b = SampleSet::generate(64, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn different_seed_different_offsets() {
        let a = SampleSet::generate(16, 1);
        let b = SampleSet::generate(16, 2);
        assert_ne!(a.offsets(), b.offsets());
    }

    #[test]
    fn offsets_lie_in_unit_ball() {
        let set = SampleSet::generate(500, 7);
        assert!(set.offsets().iter().all(|o| o.length_squared() <= 1.0));
    }

    #[test]
    fn refresh_only_on_count_or_seed_change() {
        let mut set = SampleSet::generate(10, 5);
        let before = set.clone();
        assert!(!set.refresh(10, 5));
        assert_eq!(set, before);
        assert!(set.refresh(12, 5));
        assert_eq!(set.len(), 12);
        // Same seed: the first ten offsets are the same stream.
        assert_eq!(&set.offsets()[..10], before.offsets());
        assert!(set.refresh(12, 6));
        assert_eq!(set.seed(), 6);
    }

    #[test]
    fn world_points_are_scaled_and_centered() {
        let set = SampleSet::generate(100, 9);
        let anchor = Vec3::new(10.0, -3.0, 2.0);
        for p in set.world_points(anchor, 4.0) {
            assert!(p.distance(anchor) <= 4.0 + 1e-4);
        }
    }
}
