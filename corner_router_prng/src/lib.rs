// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// The generator is hand-rolled so that the candidate sample cloud a router
// builds its waypoint graph from is bit-identical on every platform: the same
// `sample_seed` must always produce the same graph around the same geometry,
// otherwise reflected proxies jitter between sessions and machines.
//
// This crate is the single PRNG used across the workspace: `corner_router`
// draws its random-sphere sample offsets from it, and its tests use it to
// generate reproducible random graphs.
//
// **Critical constraint: determinism.** Every method on `RouteRng` must produce
// identical output given the same prior state, regardless of platform, compiler
// version, or optimization level. The core generator is integer-only; float
// helpers are pure functions of the integer stream.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG seeded from a single `u64`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRng {
    s: [u64; 4],
}

impl RouteRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    /// Two `RouteRng` instances created with the same seed will produce
    /// identical output sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f32` in [0, 1).
    ///
    /// Uses the upper 24 bits of a `u64` to fill the mantissa of an f32.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Generate a uniform random value in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        assert!(low < high, "range_f32: low must be less than high");
        low + self.next_f32() * (high - low)
    }

    /// Return `true` with probability `p`.
    pub fn random_bool(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Draw a point uniformly inside the unit ball by rejection sampling.
    ///
    /// Each attempt draws three coordinates in `[-1, 1)` and is discarded if
    /// it falls outside the ball. The acceptance rate is pi/6 (about 52%), so
    /// the expected number of draws per point is under two.
    pub fn unit_ball_point(&mut self) -> [f32; 3] {
        loop {
            let x = self.range_f32(-1.0, 1.0);
            let y = self.range_f32(-1.0, 1.0);
            let z = self.range_f32(-1.0, 1.0);
            if x * x + y * y + z * z <= 1.0 {
                return [x, y, z];
            }
        }
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
