// Core types shared across the router.
//
// Defines the world-space vector (`Vec3`), the fixed-precision key used by
// the spatial caches (`QuantizedPoint`), graph node identifiers, and the
// virtual id scheme the search layers on top of them. All types derive
// `Serialize`/`Deserialize` so paths and graphs can be dumped for debugging.
//
// Coordinates are meters in the host's world space. The router never assumes
// an up axis; only the flood scan's extent limit is axis-aware.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A point or direction in world space, in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).length_squared()
    }

    /// Sum of absolute per-axis differences.
    pub fn manhattan_distance(self, other: Self) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    /// Linear interpolation; `t` is not clamped.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

// ---------------------------------------------------------------------------
// Quantized cache keys
// ---------------------------------------------------------------------------

/// Scale applied before rounding a coordinate into a cache key. 100 keeps two
/// decimal places: points closer than half a centimeter share a key.
pub const QUANTIZE_SCALE: f32 = 100.0;

/// A world point snapped to a fixed-precision integer lattice, used as a hash
/// key for the clearance and visibility caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuantizedPoint(pub i32, pub i32, pub i32);

impl QuantizedPoint {
    pub fn from_vec(p: Vec3) -> Self {
        Self(quantize(p.x), quantize(p.y), quantize(p.z))
    }
}

fn quantize(v: f32) -> i32 {
    (v * QUANTIZE_SCALE).round() as i32
}

/// Key for a directed segment. Hit queries ignore a collider that contains
/// the start point, so `a -> b` and `b -> a` can disagree and are cached
/// separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentKey(QuantizedPoint, QuantizedPoint);

impl SegmentKey {
    pub fn new(from: Vec3, to: Vec3) -> Self {
        Self(QuantizedPoint::from_vec(from), QuantizedPoint::from_vec(to))
    }
}

// ---------------------------------------------------------------------------
// Graph ids
// ---------------------------------------------------------------------------

/// Dense index of a waypoint in the current graph. Invalidated by a rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier in the search space: 0 is the query origin, 1 the query target,
/// and every graph node `i` appears as `i + 2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualId(pub u32);

impl VirtualId {
    pub const ORIGIN: VirtualId = VirtualId(0);
    pub const TARGET: VirtualId = VirtualId(1);
    const GRAPH_OFFSET: u32 = 2;

    pub fn from_node(node: NodeId) -> Self {
        Self(node.0 + Self::GRAPH_OFFSET)
    }

    /// The graph node behind this id, or `None` for the two query endpoints.
    pub fn node(self) -> Option<NodeId> {
        self.0.checked_sub(Self::GRAPH_OFFSET).map(NodeId)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque identifier of a collision object in the host engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u64);
