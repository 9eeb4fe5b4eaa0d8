// Dense voxel occupancy grid: a second reference `CollisionQuery`.
//
// Stores one solid/empty flag per cell in a flat `Vec<bool>` indexed by
// `x + z * size_x + y * size_x * size_z`. The grid is placed in world space by
// `origin` (the world position of cell (0,0,0)'s min corner) and `cell_size`.
// Out-of-bounds cells read as empty, so a scan that leaves the grid sees open
// space rather than an invisible wall.
//
// Segment queries use the 3D DDA voxel traversal of Amanatides & Woo and
// report the world-space entry point and face normal of the first solid cell.
// The cell containing the segment start is skipped, so a probe resting
// against a surface does not occlude itself.
//
// The whole grid reports a single `ColliderId`; excluding it disables all
// collision, matching how a host would treat a static level mesh.

use crate::collision::{CollisionQuery, ExclusionSet, Hit};
use crate::types::{ColliderId, Vec3};

/// Dense 3D occupancy grid in world space.
#[derive(Clone, Debug)]
pub struct VoxelOccupancy {
    solid: Vec<bool>,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    pub cell_size: f32,
    pub origin: Vec3,
    pub collider: ColliderId,
}

impl VoxelOccupancy {
    /// Create an empty grid.
    pub fn new(size: (u32, u32, u32), cell_size: f32, origin: Vec3, collider: ColliderId) -> Self {
        let (size_x, size_y, size_z) = size;
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            solid: vec![false; total],
            size_x,
            size_y,
            size_z,
            cell_size,
            origin,
            collider,
        }
    }

    fn index(&self, cell: [i32; 3]) -> Option<usize> {
        let [x, y, z] = cell;
        if x < 0
            || y < 0
            || z < 0
            || x as u32 >= self.size_x
            || y as u32 >= self.size_y
            || z as u32 >= self.size_z
        {
            return None;
        }
        let sx = self.size_x as usize;
        let sz = self.size_z as usize;
        Some(x as usize + z as usize * sx + y as usize * sx * sz)
    }

    pub fn is_solid(&self, cell: [i32; 3]) -> bool {
        self.index(cell).is_some_and(|i| self.solid[i])
    }

    /// Mark a cell solid or empty. No-op out of bounds.
    pub fn set(&mut self, cell: [i32; 3], solid: bool) {
        if let Some(i) = self.index(cell) {
            self.solid[i] = solid;
        }
    }

    /// Fill the inclusive cell box `min..=max`.
    pub fn fill(&mut self, min: [i32; 3], max: [i32; 3], solid: bool) {
        for y in min[1]..=max[1] {
            for z in min[2]..=max[2] {
                for x in min[0]..=max[0] {
                    self.set([x, y, z], solid);
                }
            }
        }
    }

    /// Continuous grid-space coordinates (cells) of a world point.
    fn to_grid(&self, p: Vec3) -> [f32; 3] {
        let local = (p - self.origin) * (1.0 / self.cell_size);
        local.to_array()
    }

    pub fn cell_of(&self, p: Vec3) -> [i32; 3] {
        let g = self.to_grid(p);
        [g[0].floor() as i32, g[1].floor() as i32, g[2].floor() as i32]
    }

    /// DDA traversal from `from` to `to`. Returns the segment parameter and
    /// outward normal where the first solid cell is entered.
    fn march(&self, from: Vec3, to: Vec3) -> Option<(f32, Vec3)> {
        let start = self.to_grid(from);
        let end = self.to_grid(to);
        let dir = [end[0] - start[0], end[1] - start[1], end[2] - start[2]];

        let mut cell = [
            start[0].floor() as i32,
            start[1].floor() as i32,
            start[2].floor() as i32,
        ];
        let end_cell = [
            end[0].floor() as i32,
            end[1].floor() as i32,
            end[2].floor() as i32,
        ];

        let mut step = [0i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];

        for axis in 0..3 {
            if dir[axis] > 0.0 {
                step[axis] = 1;
                t_delta[axis] = 1.0 / dir[axis];
                t_max[axis] = ((cell[axis] as f32 + 1.0) - start[axis]) / dir[axis];
            } else if dir[axis] < 0.0 {
                step[axis] = -1;
                t_delta[axis] = 1.0 / (-dir[axis]);
                t_max[axis] = (start[axis] - cell[axis] as f32) / (-dir[axis]);
            }
        }

        loop {
            if cell == end_cell {
                return None;
            }

            let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
                0
            } else if t_max[1] <= t_max[2] {
                1
            } else {
                2
            };

            if t_max[axis] > 1.0 {
                return None;
            }

            let t_enter = t_max[axis];
            cell[axis] += step[axis];
            t_max[axis] += t_delta[axis];

            if self.is_solid(cell) {
                let mut normal = [0.0f32; 3];
                normal[axis] = -(step[axis] as f32);
                return Some((t_enter, Vec3::from_array(normal)));
            }
        }
    }
}

impl CollisionQuery for VoxelOccupancy {
    fn is_point_clear(&self, point: Vec3, exclusions: &ExclusionSet) -> bool {
        exclusions.contains(self.collider) || !self.is_solid(self.cell_of(point))
    }

    fn first_blocking_hit(&self, from: Vec3, to: Vec3, exclusions: &ExclusionSet) -> Option<Hit> {
        if exclusions.contains(self.collider) {
            return None;
        }
        self.march(from, to).map(|(t, normal)| Hit {
            position: from.lerp(to, t),
            normal,
            collider: self.collider,
        })
    }
}
