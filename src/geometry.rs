use glam::{IVec3, Vec3A};
use ilattice::extent::Extent;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Moves `p` by `delta` along this axis.
    #[inline]
    pub fn shift(self, p: Vec3A, delta: f32) -> Vec3A {
        let mut shifted = p;
        shifted[self.index()] += delta;
        shifted
    }
}

/// Integer coordinate of a grid cell (or of the grid point at its minimum
/// corner).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub const fn offset_by(self, [dx, dy, dz]: [i32; 3]) -> Self {
        self.offset(dx, dy, dz)
    }

    #[inline]
    pub fn coordinate(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

impl From<IVec3> for CellPosition {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// The sampled volume.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for BuildBounds {
    fn default() -> Self {
        Self::from_min_max(Vec3A::splat(-1.0), Vec3A::splat(1.0))
    }
}

impl BuildBounds {
    pub fn from_min_max(min: Vec3A, max: Vec3A) -> Self {
        Self {
            min_x: min.x,
            max_x: max.x,
            min_y: min.y,
            max_y: max.y,
            min_z: min.z,
            max_z: max.z,
        }
    }

    pub fn min(&self) -> Vec3A {
        Vec3A::new(self.min_x, self.min_y, self.min_z)
    }

    pub fn max(&self) -> Vec3A {
        Vec3A::new(self.max_x, self.max_y, self.max_z)
    }

    /// The cell lattice covering these bounds.
    ///
    /// Each dimension is truncated, not rounded, so a partial cell at the
    /// maximum side is never sampled.
    pub fn grid(&self, cell_size: f32) -> Extent<IVec3> {
        let span = (self.max() - self.min()) / cell_size;
        let shape = IVec3::new(span.x as i32, span.y as i32, span.z as i32).max(IVec3::ZERO);
        Extent::from_min_and_shape(IVec3::ZERO, shape)
    }

    /// World-space location of the grid point at `position`.
    #[inline]
    pub fn grid_point(&self, position: CellPosition, cell_size: f32) -> Vec3A {
        Vec3A::new(
            self.min_x + position.x as f32 * cell_size,
            self.min_y + position.y as f32 * cell_size,
            self.min_z + position.z as f32 * cell_size,
        )
    }
}

/// Closed-box containment; NaN components are never inside.
#[inline]
pub fn point_in_box(p: Vec3A, min: Vec3A, max: Vec3A) -> bool {
    p.cmpge(min).all() && p.cmple(max).all()
}
