//! Axis-aligned bounding boxes
//!
//! The "2D" tests work on the horizontal X-Z plane and ignore height; they
//! back the quad tree's partitioning.

use crate::foundation::math::{Mat4, Point3, Vec2, Vec3};
use crate::scene::error::{SceneError, SceneResult};

/// Axis-Aligned Bounding Box for spatial queries
///
/// `min <= max` holds on every axis for every constructed box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    min: Vec3,
    max: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self::point(Vec3::zeros())
    }
}

impl AABB {
    /// Box spanning `min` to `max`
    ///
    /// # Panics
    ///
    /// Panics if `min` exceeds `max` on any axis.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        match Self::try_new(min, max) {
            Ok(aabb) => aabb,
            Err(err) => panic!("{err}"),
        }
    }

    /// Checked constructor
    pub fn try_new(min: Vec3, max: Vec3) -> SceneResult<Self> {
        if min.x <= max.x && min.y <= max.y && min.z <= max.z {
            Ok(Self { min, max })
        } else {
            Err(SceneError::InvalidBounds { min, max })
        }
    }

    /// Smallest box containing both points, in any order
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Create an AABB centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let extents = extents.abs();
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Zero-volume box at a point
    pub fn point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Midpoint
    pub fn center(&self) -> Vec3 {
        self.min.lerp(&self.max, 0.5)
    }

    /// Center projected onto the X-Z plane
    pub fn center_2d(&self) -> Vec2 {
        let center = self.center();
        Vec2::new(center.x, center.z)
    }

    /// Half of [`size`](Self::size)
    pub fn extents(&self) -> Vec3 {
        self.size() / 2.0
    }

    /// Full edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Inclusive point test on all three axes
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..3).all(|axis| self.min[axis] <= point[axis] && point[axis] <= self.max[axis])
    }

    /// X-Z plane point test; `point.x` is X and `point.y` is Z
    pub fn contains_point_2d(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.z && point.y <= self.max.z
    }

    /// Overlap test; touching faces count as intersecting
    pub fn intersects(&self, other: &AABB) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    /// X-Z plane overlap test
    pub fn intersects_2d(&self, other: &AABB) -> bool {
        [0, 2].into_iter().all(|axis| self.min[axis] <= other.max[axis] && other.min[axis] <= self.max[axis])
    }

    /// True when every corner of `self` lies within `outer`
    pub fn is_inside(&self, outer: &AABB) -> bool {
        self.min.x >= outer.min.x && self.max.x <= outer.max.x &&
        self.min.y >= outer.min.y && self.max.y <= outer.max.y &&
        self.min.z >= outer.min.z && self.max.z <= outer.max.z
    }

    /// [`is_inside`](Self::is_inside) restricted to the X-Z plane
    pub fn is_inside_2d(&self, outer: &AABB) -> bool {
        self.min.x >= outer.min.x && self.max.x <= outer.max.x &&
        self.min.z >= outer.min.z && self.max.z <= outer.max.z
    }

    /// Grow to include a point
    pub fn add_point(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grow to include another box
    pub fn add_aabb(&mut self, other: &AABB) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Smallest box covering both
    pub fn union(&self, other: &AABB) -> AABB {
        let mut merged = *self;
        merged.add_aabb(other);
        merged
    }

    /// The 8 corner points, bit 0 selecting max X, bit 1 max Y, bit 2 max Z
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 != 0 { self.max.x } else { self.min.x },
                if i & 2 != 0 { self.max.y } else { self.min.y },
                if i & 4 != 0 { self.max.z } else { self.min.z },
            )
        })
    }

    /// X-Z rectangle corners: (minX,minZ), (maxX,minZ), (minX,maxZ), (maxX,maxZ)
    pub fn corners_2d(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min.x, self.min.z),
            Vec2::new(self.max.x, self.min.z),
            Vec2::new(self.min.x, self.max.z),
            Vec2::new(self.max.x, self.max.z),
        ]
    }

    /// Box enclosing this box after transformation by `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let corners = self.corners();
        let first = matrix.transform_point(&Point3::from(corners[0])).coords;
        let mut result = AABB::point(first);
        for corner in &corners[1..] {
            result.add_point(matrix.transform_point(&Point3::from(*corner)).coords);
        }
        result
    }

    /// Slab test against a ray
    ///
    /// Returns the distance along `direction` to the entry point, or 0 when
    /// `origin` is already inside.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inverse = direction.map(|d| if d == 0.0 { f32::INFINITY } else { d.recip() });
        let near = (self.min - origin).component_mul(&inverse);
        let far = (self.max - origin).component_mul(&inverse);

        let enter = near.inf(&far).max();
        let exit = near.sup(&far).min();
        (exit >= enter && exit >= 0.0).then(|| enter.max(0.0))
    }
}
