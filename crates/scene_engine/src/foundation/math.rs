//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the TRS (translation, rotation, scale)
//! value type used by scene transforms.
//!
//! Conventions: column vectors, `world = parent_world * local` and
//! `local = T * R * S`.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector2, Vector3};

/// 2D vector type (used for X-Z plane points)
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Position, rotation and scale triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    /// Translation
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self::identity()
    }
}

impl Trs {
    /// Identity: zero translation, no rotation, unit scale
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Exact identity test (no epsilon; used for the fast path only)
    pub fn is_identity(&self) -> bool {
        self.position == Vec3::zeros()
            && self.rotation == Quat::identity()
            && self.scale == Vec3::new(1.0, 1.0, 1.0)
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        compose_trs(&self.position, &self.rotation, &self.scale)
    }
}

/// Build `T * R * S`
pub fn compose_trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Translation column of an affine matrix
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trs_identity_matrix() {
        assert!(Trs::identity().is_identity());
        assert_relative_eq!(Trs::identity().to_matrix(), Mat4::identity());
    }

    #[test]
    fn test_compose_order_is_translate_rotate_scale() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), constants::PI / 2.0);
        let trs = Trs {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation,
            scale: Vec3::new(2.0, 2.0, 2.0),
        };

        // Scale first, then rotate +X onto -Z, then translate
        let point = trs.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point, Point3::new(10.0, 0.0, -2.0), epsilon = 1e-5);
        assert_relative_eq!(translation_of(&trs.to_matrix()), trs.position);
    }

    #[test]
    fn test_angle_conversion() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI);
        assert_relative_eq!(utils::rad_to_deg(constants::PI / 2.0), 90.0, epsilon = 1e-4);
    }
}
