//! Math utilities and types
//!
//! Provides the fundamental math types used by the collision core and the
//! movement integrator. World space is Y-up, right-handed.

pub use nalgebra::{
    Vector3,
    Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Point3, Vec3};

    /// Rotate a vector in the XZ plane by `yaw` radians about +Y
    ///
    /// Matches `Quat::from_axis_angle(Y, yaw) * v` without building the quaternion.
    pub fn rotate_yaw(v: Vec3, yaw: f32) -> Vec3 {
        let (sin, cos) = yaw.sin_cos();
        Vec3::new(
            v.x * cos + v.z * sin,
            v.y,
            -v.x * sin + v.z * cos,
        )
    }

    /// Wrap an angle into `[-PI, PI)`
    pub fn wrap_angle(angle: f32) -> f32 {
        (angle + constants::PI).rem_euclid(constants::TAU) - constants::PI
    }

    /// Transform a vector-as-point by a world matrix
    pub fn transform_vec3(matrix: &Mat4, v: &Vec3) -> Vec3 {
        matrix.transform_point(&Point3::from(*v)).coords
    }

    /// True if every element of the matrix is finite
    pub fn is_finite_matrix(matrix: &Mat4) -> bool {
        matrix.iter().all(|value| value.is_finite())
    }
}
