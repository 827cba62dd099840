//! Primitive collision shapes and intersection algorithms
//!
//! Triangles are the narrow-phase primitive for meshes that cannot be boxed
//! without blocking walkable gaps (ramps, irregular street geometry).

use crate::foundation::math::Vec3;
use crate::spatial::AABB;

/// Cross products shorter than this are treated as degenerate
const DEGENERATE_EPSILON: f32 = 1.0e-8;

/// Barycentric slack so points on a shared edge belong to both triangles
const EDGE_EPSILON: f32 = 1.0e-5;

/// A triangle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Triangle vertices in world space
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal (right-hand rule); length is twice the area
    pub fn scaled_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit normal, `None` for a zero-area triangle
    pub fn normal(&self) -> Option<Vec3> {
        let n = self.scaled_normal();
        let len_sq = n.magnitude_squared();
        if len_sq > DEGENERATE_EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// True if the triangle has (numerically) zero area
    pub fn is_degenerate(&self) -> bool {
        self.normal().is_none()
    }

    /// Bounding box of the three vertices
    pub fn aabb(&self) -> AABB {
        AABB {
            min: self.v0.inf(&self.v1).inf(&self.v2),
            max: self.v0.sup(&self.v1).sup(&self.v2),
        }
    }

    /// Height of the triangle's plane at `(x, z)` if that point lies inside
    /// the triangle's XZ projection
    ///
    /// Vertical triangles (walls) have no height anywhere.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let (a, b, c) = (self.v0, self.v1, self.v2);
        let den = (b.z - c.z) * (a.x - c.x) + (c.x - b.x) * (a.z - c.z);
        if den.abs() < DEGENERATE_EPSILON {
            return None;
        }

        let l1 = ((b.z - c.z) * (x - c.x) + (c.x - b.x) * (z - c.z)) / den;
        let l2 = ((c.z - a.z) * (x - c.x) + (a.x - c.x) * (z - c.z)) / den;
        let l3 = 1.0 - l1 - l2;
        if l1 < -EDGE_EPSILON || l2 < -EDGE_EPSILON || l3 < -EDGE_EPSILON {
            return None;
        }

        Some(l1 * a.y + l2 * b.y + l3 * c.y)
    }

    /// Triangle/box overlap using the separating axis theorem
    ///
    /// Tests 13 potential separating axes:
    /// - 3 box face normals
    /// - 1 triangle face normal
    /// - 9 edge-edge cross products
    ///
    /// Touching counts as overlap.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        let center = aabb.center();
        let half = aabb.extents();

        // Work in box-local coordinates
        let v = [self.v0 - center, self.v1 - center, self.v2 - center];

        // Box face normals: compare triangle extents against the box
        for axis in 0..3 {
            let min = v[0][axis].min(v[1][axis]).min(v[2][axis]);
            let max = v[0][axis].max(v[1][axis]).max(v[2][axis]);
            if min > half[axis] || max < -half[axis] {
                return false;
            }
        }

        // Projects the triangle and the box onto `axis`; false if separated
        let overlaps_on = |axis: Vec3| -> bool {
            if axis.magnitude_squared() < DEGENERATE_EPSILON {
                return true; // Degenerate axis, skip
            }
            let p0 = axis.dot(&v[0]);
            let p1 = axis.dot(&v[1]);
            let p2 = axis.dot(&v[2]);
            let r = half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs();
            !(p0.min(p1).min(p2) > r || p0.max(p1).max(p2) < -r)
        };

        // Triangle face normal
        if !overlaps_on((v[1] - v[0]).cross(&(v[2] - v[0]))) {
            return false;
        }

        // Edge-edge cross products
        let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];
        let box_axes = [Vec3::x(), Vec3::y(), Vec3::z()];
        for edge in &edges {
            for box_axis in &box_axes {
                if !overlaps_on(edge.cross(box_axis)) {
                    return false;
                }
            }
        }

        // No separating axis found
        true
    }
}

/// A world-space triangle with its cached bounding box
///
/// Built by the triangle extractor; read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleCollider {
    /// World-space triangle
    pub triangle: Triangle,
    /// Bounding box of `triangle`
    pub aabb: AABB,
}

impl TriangleCollider {
    /// Wrap a triangle, rejecting zero-area ones
    pub fn new(triangle: Triangle) -> Option<Self> {
        if triangle.is_degenerate() {
            return None;
        }
        Some(Self {
            aabb: triangle.aabb(),
            triangle,
        })
    }
}
