//! Host mesh boundary
//!
//! The collision core never sees the host's scene-graph types. Anything that
//! can report a world-space bounding box and world-space triangles can be
//! registered as an obstacle. [`MeshGeometry`] is a ready-made adapter for
//! hosts that keep model-space vertex buffers plus a world matrix.

use std::fmt;

use crate::foundation::math::{utils, Mat4, Transform, Vec3};
use crate::physics::error::CollisionError;
use crate::spatial::AABB;
use super::primitives::Triangle;

/// Identity of a host mesh, assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Boxed iterator over world-space triangles
pub type TriangleIter<'a> = Box<dyn Iterator<Item = Triangle> + 'a>;

/// Narrow interface the host implements for every collidable mesh
///
/// Callers must have finalized the mesh's world transform before asking for
/// world-space data; stale matrices are not detected here.
pub trait CollisionSource {
    /// Stable identity used to key registry entries
    fn mesh_id(&self) -> MeshId;

    /// World-space bounding box, `None` if the mesh has no usable geometry
    fn world_aabb(&self) -> Option<AABB>;

    /// World-space triangles
    fn world_triangles(&self) -> Result<TriangleIter<'_>, CollisionError>;
}

/// Model-space vertex data plus a world transform
///
/// Vertices are stored in local coordinates and transformed on demand, the
/// way GEA 13.3.4 recommends for collision geometry.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    id: MeshId,
    /// Model-space positions; `None` models a mesh whose position attribute is missing
    positions: Option<Vec<Vec3>>,
    /// Triangle list indices; `None` means positions are already a flat triangle list
    indices: Option<Vec<u32>>,
    /// Current world transform
    pub transform: Transform,
}

impl MeshGeometry {
    /// Indexed mesh from model-space vertices
    pub fn new(id: MeshId, positions: Vec<Vec3>, indices: Vec<u32>, transform: Transform) -> Self {
        Self {
            id,
            positions: Some(positions),
            indices: Some(indices),
            transform,
        }
    }

    /// Non-indexed mesh: every three positions form one triangle
    pub fn non_indexed(id: MeshId, positions: Vec<Vec3>, transform: Transform) -> Self {
        Self {
            id,
            positions: Some(positions),
            indices: None,
            transform,
        }
    }

    /// Mesh with no position attribute (e.g. a group node or a broken load)
    pub fn without_positions(id: MeshId, transform: Transform) -> Self {
        Self {
            id,
            positions: None,
            indices: None,
            transform,
        }
    }

    /// Axis-aligned box of the given full size centred on the local origin
    pub fn cuboid(id: MeshId, size: Vec3, transform: Transform) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self::new(id, positions, indices, transform)
    }

    /// Current world matrix
    pub fn world_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    fn checked_matrix(&self) -> Result<Mat4, CollisionError> {
        let matrix = self.world_matrix();
        if utils::is_finite_matrix(&matrix) {
            Ok(matrix)
        } else {
            Err(CollisionError::NonFiniteTransform(self.id))
        }
    }

    fn checked_indices(&self, positions: &[Vec3]) -> Result<(), CollisionError> {
        if let Some(indices) = &self.indices {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                return Err(CollisionError::IndexOutOfRange {
                    mesh: self.id,
                    index,
                    vertex_count: positions.len(),
                });
            }
        }
        Ok(())
    }
}

impl CollisionSource for MeshGeometry {
    fn mesh_id(&self) -> MeshId {
        self.id
    }

    fn world_aabb(&self) -> Option<AABB> {
        let positions = self.positions.as_ref()?;
        let matrix = self.checked_matrix().ok()?;
        AABB::from_points(positions.iter().map(|p| utils::transform_vec3(&matrix, p)))
    }

    fn world_triangles(&self) -> Result<TriangleIter<'_>, CollisionError> {
        let positions = self
            .positions
            .as_deref()
            .ok_or(CollisionError::MissingPositions(self.id))?;
        let matrix = self.checked_matrix()?;
        self.checked_indices(positions)?;

        let to_world = move |p: &Vec3| utils::transform_vec3(&matrix, p);
        match &self.indices {
            Some(indices) => Ok(Box::new(indices.chunks_exact(3).map(move |chunk| {
                Triangle::new(
                    to_world(&positions[chunk[0] as usize]),
                    to_world(&positions[chunk[1] as usize]),
                    to_world(&positions[chunk[2] as usize]),
                )
            }))),
            None => Ok(Box::new(positions.chunks_exact(3).map(move |chunk| {
                Triangle::new(to_world(&chunk[0]), to_world(&chunk[1]), to_world(&chunk[2]))
            }))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_world_aabb_follows_transform() {
        let mesh = MeshGeometry::cuboid(
            MeshId(1),
            Vec3::new(2.0, 1.0, 4.0),
            Transform::from_position(Vec3::new(10.0, 0.5, 0.0)),
        );
        let aabb = mesh.world_aabb().unwrap();
        assert_relative_eq!(aabb.min, Vec3::new(9.0, 0.0, -2.0), epsilon = 1e-5);
        assert_relative_eq!(aabb.max, Vec3::new(11.0, 1.0, 2.0), epsilon = 1e-5);
        assert_eq!(mesh.world_triangles().unwrap().count(), 12);
    }

    #[test]
    fn test_missing_positions_reported() {
        let mesh = MeshGeometry::without_positions(MeshId(3), Transform::identity());
        assert!(mesh.world_aabb().is_none());
        assert_eq!(
            mesh.world_triangles().err(),
            Some(CollisionError::MissingPositions(MeshId(3)))
        );
    }

    #[test]
    fn test_out_of_range_index_reported() {
        let mesh = MeshGeometry::new(
            MeshId(4),
            vec![Vec3::zeros(), Vec3::x(), Vec3::z()],
            vec![0, 1, 5],
            Transform::identity(),
        );
        assert!(matches!(
            mesh.world_triangles(),
            Err(CollisionError::IndexOutOfRange { index: 5, vertex_count: 3, .. })
        ));
    }

    #[test]
    fn test_non_indexed_drops_trailing_vertices() {
        let mesh = MeshGeometry::non_indexed(
            MeshId(5),
            vec![Vec3::zeros(), Vec3::x(), Vec3::z(), Vec3::y()],
            Transform::identity(),
        );
        assert_eq!(mesh.world_triangles().unwrap().count(), 1);
    }
}
