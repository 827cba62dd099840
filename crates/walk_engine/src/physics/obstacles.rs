//! Static obstacle registry and triangle extractor
//!
//! Obstacles are registered while a scene loads (possibly from a loader
//! thread) and frozen into a [`StaticIndex`] once loading is done. Simple
//! meshes become a single box; meshes whose bounding box would block walkable
//! space (ramps, street kerbs) are split into per-triangle colliders.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace, warn};

use crate::physics::collision::{CollisionSource, MeshId, TriangleCollider};
use crate::physics::error::CollisionError;
use crate::spatial::{ColliderHandle, SpatialHashGrid, AABB};

/// Triangles taller than this are assumed to be walls that get boxed separately
pub const DEFAULT_MAX_TRIANGLE_HEIGHT: f32 = 3.0;

/// Narrow-phase shape of a static collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Whole-mesh bounding box
    Box(AABB),
    /// Single world-space triangle
    Triangle(TriangleCollider),
}

impl ColliderShape {
    /// Broad-phase bounds
    pub fn aabb(&self) -> AABB {
        match self {
            Self::Box(aabb) => *aabb,
            Self::Triangle(tri) => tri.aabb,
        }
    }
}

/// One registered static collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticCollider {
    /// Mesh the collider was built from
    pub source: MeshId,
    /// Geometry used by the narrow phase
    pub shape: ColliderShape,
}

impl StaticCollider {
    /// Broad-phase bounds
    pub fn aabb(&self) -> AABB {
        self.shape.aabb()
    }
}

/// Append-only list of static colliders
///
/// Duplicates are allowed; registering the same mesh twice yields two
/// identical entries.
#[derive(Debug, Clone)]
pub struct ObstacleRegistry {
    colliders: Vec<StaticCollider>,
    max_triangle_height: f32,
}

impl Default for ObstacleRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRIANGLE_HEIGHT)
    }
}

impl ObstacleRegistry {
    /// Empty registry with the given tall-triangle cutoff
    pub fn new(max_triangle_height: f32) -> Self {
        Self {
            colliders: Vec::new(),
            max_triangle_height,
        }
    }

    /// Register a mesh as a single world-space box
    ///
    /// Returns false (and logs) if the mesh has no usable geometry.
    pub fn add_obstacle(&mut self, mesh: &dyn CollisionSource) -> bool {
        let id = mesh.mesh_id();
        match mesh.world_aabb() {
            Some(aabb) if aabb.is_finite() => {
                self.add_obstacle_box(id, aabb);
                true
            }
            _ => {
                warn!("Mesh {} has no usable geometry, not registered as obstacle", id);
                false
            }
        }
    }

    /// Register a ready-made world-space box
    pub fn add_obstacle_box(&mut self, source: MeshId, aabb: AABB) {
        trace!("Obstacle box for mesh {}: {:?}", source, aabb);
        self.colliders.push(StaticCollider {
            source,
            shape: ColliderShape::Box(aabb),
        });
    }

    /// Register every triangle of a mesh as its own collider
    ///
    /// Degenerate triangles and triangles taller than the cutoff are skipped.
    /// A mesh whose triangles cannot be read is skipped with a warning.
    /// Returns the number of colliders added.
    pub fn extract_per_triangle(&mut self, mesh: &dyn CollisionSource) -> usize {
        match self.try_extract_per_triangle(mesh) {
            Ok(added) => added,
            Err(err) => {
                warn!("Skipping triangle extraction: {}", err);
                0
            }
        }
    }

    fn try_extract_per_triangle(&mut self, mesh: &dyn CollisionSource) -> Result<usize, CollisionError> {
        let source = mesh.mesh_id();
        let before = self.colliders.len();
        let mut skipped_tall = 0_usize;
        let mut skipped_degenerate = 0_usize;

        for triangle in mesh.world_triangles()? {
            let Some(collider) = TriangleCollider::new(triangle) else {
                skipped_degenerate += 1;
                continue;
            };
            if !collider.aabb.is_finite() {
                skipped_degenerate += 1;
                continue;
            }
            if collider.aabb.size().y > self.max_triangle_height {
                skipped_tall += 1;
                continue;
            }
            self.colliders.push(StaticCollider {
                source,
                shape: ColliderShape::Triangle(collider),
            });
        }

        let added = self.colliders.len() - before;
        debug!(
            "Mesh {}: {} triangle colliders ({} tall, {} degenerate skipped)",
            source, added, skipped_tall, skipped_degenerate
        );
        Ok(added)
    }

    /// Registered colliders in registration order
    pub fn colliders(&self) -> &[StaticCollider] {
        &self.colliders
    }

    /// Number of registered colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Tall-triangle cutoff used by the extractor
    pub fn max_triangle_height(&self) -> f32 {
        self.max_triangle_height
    }

    /// Freeze the current contents into a queryable index
    pub fn build_index(&self, cell_size: f32) -> Result<StaticIndex, CollisionError> {
        StaticIndex::build(self.colliders.clone(), cell_size)
    }
}

/// Registry shared between the frame loop and loader threads
///
/// Lock poisoning is recovered from: a loader that panicked mid-registration
/// leaves at worst a partially registered mesh behind.
#[derive(Debug, Clone, Default)]
pub struct SharedObstacleRegistry {
    inner: Arc<RwLock<ObstacleRegistry>>,
}

impl SharedObstacleRegistry {
    /// Wrap a registry for sharing
    pub fn new(registry: ObstacleRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Shared read access
    pub fn read(&self) -> RwLockReadGuard<'_, ObstacleRegistry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive write access
    pub fn write(&self) -> RwLockWriteGuard<'_, ObstacleRegistry> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`ObstacleRegistry::add_obstacle`]
    pub fn add_obstacle(&self, mesh: &dyn CollisionSource) -> bool {
        self.write().add_obstacle(mesh)
    }

    /// See [`ObstacleRegistry::add_obstacle_box`]
    pub fn add_obstacle_box(&self, source: MeshId, aabb: AABB) {
        self.write().add_obstacle_box(source, aabb);
    }

    /// See [`ObstacleRegistry::extract_per_triangle`]
    pub fn extract_per_triangle(&self, mesh: &dyn CollisionSource) -> usize {
        self.write().extract_per_triangle(mesh)
    }

    /// Snapshot the registry into an index
    pub fn build_index(&self, cell_size: f32) -> Result<StaticIndex, CollisionError> {
        self.read().build_index(cell_size)
    }
}

/// Immutable static colliders plus their spatial hash
#[derive(Debug, Clone)]
pub struct StaticIndex {
    colliders: Vec<StaticCollider>,
    grid: SpatialHashGrid,
}

impl StaticIndex {
    /// Bucket `colliders` into a grid; handles are indices into `colliders`
    pub fn build(colliders: Vec<StaticCollider>, cell_size: f32) -> Result<Self, CollisionError> {
        let grid = SpatialHashGrid::build(
            cell_size,
            colliders
                .iter()
                .enumerate()
                .filter_map(|(i, c)| u32::try_from(i).ok().map(|i| (ColliderHandle(i), c.aabb()))),
        )?;
        Ok(Self { colliders, grid })
    }

    /// Collider for a handle issued by this index's grid
    pub fn collider(&self, handle: ColliderHandle) -> Option<&StaticCollider> {
        self.colliders.get(handle.index())
    }

    /// All colliders
    pub fn colliders(&self) -> &[StaticCollider] {
        &self.colliders
    }

    /// Broad-phase grid
    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }
}
