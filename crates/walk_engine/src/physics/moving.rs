//! Moving obstacle tracker
//!
//! Moving meshes (elevator platforms, doors) are not put in the spatial hash.
//! Their world boxes are recomputed every frame, after the host has refreshed
//! world matrices, and tested linearly by the collision query. There are few
//! of them, so the linear scan is cheaper than rebucketing.

use log::{trace, warn};

use crate::foundation::math::Vec3;
use crate::physics::collision::{CollisionSource, MeshId};
use crate::spatial::AABB;

/// Per-frame state of one moving mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingObstacle {
    /// Mesh this entry tracks
    pub source: MeshId,
    /// World box this frame; `None` until the mesh first reports geometry
    pub aabb_world: Option<AABB>,
    /// World box last frame
    pub previous: Option<AABB>,
    /// Translation of the box since last frame
    pub delta: Vec3,
    warned: bool,
}

impl MovingObstacle {
    fn new(source: MeshId) -> Self {
        Self {
            source,
            aabb_world: None,
            previous: None,
            delta: Vec3::zeros(),
            warned: false,
        }
    }

    fn refresh(&mut self, mesh: &dyn CollisionSource) {
        self.previous = self.aabb_world;
        match mesh.world_aabb().filter(AABB::is_finite) {
            Some(aabb) => {
                self.delta = self
                    .previous
                    .map_or_else(Vec3::zeros, |prev| aabb.center() - prev.center());
                self.aabb_world = Some(aabb);
                self.warned = false;
            }
            None => {
                // Keep last known box; the platform is treated as stationary
                if !self.warned {
                    warn!("Moving mesh {} has no usable geometry, keeping previous box", self.source);
                    self.warned = true;
                }
                self.delta = Vec3::zeros();
            }
        }
    }
}

/// Boxes for every moving mesh, in the host's list order
#[derive(Debug, Clone, Default)]
pub struct MovingObstacleTracker {
    obstacles: Vec<MovingObstacle>,
}

impl MovingObstacleTracker {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every box from the current world matrices
    ///
    /// Entry `i` always corresponds to `moving_meshes[i]`. An entry whose mesh
    /// changed identity is reset. Calling this twice without movement leaves
    /// the same boxes and zero deltas.
    pub fn update(&mut self, moving_meshes: &[&dyn CollisionSource]) {
        self.obstacles.truncate(moving_meshes.len());
        for (i, mesh) in moving_meshes.iter().enumerate() {
            let id = mesh.mesh_id();
            match self.obstacles.get_mut(i) {
                Some(entry) if entry.source == id => {}
                Some(entry) => *entry = MovingObstacle::new(id),
                None => self.obstacles.push(MovingObstacle::new(id)),
            }
            self.obstacles[i].refresh(*mesh);
        }
        trace!("Tracked {} moving obstacles", self.obstacles.len());
    }

    /// Current entries
    pub fn obstacles(&self) -> &[MovingObstacle] {
        &self.obstacles
    }

    /// Entry at list position `index`
    pub fn get(&self, index: usize) -> Option<&MovingObstacle> {
        self.obstacles.get(index)
    }

    /// Frame delta of entry `index`, zero if unknown
    pub fn delta(&self, index: usize) -> Vec3 {
        self.obstacles.get(index).map_or_else(Vec3::zeros, |o| o.delta)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// True if no moving meshes are tracked
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

/// Refresh `obstacle_boxes` from `moving_meshes`; see [`MovingObstacleTracker::update`]
pub fn update_obstacle_boxes(moving_meshes: &[&dyn CollisionSource], obstacle_boxes: &mut MovingObstacleTracker) {
    obstacle_boxes.update(moving_meshes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use crate::physics::collision::MeshGeometry;
    use approx::assert_relative_eq;

    fn platform(id: u64, y: f32) -> MeshGeometry {
        MeshGeometry::cuboid(
            MeshId(id),
            Vec3::new(2.0, 0.2, 2.0),
            Transform::from_position(Vec3::new(0.0, y, 0.0)),
        )
    }

    #[test]
    fn test_update_is_idempotent_without_motion() {
        let lift = platform(1, 0.0);
        let mut tracker = MovingObstacleTracker::new();
        update_obstacle_boxes(&[&lift], &mut tracker);
        let first = tracker.obstacles()[0].aabb_world;
        update_obstacle_boxes(&[&lift], &mut tracker);
        assert_eq!(tracker.obstacles()[0].aabb_world, first);
        assert_eq!(tracker.delta(0), Vec3::zeros());
    }

    #[test]
    fn test_delta_follows_translation() {
        let mut lift = platform(1, 0.0);
        let mut tracker = MovingObstacleTracker::new();
        tracker.update(&[&lift]);
        lift.transform.position.y = 0.75;
        tracker.update(&[&lift]);
        assert_relative_eq!(tracker.delta(0), Vec3::new(0.0, 0.75, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_length_tracks_mesh_list() {
        let a = platform(1, 0.0);
        let b = platform(2, 5.0);
        let mut tracker = MovingObstacleTracker::new();
        tracker.update(&[&a, &b]);
        assert_eq!(tracker.len(), 2);
        tracker.update(&[&b]);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.obstacles()[0].source, MeshId(2));
        assert_eq!(tracker.delta(0), Vec3::zeros());
    }

    #[test]
    fn test_missing_geometry_keeps_previous_box() {
        let lift = platform(1, 2.0);
        let mut tracker = MovingObstacleTracker::new();
        tracker.update(&[&lift]);
        let known = tracker.obstacles()[0].aabb_world;

        let broken = MeshGeometry::without_positions(MeshId(1), Transform::identity());
        tracker.update(&[&broken]);
        assert_eq!(tracker.obstacles()[0].aabb_world, known);
        assert_eq!(tracker.delta(0), Vec3::zeros());
    }
}
