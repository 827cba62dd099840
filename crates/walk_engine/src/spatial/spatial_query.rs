//! Abstract spatial query interface for broad-phase collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.2:
//! "Spatial partitioning schemes... allow us to quickly cull out pairs of
//! objects that cannot possibly be colliding."
//!
//! The collision query only talks to this trait, so the uniform grid can be
//! swapped for a brute-force scan (tiny scenes, tests) without touching the
//! narrow phase.

use crate::foundation::math::Vec3;
use super::aabb::AABB;
use super::spatial_hash::ColliderHandle;

/// Broad-phase lookup over static colliders
pub trait SpatialQuery: Send + Sync {
    /// Write every collider that may touch `aabb` into `out` (cleared first)
    ///
    /// Implementations may return extra candidates but must never omit a
    /// collider whose box intersects `aabb`.
    fn candidates_in_box_into(&self, aabb: &AABB, out: &mut Vec<ColliderHandle>);

    /// Number of colliders indexed
    fn collider_count(&self) -> usize;

    /// Allocating convenience wrapper around [`SpatialQuery::candidates_in_box_into`]
    fn candidates_in_box(&self, aabb: &AABB) -> Vec<ColliderHandle> {
        let mut out = Vec::new();
        self.candidates_in_box_into(aabb, &mut out);
        out
    }
}

/// Linear scan over every box (no spatial optimization)
///
/// Sufficient for a handful of colliders and used as the reference answer
/// when testing the grid.
#[derive(Debug, Clone, Default)]
pub struct LinearScan {
    boxes: Vec<AABB>,
}

impl LinearScan {
    /// Create a scan over `boxes`; handles are indices into this list
    pub fn new(boxes: Vec<AABB>) -> Self {
        Self { boxes }
    }

    /// Exact set of colliders whose box touches the sphere
    pub fn intersecting_sphere(&self, center: Vec3, radius: f32) -> Vec<ColliderHandle> {
        self.handles()
            .filter(|(_, aabb)| aabb.intersects_sphere(center, radius))
            .map(|(handle, _)| handle)
            .collect()
    }

    fn handles(&self) -> impl Iterator<Item = (ColliderHandle, &AABB)> {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(i, aabb)| u32::try_from(i).ok().map(|i| (ColliderHandle(i), aabb)))
    }
}

impl SpatialQuery for LinearScan {
    fn candidates_in_box_into(&self, aabb: &AABB, out: &mut Vec<ColliderHandle>) {
        out.clear();
        out.extend(
            self.handles()
                .filter(|(_, candidate)| candidate.intersects(aabb))
                .map(|(handle, _)| handle),
        );
    }

    fn collider_count(&self) -> usize {
        self.boxes.len()
    }
}
