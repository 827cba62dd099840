//! Axis-aligned bounding boxes
//!
//! The only collision volume used by the broad phase. Every constructor keeps
//! `min <= max` componentwise.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    ///
    /// Corners are reordered componentwise, so swapped inputs still produce a
    /// valid box.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.inf(&max),
            max: min.sup(&max),
        }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let extents = extents.abs();
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box enclosing every point, `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self { min, max })
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grow the box by `amount` on every side
    pub fn inflate(&self, amount: Vec3) -> Self {
        Self::new(self.min - amount, self.max + amount)
    }

    /// Translate the box
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Union of two boxes
    pub fn union(&self, other: &AABB) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB (touching counts)
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Strict overlap: boxes sharing only a face do not overlap
    ///
    /// Used for blocking tests so a player standing exactly on a floor's top
    /// face is not considered inside it.
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.y < other.max.y && self.max.y > other.min.y &&
        self.min.z < other.max.z && self.max.z > other.min.z
    }

    /// Strict overlap of the XZ footprints
    pub fn overlaps_xz(&self, other: &AABB) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.z < other.max.z && self.max.z > other.min.z
    }

    /// Check if the box touches the sphere `(center, radius)`
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.sup(&self.min).inf(&self.max);
        (closest - center).magnitude_squared() <= radius * radius
    }

    /// True if every corner coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
    }
}
