//! Spatial partitioning data structures
//!
//! Provides the broad phase for walking collision: bounding boxes, a uniform
//! spatial hash over static colliders, and the query trait the narrow phase
//! consumes.

pub mod aabb;
pub mod spatial_hash;
pub mod spatial_query;

pub use aabb::AABB;
pub use spatial_hash::{
    spatial_hash_static_boxes, CellKey, ColliderHandle, SpatialHashGrid,
    DEFAULT_MAX_CELLS_PER_COLLIDER,
};
pub use spatial_query::{LinearScan, SpatialQuery};
