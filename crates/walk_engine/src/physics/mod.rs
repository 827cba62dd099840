//! Physics module for walking collision
//!
//! Static geometry is registered once per scene and frozen into a spatial
//! hash; moving geometry is re-boxed every frame. The player query resolves
//! one proposed move against both.

pub mod collision;
pub mod error;
pub mod moving;
pub mod obstacles;
pub mod platform;
pub mod query;

pub use collision::{CollisionSource, MeshGeometry, MeshId, Triangle, TriangleCollider};
pub use error::CollisionError;
pub use moving::{update_obstacle_boxes, MovingObstacle, MovingObstacleTracker};
pub use obstacles::{
    ColliderShape, ObstacleRegistry, SharedObstacleRegistry, StaticCollider, StaticIndex,
    DEFAULT_MAX_TRIANGLE_HEIGHT,
};
pub use platform::{LiftState, PlatformLift};
pub use query::{
    check_collision_spatial_hashes, BlockedAxes, CollisionOutcome, CollisionProbe, CollisionWorld,
    PlayerShape, Support,
};
