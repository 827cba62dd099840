//! # Walk Engine
//!
//! First-person walking collision for scenes built by a host renderer.
//!
//! ## Features
//!
//! - **Spatial Hash**: Uniform grid broad phase over static colliders
//! - **Per-Triangle Colliders**: Ramps and uneven streets without blocking boxes
//! - **Moving Obstacles**: Elevators and platforms that carry the player
//! - **Axis-Separated Resolution**: Wall sliding, step-up, snap-down, ceilings
//! - **Frame-Rate Independence**: Closed-form integration with a clamped frame delta
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use walk_engine::prelude::*;
//!
//! struct Camera {
//!     position: Vec3,
//!     yaw: f32,
//! }
//!
//! impl ControlsObject for Camera {
//!     fn position(&self) -> Vec3 { self.position }
//!     fn set_position(&mut self, position: Vec3) { self.position = position; }
//!     fn yaw(&self) -> f32 { self.yaw }
//!     fn set_yaw(&mut self, yaw: f32) { self.yaw = yaw; }
//! }
//!
//! fn main() -> Result<(), CollisionError> {
//!     let floor = MeshGeometry::cuboid(
//!         MeshId(1),
//!         Vec3::new(200.0, 1.0, 200.0),
//!         Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
//!     );
//!     let scene = SceneContext::new(WalkingConfig::default()).with_box_mesh(&floor);
//!     let mut context = instantiate_collision(scene)?;
//!
//!     let mut camera = Camera { position: Vec3::new(0.0, 5.0, 0.0), yaw: 0.0 };
//!     context.on_key_down(&KeyEvent::new(KeyCode::W));
//!     walking_animation_callback(&mut context, &mut camera, 1.0 / 60.0, true);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;
pub mod foundation;

// Walking collision
pub mod debug;
pub mod input;
pub mod physics;
pub mod player;
pub mod spatial;
pub mod walking;

#[cfg(test)]
mod tests;

pub use walking::{
    instantiate_collision, walking_animation_callback, CollisionContext, ControlsObject, SceneContext,
};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{Config, MovementConfig, PlayerConfig, SpatialConfig, WalkingConfig},
        debug::CollisionDebugReport,
        foundation::{
            math::{Transform, Vec3},
            time::FrameClock,
        },
        input::{on_key_down_walking, on_key_up_walking, KeyCode, KeyEvent, KeyState, WalkAction},
        physics::{
            CollisionError, CollisionOutcome, CollisionSource, LiftState, MeshGeometry, MeshId, PlatformLift,
            SharedObstacleRegistry,
        },
        player::{MovementMode, PlayerState},
        spatial::AABB,
        walking::{instantiate_collision, walking_animation_callback, CollisionContext, ControlsObject, SceneContext},
    };
}
