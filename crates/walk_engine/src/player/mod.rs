//! First-person player: kinematic state and the movement integrator

pub mod controller;
pub mod state;

pub use controller::PlayerController;
pub use state::{MovementMode, PlayerState};
