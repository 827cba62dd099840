//! Player kinematic state

use crate::foundation::math::Vec3;

/// What the player is doing vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    /// Standing on static ground
    Grounded,
    /// Falling or jumping
    #[default]
    Airborne,
    /// Standing on a moving obstacle (tracker position)
    Riding {
        /// Index of the moving obstacle being ridden
        platform: usize,
    },
}

impl MovementMode {
    /// True unless airborne
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Airborne)
    }
}

/// Position, velocity and facing of the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// Feet position
    pub position: Vec3,
    /// Velocity (m/s)
    pub velocity: Vec3,
    /// Stood on something after the last step
    pub grounded: bool,
    /// Heading around +Y in radians; 0 faces -Z
    pub yaw: f32,
    /// Current mode
    pub mode: MovementMode,
}

impl PlayerState {
    /// Airborne player at rest
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            grounded: false,
            yaw: 0.0,
            mode: MovementMode::Airborne,
        }
    }

    pub(crate) fn set_mode(&mut self, mode: MovementMode) {
        self.mode = mode;
        self.grounded = mode.is_supported();
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(Vec3::zeros())
    }
}
