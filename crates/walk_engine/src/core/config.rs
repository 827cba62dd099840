//! # Walking Configuration
//!
//! Tuning values for the player volume, the movement integrator and the
//! static index. Every field has a default matching the shipped scenes, and
//! every section is `#[serde(default)]`, so a config file only needs the keys
//! it changes.
//!
//! ## Configuration Categories
//!
//! - **Player**: Collision volume anchored at the feet
//! - **Movement**: Speeds, acceleration, gravity, jump, frame clamp
//! - **Spatial**: Grid cell size, triangle extraction cutoff, world floor
//! - **Engine**: Log level for applications

use serde::{Deserialize, Serialize};

use crate::foundation::math::{constants, Vec3};
use crate::physics::{CollisionError, PlayerShape, DEFAULT_MAX_TRIANGLE_HEIGHT};

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// # Player Volume
///
/// Box of `2 * radius` footprint and `height` tall, with the position at the
/// feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal half-width
    pub radius: f32,
    /// Feet to head
    pub height: f32,
    /// Highest ledge walked onto without jumping
    pub step_height: f32,
    /// Downward snap that keeps a walking player glued to slopes and stairs
    pub snap_distance: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 0.25,
            height: 1.0,
            step_height: 0.5,
            snap_distance: 0.3,
        }
    }
}

impl PlayerConfig {
    /// Collision shape used by the query
    pub fn shape(&self) -> PlayerShape {
        PlayerShape {
            radius: self.radius,
            height: self.height,
            step_height: self.step_height,
            snap_distance: self.snap_distance,
        }
    }
}

/// # Movement Tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Target walking speed (m/s)
    pub speed: f32,
    /// Rate (1/s) at which velocity approaches the target while a key is held
    pub acceleration: f32,
    /// Rate (1/s) at which velocity decays with no key held
    pub friction: f32,
    /// Fraction of `acceleration`/`friction` available while airborne
    pub air_control: f32,
    /// Downward acceleration (m/s²)
    pub gravity: f32,
    /// Upward speed of a jump (m/s)
    pub jump_velocity: f32,
    /// Yaw rate while turning with the modifier held (rad/s)
    pub turn_speed: f32,
    /// Longest frame the integrator will simulate (s)
    pub max_frame_delta: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            acceleration: 12.0,
            friction: 10.0,
            air_control: 0.3,
            gravity: 9.81,
            jump_velocity: 5.0,
            turn_speed: constants::HALF_PI,
            max_frame_delta: 0.1,
        }
    }
}

/// # Static Index Settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Spatial hash cell edge (m); matches the street tile size
    pub cell_size: f32,
    /// Triangles taller than this are skipped by the extractor
    pub max_triangle_height: f32,
    /// Optional absolute floor the player can never fall below
    ///
    /// Off by default, so a player who walks off the geometry keeps falling.
    /// Set it to recover players that end up more than `step_height` inside
    /// a floor slab: any resolved position at or below it is lifted onto it.
    pub world_floor: Option<f32>,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: 2.0,
            max_triangle_height: DEFAULT_MAX_TRIANGLE_HEIGHT,
            world_floor: None,
        }
    }
}

/// # Engine Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for applications (`error` .. `trace`)
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// # Complete Walking Configuration
///
/// Top-level configuration passed to scene instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkingConfig {
    /// Engine settings
    pub engine: EngineConfig,
    /// Player volume
    pub player: PlayerConfig,
    /// Integrator tuning
    pub movement: MovementConfig,
    /// Index settings
    pub spatial: SpatialConfig,
    /// Feet position at scene start
    pub start_position: Vec3,
}

impl Default for WalkingConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            player: PlayerConfig::default(),
            movement: MovementConfig::default(),
            spatial: SpatialConfig::default(),
            start_position: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

impl WalkingConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), CollisionError> {
        fn positive(name: &str, value: f32) -> Result<(), CollisionError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(CollisionError::InvalidConfig(format!("{name} must be finite and positive, got {value}")))
            }
        }
        fn non_negative(name: &str, value: f32) -> Result<(), CollisionError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(CollisionError::InvalidConfig(format!("{name} must be finite and >= 0, got {value}")))
            }
        }

        positive("player.radius", self.player.radius)?;
        positive("player.height", self.player.height)?;
        non_negative("player.step_height", self.player.step_height)?;
        non_negative("player.snap_distance", self.player.snap_distance)?;
        if self.player.step_height >= self.player.height {
            return Err(CollisionError::InvalidConfig(
                "player.step_height must be below player.height".to_string(),
            ));
        }

        non_negative("movement.speed", self.movement.speed)?;
        positive("movement.acceleration", self.movement.acceleration)?;
        positive("movement.friction", self.movement.friction)?;
        non_negative("movement.gravity", self.movement.gravity)?;
        non_negative("movement.jump_velocity", self.movement.jump_velocity)?;
        non_negative("movement.turn_speed", self.movement.turn_speed)?;
        positive("movement.max_frame_delta", self.movement.max_frame_delta)?;
        if !(0.0..=1.0).contains(&self.movement.air_control) {
            return Err(CollisionError::InvalidConfig(format!(
                "movement.air_control must be within 0..=1, got {}",
                self.movement.air_control
            )));
        }

        if !self.spatial.cell_size.is_finite() || self.spatial.cell_size <= 0.0 {
            return Err(CollisionError::InvalidCellSize(self.spatial.cell_size));
        }
        positive("spatial.max_triangle_height", self.spatial.max_triangle_height)?;
        if let Some(floor) = self.spatial.world_floor {
            if !floor.is_finite() {
                return Err(CollisionError::InvalidConfig("spatial.world_floor must be finite".to_string()));
            }
        }
        if !self.start_position.iter().all(|v| v.is_finite()) {
            return Err(CollisionError::InvalidConfig("start_position must be finite".to_string()));
        }
        Ok(())
    }
}

impl Config for WalkingConfig {}
