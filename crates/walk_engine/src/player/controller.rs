//! Player movement integrator
//!
//! Turns held keys into a proposed move, hands it to the collision query and
//! applies the corrected result. Both the horizontal velocity approach and
//! the vertical fall are integrated in closed form, so one long frame and
//! several short frames covering the same time land in the same place.

use log::trace;

use crate::core::config::{MovementConfig, WalkingConfig};
use crate::foundation::math::{utils, Vec3};
use crate::input::{KeyState, WalkAction};
use crate::physics::{
    check_collision_spatial_hashes, CollisionOutcome, CollisionProbe, CollisionWorld, PlayerShape, Support,
};
use super::state::{MovementMode, PlayerState};

/// Exact solution of `dv/dt = k (target - v)` over `dt`
///
/// Returns the new velocity and the distance travelled.
fn approach(velocity: f32, target: f32, rate: f32, dt: f32) -> (f32, f32) {
    if rate <= 0.0 {
        return (velocity, velocity * dt);
    }
    let decay = (-rate * dt).exp();
    let offset = velocity - target;
    (target + offset * decay, target * dt + offset * (1.0 - decay) / rate)
}

/// Walking controller for one player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerController {
    shape: PlayerShape,
    movement: MovementConfig,
}

impl PlayerController {
    /// Controller with explicit tuning
    pub fn new(shape: PlayerShape, movement: MovementConfig) -> Self {
        Self { shape, movement }
    }

    /// Controller from a full configuration
    pub fn from_config(config: &WalkingConfig) -> Self {
        Self::new(config.player.shape(), config.movement)
    }

    /// Player collision volume
    pub fn shape(&self) -> &PlayerShape {
        &self.shape
    }

    /// Movement tuning
    pub fn movement(&self) -> &MovementConfig {
        &self.movement
    }

    /// Desired horizontal direction in player space (unit or zero), -Z forward
    fn input_direction(&self, keys: &KeyState) -> Vec3 {
        let axis = |pos: WalkAction, neg: WalkAction| -> f32 {
            f32::from(u8::from(keys.is_held(pos))) - f32::from(u8::from(keys.is_held(neg)))
        };
        let strafe = if keys.is_held(WalkAction::TurnModifier) {
            0.0
        } else {
            axis(WalkAction::Right, WalkAction::Left)
        };
        let local = Vec3::new(strafe, 0.0, axis(WalkAction::Back, WalkAction::Forward));
        local.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
    }

    /// Advance the player by `dt` seconds
    ///
    /// Non-finite, negative or zero `dt` leaves the state untouched and
    /// returns `None`. Longer frames are clamped to `max_frame_delta`.
    pub fn step(
        &self,
        state: &mut PlayerState,
        keys: &mut KeyState,
        dt: f32,
        world: &CollisionWorld<'_>,
    ) -> Option<CollisionOutcome> {
        if !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        let dt = dt.min(self.movement.max_frame_delta);
        let supported = state.mode.is_supported();

        // Turning with the modifier held
        if keys.is_held(WalkAction::TurnModifier) {
            let turn = f32::from(u8::from(keys.is_held(WalkAction::Left)))
                - f32::from(u8::from(keys.is_held(WalkAction::Right)));
            state.yaw = utils::wrap_angle(state.yaw + turn * self.movement.turn_speed * dt);
        }

        // Horizontal: exponential approach towards the target velocity
        let direction = utils::rotate_yaw(self.input_direction(keys), state.yaw);
        let target = direction * self.movement.speed;
        let mut rate = if direction == Vec3::zeros() {
            self.movement.friction
        } else {
            self.movement.acceleration
        };
        if !supported {
            rate *= self.movement.air_control;
        }
        let (vx, dx) = approach(state.velocity.x, target.x, rate, dt);
        let (vz, dz) = approach(state.velocity.z, target.z, rate, dt);

        // Vertical: jump impulse from the ground, otherwise free fall
        let jumped = keys.take_jump_request() && supported;
        let vy0 = if jumped {
            self.movement.jump_velocity
        } else if supported {
            0.0
        } else {
            state.velocity.y
        };
        let gravity = if supported && !jumped { 0.0 } else { self.movement.gravity };
        let dy = vy0 * dt - 0.5 * gravity * dt * dt;
        let vy = vy0 - gravity * dt;

        // Carry by the platform being ridden before resolving
        if let MovementMode::Riding { platform } = state.mode {
            if let Some(obstacle) = world.moving.get(platform) {
                state.position += obstacle.delta;
            }
        }

        let probe = CollisionProbe {
            previous: state.position,
            proposed: state.position + Vec3::new(dx, dy, dz),
            vertical_velocity: vy,
            was_grounded: supported && !jumped,
        };
        let outcome = check_collision_spatial_hashes(&probe, &self.shape, world);

        state.position = outcome.corrected;
        state.velocity = Vec3::new(vx, vy, vz);
        if outcome.blocked.x {
            state.velocity.x = 0.0;
        }
        if outcome.blocked.z {
            state.velocity.z = 0.0;
        }
        if outcome.blocked.y || outcome.grounded {
            state.velocity.y = 0.0;
        }

        let mode = match (outcome.grounded, outcome.support) {
            (true, Some(Support::Moving(platform))) => MovementMode::Riding { platform },
            (true, _) => MovementMode::Grounded,
            (false, _) => MovementMode::Airborne,
        };
        if mode != state.mode {
            trace!("Player mode {:?} -> {:?} at {:?}", state.mode, mode, state.position);
        }
        state.set_mode(mode);

        Some(outcome)
    }
}
