//! Elevator platform driver
//!
//! A lift waits at its floor height until someone stands on it, rises at a
//! constant speed and stops at its target height for good. The driver only
//! produces a height; the host writes it into the platform mesh transform and
//! the moving obstacle tracker picks up the motion from there.

use log::debug;

/// Default rise speed in metres per second
pub const DEFAULT_LIFT_SPEED: f32 = 10.0;

/// Lift progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftState {
    /// Waiting at the floor for a rider
    Down,
    /// Rising towards the target
    Moving,
    /// Arrived; stays here
    Up,
}

/// One-way elevator
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformLift {
    floor_y: f32,
    target_y: f32,
    speed: f32,
    height: f32,
    state: LiftState,
    rider: bool,
}

impl PlatformLift {
    /// Lift resting at `floor_y` that will rise to `target_y`
    pub fn new(floor_y: f32, target_y: f32) -> Self {
        Self {
            floor_y,
            target_y,
            speed: DEFAULT_LIFT_SPEED,
            height: floor_y,
            state: LiftState::Down,
            rider: false,
        }
    }

    /// Override the rise speed
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.abs();
        self
    }

    /// Advance by `dt` seconds and return the new platform height
    ///
    /// `rider_on_platform` reports whether the player currently stands on
    /// this lift. The rider latch drops as soon as the player steps off; the
    /// lift keeps going regardless.
    pub fn update(&mut self, dt: f32, rider_on_platform: bool) -> f32 {
        if self.state == LiftState::Down && rider_on_platform {
            debug!("Lift starting: {} -> {}", self.floor_y, self.target_y);
            self.state = LiftState::Moving;
            self.rider = true;
        }

        if self.state == LiftState::Moving {
            if dt.is_finite() && dt > 0.0 {
                self.height += self.speed * dt;
            }
            if !rider_on_platform {
                self.rider = false;
            }
            if self.height >= self.target_y {
                self.height = self.target_y;
                self.state = LiftState::Up;
                self.rider = false;
                debug!("Lift arrived at {}", self.target_y);
            }
        }

        self.height
    }

    /// Current platform height
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Current state
    pub fn state(&self) -> LiftState {
        self.state
    }

    /// True while a rider is latched to a moving lift
    pub fn has_rider(&self) -> bool {
        self.rider
    }

    /// Height the lift stops at
    pub fn target_y(&self) -> f32 {
        self.target_y
    }
}
