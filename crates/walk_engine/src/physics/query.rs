//! Player collision query
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! The broad phase asks the static grid for every collider near the swept
//! player volume and adds every moving box. The narrow phase then resolves the
//! proposed move one axis at a time:
//!
//! 1. Y in the previous column: land on the highest walkable surface in the
//!    swept interval, or stop under a ceiling when rising
//! 2. X, then Z: a blocked axis keeps its previous coordinate, so a player
//!    pushing diagonally into a wall slides along it
//! 3. Optional world floor: never end below it

use log::trace;

use crate::foundation::math::Vec3;
use crate::spatial::{ColliderHandle, SpatialQuery, AABB};
use super::moving::MovingObstacle;
use super::obstacles::{ColliderShape, StaticIndex};

/// Player collision volume, anchored at the feet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerShape {
    /// Horizontal half-width of the body box
    pub radius: f32,
    /// Feet to top of head
    pub height: f32,
    /// Obstacles lower than this are stepped over instead of blocking
    pub step_height: f32,
    /// How far a grounded player is pulled down to stay on descending ground
    pub snap_distance: f32,
}

impl PlayerShape {
    /// Box tested against walls: starts `step_height` above the feet
    pub fn body_box(&self, feet: Vec3) -> AABB {
        let step = self.step_height.min(self.height);
        AABB {
            min: Vec3::new(feet.x - self.radius, feet.y + step, feet.z - self.radius),
            max: Vec3::new(feet.x + self.radius, feet.y + self.height, feet.z + self.radius),
        }
    }

    /// Footprint of the player column between two heights
    pub fn column(&self, feet: Vec3, bottom: f32, top: f32) -> AABB {
        AABB::new(
            Vec3::new(feet.x - self.radius, bottom, feet.z - self.radius),
            Vec3::new(feet.x + self.radius, top, feet.z + self.radius),
        )
    }
}

/// One frame's proposed move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionProbe {
    /// Resolved feet position last frame
    pub previous: Vec3,
    /// Feet position the integrator wants this frame
    pub proposed: Vec3,
    /// Vertical velocity after integration; landing is only possible when `<= 0`
    pub vertical_velocity: f32,
    /// Player stood on something last frame (enables snapping down)
    pub was_grounded: bool,
}

/// Axes on which the proposed move was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockedAxes {
    /// Wall hit along X
    pub x: bool,
    /// Ceiling hit while rising
    pub y: bool,
    /// Wall hit along Z
    pub z: bool,
}

/// What the player ended up standing on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// A static collider
    Static(ColliderHandle),
    /// A moving obstacle, by tracker position
    Moving(usize),
    /// The configured world floor
    WorldFloor,
}

/// Resolved move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOutcome {
    /// Collision-free feet position
    pub corrected: Vec3,
    /// Standing on a surface after this move
    pub grounded: bool,
    /// Axes that were clamped
    pub blocked: BlockedAxes,
    /// Surface under the feet when grounded
    pub support: Option<Support>,
}

/// Everything the query tests against
///
/// A missing static index fails open: only moving obstacles and the world
/// floor are considered.
#[derive(Debug, Clone, Copy)]
pub struct CollisionWorld<'a> {
    /// Frozen static colliders
    pub statics: Option<&'a StaticIndex>,
    /// Moving boxes refreshed this frame
    pub moving: &'a [MovingObstacle],
    /// Lowest height the player may ever reach
    pub world_floor: Option<f32>,
}

impl ColliderShape {
    /// Walkable height under the feet
    fn support_height(&self, feet: Vec3, column: &AABB) -> Option<f32> {
        match self {
            Self::Box(aabb) => column.overlaps_xz(aabb).then_some(aabb.max.y),
            Self::Triangle(tri) => tri.triangle.height_at(feet.x, feet.z),
        }
    }

    /// Underside height above the head
    fn ceiling_height(&self, feet: Vec3, column: &AABB) -> Option<f32> {
        match self {
            Self::Box(aabb) => column.overlaps_xz(aabb).then_some(aabb.min.y),
            Self::Triangle(tri) => tri.triangle.height_at(feet.x, feet.z),
        }
    }

    fn blocks(&self, body: &AABB) -> bool {
        match self {
            Self::Box(aabb) => aabb.overlaps(body),
            Self::Triangle(tri) => tri.aabb.overlaps(body) && tri.triangle.intersects_aabb(body),
        }
    }

    /// Shallowest horizontal overlap between the body and this collider's box
    fn horizontal_depth(&self, body: &AABB) -> f32 {
        let aabb = self.aabb();
        let x = aabb.max.x.min(body.max.x) - aabb.min.x.max(body.min.x);
        let z = aabb.max.z.min(body.max.z) - aabb.min.z.max(body.min.z);
        x.min(z).max(0.0)
    }
}

/// Slack for float noise when comparing penetration depths
const DEPTH_EPSILON: f32 = 1e-5;

/// Narrow-phase candidate: a static collider or a moving box
#[derive(Debug, Clone, Copy)]
struct Candidate {
    shape: ColliderShape,
    support: Support,
}

fn broad_phase(world: &CollisionWorld<'_>, sweep: &AABB) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    if let Some(statics) = world.statics {
        for handle in statics.grid().candidates_in_box(sweep) {
            if let Some(collider) = statics.collider(handle) {
                candidates.push(Candidate {
                    shape: collider.shape,
                    support: Support::Static(handle),
                });
            }
        }
    }
    // Moving boxes go last so they win height ties against static floors
    candidates.extend(world.moving.iter().enumerate().filter_map(|(i, obstacle)| {
        obstacle.aabb_world.map(|aabb| Candidate {
            shape: ColliderShape::Box(aabb),
            support: Support::Moving(i),
        })
    }));
    candidates
}

/// Resolve one proposed player move against static and moving geometry
///
/// Never fails: with no geometry at all the proposal is returned unchanged
/// and the player is airborne.
pub fn check_collision_spatial_hashes(
    probe: &CollisionProbe,
    shape: &PlayerShape,
    world: &CollisionWorld<'_>,
) -> CollisionOutcome {
    let prev = probe.previous;
    let proposed = probe.proposed;

    let snap = if probe.was_grounded { shape.snap_distance } else { 0.0 };
    let floor_lo = proposed.y - snap;
    let floor_hi = prev.y.max(proposed.y) + shape.step_height;

    let sweep = shape
        .column(prev, floor_lo.min(prev.y), floor_hi.max(prev.y.max(proposed.y) + shape.height))
        .union(&shape.column(proposed, floor_lo, proposed.y + shape.height));
    let candidates = broad_phase(world, &sweep);

    let mut outcome = CollisionOutcome {
        corrected: proposed,
        grounded: false,
        blocked: BlockedAxes::default(),
        support: None,
    };

    // Vertical, in the column the player occupied last frame
    let column_feet = Vec3::new(prev.x, proposed.y, prev.z);
    if probe.vertical_velocity <= 0.0 {
        let column = shape.column(column_feet, floor_lo, floor_hi);
        let mut best: Option<(f32, Support)> = None;
        for candidate in &candidates {
            let Some(top) = candidate.shape.support_height(column_feet, &column) else {
                continue;
            };
            if top < floor_lo || top > floor_hi {
                continue;
            }
            if best.map_or(true, |(height, _)| top >= height) {
                best = Some((top, candidate.support));
            }
        }
        if let Some((top, support)) = best {
            outcome.corrected.y = top;
            outcome.grounded = true;
            outcome.support = Some(support);
        }
    } else {
        let head_lo = prev.y + shape.height;
        let head_hi = proposed.y + shape.height;
        let column = shape.column(column_feet, head_lo, head_hi);
        let lowest = candidates
            .iter()
            .filter_map(|c| c.shape.ceiling_height(column_feet, &column))
            .filter(|&bottom| bottom >= head_lo && bottom <= head_hi)
            .fold(None, |acc: Option<f32>, bottom| Some(acc.map_or(bottom, |a| a.min(bottom))));
        if let Some(bottom) = lowest {
            outcome.corrected.y = bottom - shape.height;
            outcome.blocked.y = true;
        }
    }

    // Horizontal, one axis at a time. A collider the body already overlaps
    // at its previous position only blocks moves that push deeper into it,
    // so a player spawned inside geometry can back out but not walk through.
    let y = outcome.corrected.y;
    let start_body = shape.body_box(Vec3::new(prev.x, y, prev.z));
    let blocked_at = |feet: Vec3| {
        let body = shape.body_box(feet);
        candidates.iter().any(|c| {
            c.shape.blocks(&body)
                && (!c.shape.blocks(&start_body)
                    || c.shape.horizontal_depth(&body) > c.shape.horizontal_depth(&start_body) + DEPTH_EPSILON)
        })
    };

    let x_feet = Vec3::new(proposed.x, y, prev.z);
    if proposed.x != prev.x && blocked_at(x_feet) {
        outcome.corrected.x = prev.x;
        outcome.blocked.x = true;
    }

    let z_feet = Vec3::new(outcome.corrected.x, y, proposed.z);
    if proposed.z != prev.z && blocked_at(z_feet) {
        outcome.corrected.z = prev.z;
        outcome.blocked.z = true;
    }

    if let Some(floor) = world.world_floor {
        if outcome.corrected.y <= floor {
            outcome.corrected.y = floor;
            outcome.grounded = true;
            outcome.support.get_or_insert(Support::WorldFloor);
        }
    }

    trace!(
        "Collision query: {} candidates, grounded={}, blocked={:?}",
        candidates.len(),
        outcome.grounded,
        outcome.blocked
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::{MeshId, Triangle, TriangleCollider};
    use crate::physics::obstacles::StaticCollider;
    use approx::assert_relative_eq;

    fn shape() -> PlayerShape {
        PlayerShape {
            radius: 0.25,
            height: 1.0,
            step_height: 0.5,
            snap_distance: 0.3,
        }
    }

    fn index(boxes: &[AABB]) -> StaticIndex {
        let colliders = boxes
            .iter()
            .map(|&aabb| StaticCollider {
                source: MeshId(0),
                shape: ColliderShape::Box(aabb),
            })
            .collect();
        StaticIndex::build(colliders, 2.0).unwrap()
    }

    fn floor() -> AABB {
        AABB::new(Vec3::new(-100.0, -1.0, -100.0), Vec3::new(100.0, 0.0, 100.0))
    }

    fn probe(previous: Vec3, proposed: Vec3, vy: f32, was_grounded: bool) -> CollisionProbe {
        CollisionProbe {
            previous,
            proposed,
            vertical_velocity: vy,
            was_grounded,
        }
    }

    #[test]
    fn test_falling_player_lands_on_floor() {
        let statics = index(&[floor()]);
        let world = CollisionWorld { statics: Some(&statics), moving: &[], world_floor: None };
        let out = check_collision_spatial_hashes(
            &probe(Vec3::new(0.0, 0.2, 0.0), Vec3::new(0.0, -3.0, 0.0), -20.0, false),
            &shape(),
            &world,
        );
        assert!(out.grounded);
        assert_relative_eq!(out.corrected.y, 0.0);
        assert_eq!(out.support, Some(Support::Static(ColliderHandle(0))));
    }

    #[test]
    fn test_rising_player_not_grounded() {
        let statics = index(&[floor()]);
        let world = CollisionWorld { statics: Some(&statics), moving: &[], world_floor: None };
        let out = check_collision_spatial_hashes(
            &probe(Vec3::zeros(), Vec3::new(0.0, 0.1, 0.0), 5.0, true),
            &shape(),
            &world,
        );
        assert!(!out.grounded);
        assert_relative_eq!(out.corrected.y, 0.1);
    }

    #[test]
    fn test_grounded_player_snaps_down_small_drop() {
        let step = AABB::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.2, 1.0));
        let statics = index(&[floor(), step]);
        let world = CollisionWorld { statics: Some(&statics), moving: &[], world_floor: None };

        // Walk off the 0.2 step edge: previous column is off the step
        let out = check_collision_spatial_hashes(
            &probe(Vec3::new(1.5, 0.2, 0.0), Vec3::new(1.6, 0.19, 0.0), -0.1, true),
            &shape(),
            &world,
        );
        assert!(out.grounded);
        assert_relative_eq!(out.corrected.y, 0.0);
    }

    #[test]
    fn test_low_step_does_not_block_but_wall_does() {
        let kerb = AABB::new(Vec3::new(1.0, 0.0, -5.0), Vec3::new(2.0, 0.3, 5.0));
        let wall = AABB::new(Vec3::new(9.5, 0.0, -5.0), Vec3::new(10.5, 3.0, 5.0));
        let statics = index(&[floor(), kerb, wall]);
        let world = CollisionWorld { statics: Some(&statics), moving: &[], world_floor: None };

        let over_kerb = check_collision_spatial_hashes(
            &probe(Vec3::new(0.8, 0.0, 0.0), Vec3::new(0.9, 0.0, 0.0), 0.0, true),
            &shape(),
            &world,
        );
        assert!(!over_kerb.blocked.x);

        let into_wall = check_collision_spatial_hashes(
            &probe(Vec3::new(9.2, 0.0, 0.0), Vec3::new(9.3, 0.0, 0.1), 0.0, true),
            &shape(),
            &world,
        );
        assert!(into_wall.blocked.x);
        assert!(!into_wall.blocked.z);
        assert_relative_eq!(into_wall.corrected.x, 9.2);
        assert_relative_eq!(into_wall.corrected.z, 0.1);
    }

    #[test]
    fn test_overlapping_wall_blocks_deeper_moves_only() {
        let wall = AABB::new(Vec3::new(10.0, 0.0, -5.0), Vec3::new(11.0, 3.0, 5.0));
        let statics = index(&[floor(), wall]);
        let world = CollisionWorld { statics: Some(&statics), moving: &[], world_floor: None };
        let start = Vec3::new(9.85, 0.0, 0.0);

        let deeper = check_collision_spatial_hashes(
            &probe(start, Vec3::new(9.95, 0.0, 0.0), 0.0, true),
            &shape(),
            &world,
        );
        assert!(deeper.blocked.x);
        assert_relative_eq!(deeper.corrected.x, 9.85);

        let back_out = check_collision_spatial_hashes(
            &probe(start, Vec3::new(9.75, 0.0, 0.0), 0.0, true),
            &shape(),
            &world,
        );
        assert!(!back_out.blocked.x);
        assert_relative_eq!(back_out.corrected.x, 9.75);

        let along = check_collision_spatial_hashes(
            &probe(start, Vec3::new(9.85, 0.0, -0.2), 0.0, true),
            &shape(),
            &world,
        );
        assert!(!along.blocked.z);
        assert_relative_eq!(along.corrected.z, -0.2);
    }

    #[test]
    fn test_ceiling_clamps_jump() {
        let roof = AABB::new(Vec3::new(-5.0, 1.5, -5.0), Vec3::new(5.0, 2.0, 5.0));
        let statics = index(&[floor(), roof]);
        let world = CollisionWorld { statics: Some(&statics), moving: &[], world_floor: None };
        let out = check_collision_spatial_hashes(
            &probe(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 0.8, 0.0), 3.0, false),
            &shape(),
            &world,
        );
        assert!(out.blocked.y);
        assert_relative_eq!(out.corrected.y, 0.5);
    }

    #[test]
    fn test_ramp_triangle_supports_player() {
        let ramp = Triangle::new(
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 4.0),
        );
        let colliders = vec![StaticCollider {
            source: MeshId(9),
            shape: ColliderShape::Triangle(TriangleCollider::new(ramp).unwrap()),
        }];
        let statics = StaticIndex::build(colliders, 2.0).unwrap();
        let world = CollisionWorld { statics: Some(&statics), moving: &[], world_floor: None };
        let out = check_collision_spatial_hashes(
            &probe(Vec3::new(0.0, 1.1, 2.0), Vec3::new(0.0, 1.05, 2.0), -0.5, true),
            &shape(),
            &world,
        );
        assert!(out.grounded);
        assert_relative_eq!(out.corrected.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_no_index_fails_open() {
        let world = CollisionWorld { statics: None, moving: &[], world_floor: None };
        let p = probe(Vec3::zeros(), Vec3::new(1.0, -0.5, 1.0), -1.0, false);
        let out = check_collision_spatial_hashes(&p, &shape(), &world);
        assert_eq!(out.corrected, p.proposed);
        assert!(!out.grounded);
    }

    #[test]
    fn test_world_floor_catches_fall() {
        let world = CollisionWorld { statics: None, moving: &[], world_floor: Some(0.25) };
        let out = check_collision_spatial_hashes(
            &probe(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 0.1, 0.0), -2.0, false),
            &shape(),
            &world,
        );
        assert!(out.grounded);
        assert_eq!(out.support, Some(Support::WorldFloor));
        assert_relative_eq!(out.corrected.y, 0.25);
    }
}
