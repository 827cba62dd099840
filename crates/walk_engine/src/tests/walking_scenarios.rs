//! Walking scenarios
//!
//! Each test builds a small scene the way a host would (meshes, registry,
//! context), then drives it frame by frame through
//! `walking_animation_callback` and checks where the player ends up.

use crate::core::config::WalkingConfig;
use crate::foundation::logging;
use crate::foundation::math::{Transform, Vec3};
use crate::input::{KeyCode, KeyEvent};
use crate::physics::{CollisionOutcome, CollisionSource, LiftState, MeshGeometry, MeshId, PlatformLift};
use crate::player::MovementMode;
use crate::walking::{instantiate_collision, walking_animation_callback, CollisionContext, ControlsObject, SceneContext};
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Rig {
        position: Vec3,
        yaw: f32,
    }

    impl Rig {
        fn at(x: f32, y: f32, z: f32) -> Self {
            Self { position: Vec3::new(x, y, z), yaw: 0.0 }
        }
    }

    impl ControlsObject for Rig {
        fn position(&self) -> Vec3 {
            self.position
        }
        fn set_position(&mut self, position: Vec3) {
            self.position = position;
        }
        fn yaw(&self) -> f32 {
            self.yaw
        }
        fn set_yaw(&mut self, yaw: f32) {
            self.yaw = yaw;
        }
    }

    /// 200 x 200 slab with its top at y = 0
    fn floor() -> MeshGeometry {
        MeshGeometry::cuboid(
            MeshId(1),
            Vec3::new(200.0, 1.0, 200.0),
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
        )
    }

    /// Wall occupying x in 10..11
    fn wall() -> MeshGeometry {
        MeshGeometry::cuboid(
            MeshId(2),
            Vec3::new(1.0, 3.0, 20.0),
            Transform::from_position(Vec3::new(10.5, 1.5, 0.0)),
        )
    }

    fn floor_context() -> (CollisionContext, MeshGeometry) {
        let floor = floor();
        let context = instantiate_collision(SceneContext::new(WalkingConfig::default()).with_box_mesh(&floor)).unwrap();
        (context, floor)
    }

    fn run(context: &mut CollisionContext, rig: &mut Rig, frames: usize, dt: f32) -> Vec<CollisionOutcome> {
        (0..frames)
            .filter_map(|_| walking_animation_callback(context, rig, dt, true))
            .collect()
    }

    #[test]
    fn test_grounding_converges_to_floor() {
        logging::init_for_tests();
        let (mut context, _floor) = floor_context();
        let mut rig = Rig::at(0.0, 50.0, 0.0);

        run(&mut context, &mut rig, 200, 0.05);

        assert_relative_eq!(rig.position.y, 0.0);
        assert_eq!(context.player().mode, MovementMode::Grounded);
        assert!(context.player().grounded);
    }

    #[test]
    fn test_wall_slide() {
        let floor = floor();
        let wall = wall();
        let scene = SceneContext::new(WalkingConfig::default())
            .with_box_mesh(&floor)
            .with_box_mesh(&wall);
        let mut context = instantiate_collision(scene).unwrap();
        let mut rig = Rig::at(9.0, 0.0, 0.0);
        run(&mut context, &mut rig, 2, 0.016);

        context.on_key_down(&KeyEvent::new(KeyCode::W));
        context.on_key_down(&KeyEvent::new(KeyCode::D));
        let outcomes = run(&mut context, &mut rig, 60, 0.016);

        assert!(outcomes.iter().any(|o| o.blocked.x));
        assert!(outcomes.iter().all(|o| !o.blocked.z));
        assert!(rig.position.x <= 9.75 + 1e-4);
        assert!(rig.position.x > 9.5);
        assert!(rig.position.z < -1.0);
    }

    #[test]
    fn test_spawned_overlapping_wall_cannot_walk_through() {
        let floor = floor();
        let wall = wall();
        let scene = SceneContext::new(WalkingConfig::default())
            .with_box_mesh(&floor)
            .with_box_mesh(&wall);
        let mut context = instantiate_collision(scene).unwrap();
        // Body reaches x = 10.1, 0.1 into the wall
        let mut rig = Rig::at(9.85, 0.0, 0.0);
        run(&mut context, &mut rig, 2, 0.016);

        context.on_key_down(&KeyEvent::new(KeyCode::D));
        let outcomes = run(&mut context, &mut rig, 120, 0.016);

        assert!(outcomes.iter().any(|o| o.blocked.x));
        assert!(rig.position.x < 10.0);
        assert_relative_eq!(rig.position.x, 9.85, epsilon = 1e-4);

        context.on_key_up(&KeyEvent::new(KeyCode::D));
        context.on_key_down(&KeyEvent::new(KeyCode::A));
        run(&mut context, &mut rig, 30, 0.016);
        assert!(rig.position.x < 9.75);
    }

    #[test]
    fn test_platform_carries_player_to_top() {
        let mut lift = PlatformLift::new(0.0, 90.0);
        let mut mesh = MeshGeometry::cuboid(
            MeshId(10),
            Vec3::new(4.0, 0.4, 4.0),
            Transform::from_position(Vec3::new(20.0, -0.2, 0.0)),
        );
        let (mut context, _floor) = floor_context();
        let mut rig = Rig::at(20.0, 0.5, 0.0);

        for _ in 0..300 {
            let rider = matches!(context.player().mode, MovementMode::Riding { platform: 0 });
            let height = lift.update(0.05, rider);
            mesh.transform.position.y = height - 0.2;
            context.update_obstacle_boxes(&[&mesh as &dyn CollisionSource]);
            walking_animation_callback(&mut context, &mut rig, 0.05, true);
        }

        assert_eq!(lift.state(), LiftState::Up);
        assert_relative_eq!(rig.position.y, 90.0, epsilon = 1e-3);
        assert_relative_eq!(rig.position.x, 20.0, epsilon = 1e-4);
        assert!(context.player().mode.is_supported());
    }

    #[test]
    fn test_frame_delta_robustness() {
        let (mut coarse, _floor_a) = floor_context();
        let (mut fine, _floor_b) = floor_context();
        let mut rig_coarse = Rig::at(0.0, 0.0, 0.0);
        let mut rig_fine = Rig::at(0.0, 0.0, 0.0);
        run(&mut coarse, &mut rig_coarse, 1, 0.01);
        run(&mut fine, &mut rig_fine, 1, 0.01);

        for context in [&mut coarse, &mut fine] {
            context.on_key_down(&KeyEvent::new(KeyCode::W));
            context.on_key_down(&KeyEvent::new(KeyCode::A));
        }
        run(&mut coarse, &mut rig_coarse, 1, 0.1);
        run(&mut fine, &mut rig_fine, 10, 0.01);

        assert_relative_eq!(rig_coarse.position, rig_fine.position, epsilon = 1e-4);
        assert_relative_eq!(coarse.player().velocity, fine.player().velocity, epsilon = 1e-4);
    }

    #[test]
    fn test_landing_is_step_independent() {
        let (mut coarse, _floor_a) = floor_context();
        let (mut fine, _floor_b) = floor_context();
        let mut rig_coarse = Rig::at(0.0, 3.0, 0.0);
        let mut rig_fine = Rig::at(0.0, 3.0, 0.0);

        // About 0.8 s of fall, then resting on the floor
        run(&mut coarse, &mut rig_coarse, 15, 0.1);
        run(&mut fine, &mut rig_fine, 150, 0.01);

        assert_relative_eq!(rig_coarse.position, rig_fine.position, epsilon = 1e-4);
        assert_relative_eq!(rig_coarse.position.y, 0.0);
        assert!(coarse.player().grounded && fine.player().grounded);

        for context in [&mut coarse, &mut fine] {
            context.on_key_down(&KeyEvent::new(KeyCode::W));
        }
        run(&mut coarse, &mut rig_coarse, 10, 0.1);
        run(&mut fine, &mut rig_fine, 100, 0.01);

        assert_relative_eq!(rig_coarse.position, rig_fine.position, epsilon = 1e-3);
        assert!(rig_coarse.position.z < -2.0);
    }

    #[test]
    fn test_free_fall_is_step_independent() {
        let mut coarse = instantiate_collision(SceneContext::new(WalkingConfig::default())).unwrap();
        let mut fine = instantiate_collision(SceneContext::new(WalkingConfig::default())).unwrap();
        let mut rig_coarse = Rig::at(0.0, 100.0, 0.0);
        let mut rig_fine = Rig::at(0.0, 100.0, 0.0);

        run(&mut coarse, &mut rig_coarse, 5, 0.1);
        run(&mut fine, &mut rig_fine, 50, 0.01);

        assert_relative_eq!(rig_coarse.position.y, rig_fine.position.y, epsilon = 1e-3);
        assert_relative_eq!(rig_coarse.position.y, 100.0 - 0.5 * 9.81 * 0.25, epsilon = 1e-3);
    }

    #[test]
    fn test_oversized_frame_is_clamped() {
        let mut context = instantiate_collision(SceneContext::new(WalkingConfig::default())).unwrap();
        let mut rig = Rig::at(0.0, 100.0, 0.0);
        walking_animation_callback(&mut context, &mut rig, 5.0, true);
        assert_relative_eq!(rig.position.y, 100.0 - 0.5 * 9.81 * 0.01, epsilon = 1e-4);
    }

    #[test]
    fn test_tracker_update_is_idempotent() {
        let (mut context, _floor) = floor_context();
        let lift = MeshGeometry::cuboid(MeshId(7), Vec3::new(2.0, 0.2, 2.0), Transform::identity());
        let meshes: [&dyn CollisionSource; 1] = [&lift];

        context.update_obstacle_boxes(&meshes);
        let first = context.tracker().obstacles().to_vec();
        context.update_obstacle_boxes(&meshes);

        assert_eq!(context.tracker().len(), meshes.len());
        assert_eq!(context.tracker().obstacles()[0].aabb_world, first[0].aabb_world);
        assert_eq!(context.tracker().delta(0), Vec3::zeros());
    }

    #[test]
    fn test_missing_index_fails_open() {
        let (mut context, _floor) = floor_context();
        context.clear_static_index();
        let mut rig = Rig::at(0.0, 0.0, 0.0);

        let outcomes = run(&mut context, &mut rig, 10, 0.05);

        assert_eq!(outcomes.len(), 10);
        assert!(rig.position.y < 0.0);
        assert_eq!(context.player().mode, MovementMode::Airborne);

        context.rebuild_static_index().unwrap();
        assert!(context.static_index().is_some());
    }

    #[test]
    fn test_jump_ignored_while_airborne() {
        let (mut context, _floor) = floor_context();
        let mut rig = Rig::at(0.0, 10.0, 0.0);
        run(&mut context, &mut rig, 2, 0.016);
        assert_eq!(context.player().mode, MovementMode::Airborne);

        context.on_key_down(&KeyEvent::new(KeyCode::Space));
        run(&mut context, &mut rig, 1, 0.016);
        assert!(context.player().velocity.y < 0.0);
        assert!(!context.keys().jump_requested());

        // Land while still holding space: no stored jump fires
        run(&mut context, &mut rig, 200, 0.016);
        assert_relative_eq!(rig.position.y, 0.0);
        assert_eq!(context.player().mode, MovementMode::Grounded);
    }

    #[test]
    fn test_jump_from_ground() {
        let (mut context, _floor) = floor_context();
        let mut rig = Rig::at(0.0, 0.0, 0.0);
        run(&mut context, &mut rig, 2, 0.016);

        context.on_key_down(&KeyEvent::new(KeyCode::Space));
        let peak = run(&mut context, &mut rig, 40, 0.016)
            .iter()
            .map(|o| o.corrected.y)
            .fold(0.0_f32, f32::max);

        // v² / 2g for a 5 m/s jump
        assert!(peak > 1.1 && peak < 1.3);
    }

    #[test]
    fn test_walking_off_the_world() {
        let ledge = MeshGeometry::cuboid(
            MeshId(3),
            Vec3::new(2.0, 1.0, 2.0),
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
        );
        let mut context = instantiate_collision(SceneContext::new(WalkingConfig::default()).with_box_mesh(&ledge)).unwrap();
        let mut rig = Rig::at(0.0, 0.0, 0.0);
        context.on_key_down(&KeyEvent::new(KeyCode::Up));

        let outcomes = run(&mut context, &mut rig, 120, 0.05);

        assert_eq!(outcomes.len(), 120);
        assert!(rig.position.y < -5.0);
        assert_eq!(context.player().mode, MovementMode::Airborne);
    }

    #[test]
    fn test_world_floor_stops_fall() {
        let mut config = WalkingConfig::default();
        config.spatial.world_floor = Some(0.25);
        let mut context = instantiate_collision(SceneContext::new(config)).unwrap();
        let mut rig = Rig::at(3.0, 4.0, 3.0);

        run(&mut context, &mut rig, 100, 0.05);

        assert_relative_eq!(rig.position.y, 0.25);
        assert!(context.player().grounded);
    }

    #[test]
    fn test_world_floor_lifts_player_buried_in_slab() {
        let floor = floor();
        let mut config = WalkingConfig::default();
        config.spatial.world_floor = Some(0.0);
        let mut context = instantiate_collision(SceneContext::new(config).with_box_mesh(&floor)).unwrap();
        // Deeper than the step height, so the slab top is out of reach
        let mut rig = Rig::at(0.0, -0.8, 0.0);

        run(&mut context, &mut rig, 3, 0.016);

        assert_relative_eq!(rig.position.y, 0.0);
        assert!(context.player().grounded);

        let (mut unguarded, _floor) = floor_context();
        let mut sinking = Rig::at(0.0, -0.8, 0.0);
        run(&mut unguarded, &mut sinking, 3, 0.016);
        assert!(sinking.position.y < -0.8);
    }

    #[test]
    fn test_walk_up_triangle_ramp() {
        // Rises 2 m over 8 m towards -Z
        let ramp = MeshGeometry::new(
            MeshId(20),
            vec![
                Vec3::new(-2.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(2.0, 2.0, -8.0),
                Vec3::new(-2.0, 2.0, -8.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
            Transform::identity(),
        );
        let floor = floor();
        let scene = SceneContext::new(WalkingConfig::default())
            .with_box_mesh(&floor)
            .with_triangle_mesh(&ramp);
        let mut context = instantiate_collision(scene).unwrap();
        let mut rig = Rig::at(0.0, 0.0, 1.0);
        run(&mut context, &mut rig, 2, 0.016);

        context.on_key_down(&KeyEvent::new(KeyCode::W));
        run(&mut context, &mut rig, 90, 0.016);

        assert!(rig.position.z < -2.0 && rig.position.z > -8.0);
        assert!(rig.position.y > 0.5);
        assert_relative_eq!(rig.position.y, -rig.position.z * 0.25, epsilon = 0.1);
        assert_eq!(context.player().mode, MovementMode::Grounded);
    }

    #[test]
    fn test_loader_thread_registration_then_rebuild() {
        let (mut context, _floor) = floor_context();
        let before = context.static_index().map_or(0, |index| index.colliders().len());

        let registry = context.registry().clone();
        std::thread::spawn(move || {
            let streamed = MeshGeometry::cuboid(
                MeshId(99),
                Vec3::new(1.0, 1.0, 1.0),
                Transform::from_position(Vec3::new(5.0, 0.5, 5.0)),
            );
            registry.add_obstacle(&streamed);
        })
        .join()
        .unwrap();

        context.rebuild_static_index().unwrap();
        let after = context.static_index().map_or(0, |index| index.colliders().len());
        assert_eq!(after, before + 1);
    }
}
