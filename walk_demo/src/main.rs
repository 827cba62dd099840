//! Headless Walking Demo
//!
//! Runs two scripted scenes through the walking collision engine and logs the
//! player track:
//! - Street: tiled triangle ground, a ramp, scattered crates and buildings,
//!   plus a wall streamed in from a loader thread mid-run
//! - Elevator: a lift that carries the player from the ground floor up to a
//!   walkway at 90 m
//!
//! Usage: `walk_demo [config.toml|config.ron]`

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use walk_engine::foundation::logging;
use walk_engine::prelude::*;

// Street layout
const STREET_HALF_EXTENT: i32 = 10;
const TILE_SIZE: f32 = 2.0;
const NUM_CRATES: usize = 12;
const NUM_BUILDINGS: usize = 6;

// Elevator layout
const LIFT_SIZE: f32 = 4.0;
const LIFT_THICKNESS: f32 = 0.4;
const LIFT_FLOOR_Y: f32 = 0.2;
const WALKWAY_Y: f32 = 90.0;

// Simulated 60 Hz host with an occasional stall
const FRAME_MS: f64 = 1000.0 / 60.0;
const STALL_EVERY: u64 = 97;
const STALL_MS: f64 = 750.0;

/// Camera rig the player drives
#[derive(Debug, Clone, Copy, Default)]
struct CameraRig {
    position: Vec3,
    yaw: f32,
}

impl ControlsObject for CameraRig {
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

/// Scripted key press/release at a given frame
struct KeyCue {
    frame: u64,
    code: KeyCode,
    down: bool,
}

const fn cue(frame: u64, code: KeyCode, down: bool) -> KeyCue {
    KeyCue { frame, code, down }
}

/// Feeds scripted cues into the context
struct KeyScript {
    cues: Vec<KeyCue>,
}

impl KeyScript {
    fn apply(&self, frame: u64, context: &mut CollisionContext) {
        for c in self.cues.iter().filter(|c| c.frame == frame) {
            let event = KeyEvent::new(c.code);
            if c.down {
                context.on_key_down(&event);
            } else {
                context.on_key_up(&event);
            }
        }
    }
}

/// Host frame timestamps, with a long stall every so often
struct HostTimeline {
    clock: FrameClock,
    now_ms: f64,
}

impl HostTimeline {
    fn new(max_delta: f32) -> Self {
        Self {
            clock: FrameClock::new(max_delta),
            now_ms: 0.0,
        }
    }

    fn next_delta(&mut self) -> f32 {
        let frame = self.clock.frame_count();
        self.now_ms += if frame > 0 && frame % STALL_EVERY == 0 { STALL_MS } else { FRAME_MS };
        self.clock.tick(self.now_ms)
    }
}

fn flat_tile(id: u64, x: f32, z: f32, y: f32) -> MeshGeometry {
    let h = TILE_SIZE * 0.5;
    MeshGeometry::non_indexed(
        MeshId(id),
        vec![
            Vec3::new(-h, 0.0, -h),
            Vec3::new(h, 0.0, h),
            Vec3::new(h, 0.0, -h),
            Vec3::new(-h, 0.0, -h),
            Vec3::new(-h, 0.0, h),
            Vec3::new(h, 0.0, h),
        ],
        Transform::from_position(Vec3::new(x, y, z)),
    )
}

fn ramp(id: u64) -> MeshGeometry {
    MeshGeometry::new(
        MeshId(id),
        vec![
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.5, -6.0),
            Vec3::new(-2.0, 1.5, -6.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
        Transform::from_position(Vec3::new(6.0, 0.0, 4.0)),
    )
}

fn scatter_boxes(rng: &mut StdRng, first_id: u64, count: usize, size: (f32, f32)) -> Vec<MeshGeometry> {
    (0..count)
        .map(|i| {
            let extent = rng.gen_range(size.0..size.1);
            let height = rng.gen_range(size.0..size.1 * 2.0);
            // Keep the walking lane along x = 0 clear
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let x = side * rng.gen_range(3.0..18.0);
            let z = rng.gen_range(-18.0..18.0);
            MeshGeometry::cuboid(
                MeshId(first_id + i as u64),
                Vec3::new(extent, height, extent),
                Transform::from_position(Vec3::new(x, height * 0.5, z)),
            )
        })
        .collect()
}

fn run_street(config: &WalkingConfig) -> Result<(), CollisionError> {
    log::info!("--- Street scene ---");
    let mut rng = StdRng::seed_from_u64(7);

    let mut tiles = Vec::new();
    let mut id = 100;
    for ix in -STREET_HALF_EXTENT..STREET_HALF_EXTENT {
        for iz in -STREET_HALF_EXTENT..STREET_HALF_EXTENT {
            // Kerb row along x = 4 is raised a little
            let y = if ix == 2 { 0.15 } else { 0.0 };
            tiles.push(flat_tile(id, (ix as f32 + 0.5) * TILE_SIZE, (iz as f32 + 0.5) * TILE_SIZE, y));
            id += 1;
        }
    }
    let ramp = ramp(id);
    let crates = scatter_boxes(&mut rng, 1_000, NUM_CRATES, (0.3, 0.8));
    let buildings = scatter_boxes(&mut rng, 2_000, NUM_BUILDINGS, (3.0, 6.0));

    let mut scene = SceneContext::new(config.clone()).with_triangle_mesh(&ramp);
    for tile in &tiles {
        scene = scene.with_triangle_mesh(tile);
    }
    for mesh in crates.iter().chain(&buildings) {
        scene = scene.with_box_mesh(mesh);
    }
    let mut context = instantiate_collision(scene)?;

    // Loader thread streams a wall in while the player is already walking
    let registry = context.registry().clone();
    let (loaded_tx, loaded_rx) = mpsc::channel();
    let loader = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        let wall = MeshGeometry::cuboid(
            MeshId(9_000),
            Vec3::new(6.0, 3.0, 0.5),
            Transform::from_position(Vec3::new(0.0, 1.5, -14.0)),
        );
        let added = registry.add_obstacle(&wall);
        let _ = loaded_tx.send(added);
    });

    let script = KeyScript {
        cues: vec![
            cue(0, KeyCode::W, true),
            cue(90, KeyCode::Space, true),
            cue(95, KeyCode::Space, false),
            cue(240, KeyCode::LeftShift, true),
            cue(240, KeyCode::A, true),
            cue(300, KeyCode::A, false),
            cue(300, KeyCode::LeftShift, false),
            cue(300, KeyCode::D, true),
            cue(420, KeyCode::D, false),
            cue(480, KeyCode::W, false),
        ],
    };

    let mut rig = CameraRig {
        position: config.start_position,
        yaw: 0.0,
    };
    let mut timeline = HostTimeline::new(config.movement.max_frame_delta);
    let mut loader = Some(loader);

    for frame in 0..540 {
        if let Ok(added) = loaded_rx.try_recv() {
            log::info!("Streamed mesh arrived (registered: {}), rebuilding index", added);
            context.rebuild_static_index()?;
            if let Some(handle) = loader.take() {
                let _ = handle.join();
            }
        }

        script.apply(frame, &mut context);
        let dt = timeline.next_delta();
        context.update_obstacle_boxes(&[]);
        let outcome = walking_animation_callback(&mut context, &mut rig, dt, true);

        if frame % 30 == 0 {
            log::info!(
                "frame {:3} pos ({:6.2}, {:5.2}, {:6.2}) yaw {:5.2} {:?}",
                frame,
                rig.position.x,
                rig.position.y,
                rig.position.z,
                rig.yaw,
                context.player().mode
            );
        }
        if let Some(outcome) = outcome {
            if outcome.blocked.x || outcome.blocked.z {
                log::debug!("frame {} blocked {:?}", frame, outcome.blocked);
            }
        }
    }

    if let Some(index) = context.static_index() {
        log::info!("{}", CollisionDebugReport::from_index(index));
    }
    Ok(())
}

fn run_elevator(config: &WalkingConfig) -> Result<(), CollisionError> {
    log::info!("--- Elevator scene ---");
    let ground = MeshGeometry::cuboid(
        MeshId(1),
        Vec3::new(60.0, 1.0, 60.0),
        Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
    );
    let walkway = MeshGeometry::cuboid(
        MeshId(2),
        Vec3::new(20.0, 1.0, 16.0),
        Transform::from_position(Vec3::new(0.0, WALKWAY_Y - 0.5, -LIFT_SIZE * 0.5 - 8.0)),
    );
    let mut lift_mesh = MeshGeometry::cuboid(
        MeshId(3),
        Vec3::new(LIFT_SIZE, LIFT_THICKNESS, LIFT_SIZE),
        Transform::from_position(Vec3::new(0.0, LIFT_FLOOR_Y - LIFT_THICKNESS * 0.5, 0.0)),
    );
    let mut lift = PlatformLift::new(LIFT_FLOOR_Y, WALKWAY_Y);

    let scene = SceneContext::new(config.clone())
        .with_box_mesh(&ground)
        .with_box_mesh(&walkway);
    let mut context = instantiate_collision(scene)?;

    let mut rig = CameraRig {
        position: Vec3::new(0.0, 1.0, 0.0),
        yaw: 0.0,
    };
    let mut timeline = HostTimeline::new(config.movement.max_frame_delta);
    let mut walked_off = false;

    for frame in 0..900_u64 {
        let dt = timeline.next_delta();
        let riding = matches!(context.player().mode, MovementMode::Riding { platform: 0 });
        let height = lift.update(dt, riding);
        lift_mesh.transform.position.y = height - LIFT_THICKNESS * 0.5;
        context.update_obstacle_boxes(&[&lift_mesh as &dyn CollisionSource]);

        if lift.state() == LiftState::Up && !walked_off {
            log::info!("Lift arrived at frame {}, walking onto the walkway", frame);
            context.on_key_down(&KeyEvent::new(KeyCode::W));
            walked_off = true;
        }

        walking_animation_callback(&mut context, &mut rig, dt, true);

        if frame % 60 == 0 {
            log::info!(
                "frame {:3} lift {:5.2} ({:?}) player y {:5.2} {:?}",
                frame,
                lift.height(),
                lift.state(),
                rig.position.y,
                context.player().mode
            );
        }
    }

    log::info!(
        "Elevator done: player at ({:.2}, {:.2}, {:.2})",
        rig.position.x,
        rig.position.y,
        rig.position.z
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => WalkingConfig::load_from_file(&path)?,
        None => WalkingConfig::default(),
    };

    let level = config
        .engine
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Info);
    logging::init(level);

    config.validate()?;

    println!("=== Walking Collision Demo (headless) ===");
    run_street(&config)?;
    run_elevator(&config)?;
    Ok(())
}
