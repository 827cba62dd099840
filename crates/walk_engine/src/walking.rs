//! Scene wiring and the per-frame walking callback
//!
//! A [`CollisionContext`] owns everything one scene needs for walking: the
//! obstacle registry, the frozen static index, the moving obstacle tracker,
//! the player and its key state. Hosts build one with
//! [`instantiate_collision`] once the scene's static meshes are placed, then
//! per frame:
//!
//! 1. refresh world matrices of moving meshes
//! 2. [`CollisionContext::update_obstacle_boxes`]
//! 3. [`walking_animation_callback`]

use std::sync::Arc;

use log::{debug, info, trace};

use crate::core::config::WalkingConfig;
use crate::debug::CollisionDebugReport;
use crate::foundation::math::Vec3;
use crate::input::{on_key_down_walking, on_key_up_walking, KeyEvent, KeyState};
use crate::physics::{
    update_obstacle_boxes, CollisionError, CollisionOutcome, CollisionSource, CollisionWorld, MovingObstacleTracker,
    ObstacleRegistry, SharedObstacleRegistry, StaticIndex,
};
use crate::player::{PlayerController, PlayerState};

/// Host object the player drives (usually the camera rig)
pub trait ControlsObject {
    /// Feet position
    fn position(&self) -> Vec3;
    /// Move the object
    fn set_position(&mut self, position: Vec3);
    /// Heading around +Y
    fn yaw(&self) -> f32;
    /// Turn the object
    fn set_yaw(&mut self, yaw: f32);
}

/// Static geometry handed over at scene creation
pub struct SceneContext<'a> {
    /// Tuning for this scene
    pub config: WalkingConfig,
    /// Registry that may already hold obstacles from loader threads
    pub registry: SharedObstacleRegistry,
    /// Meshes registered as one box each
    pub box_meshes: Vec<&'a dyn CollisionSource>,
    /// Meshes registered triangle by triangle
    pub triangle_meshes: Vec<&'a dyn CollisionSource>,
}

impl<'a> SceneContext<'a> {
    /// Empty scene with its own registry
    pub fn new(config: WalkingConfig) -> Self {
        let registry = SharedObstacleRegistry::new(ObstacleRegistry::new(config.spatial.max_triangle_height));
        Self {
            config,
            registry,
            box_meshes: Vec::new(),
            triangle_meshes: Vec::new(),
        }
    }

    /// Use a registry that loaders are already filling
    pub fn with_registry(mut self, registry: SharedObstacleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Add a mesh to be boxed
    pub fn with_box_mesh(mut self, mesh: &'a dyn CollisionSource) -> Self {
        self.box_meshes.push(mesh);
        self
    }

    /// Add a mesh to be split into triangles
    pub fn with_triangle_mesh(mut self, mesh: &'a dyn CollisionSource) -> Self {
        self.triangle_meshes.push(mesh);
        self
    }
}

/// Per-scene walking state
#[derive(Debug)]
pub struct CollisionContext {
    config: WalkingConfig,
    registry: SharedObstacleRegistry,
    statics: Option<Arc<StaticIndex>>,
    tracker: MovingObstacleTracker,
    controller: PlayerController,
    player: PlayerState,
    keys: KeyState,
}

impl CollisionContext {
    /// Context with no static index yet; queries fail open until one is built
    pub fn new(config: WalkingConfig, registry: SharedObstacleRegistry) -> Result<Self, CollisionError> {
        config.validate()?;
        Ok(Self {
            controller: PlayerController::from_config(&config),
            player: PlayerState::new(config.start_position),
            config,
            registry,
            statics: None,
            tracker: MovingObstacleTracker::new(),
            keys: KeyState::new(),
        })
    }

    /// Freeze the registry's current contents into a fresh static index
    ///
    /// Used after late meshes were registered. The previous index stays in
    /// place if the build fails.
    pub fn rebuild_static_index(&mut self) -> Result<(), CollisionError> {
        let index = self.registry.build_index(self.config.spatial.cell_size)?;
        let report = CollisionDebugReport::from_index(&index);
        report.log();
        self.statics = Some(Arc::new(index));
        Ok(())
    }

    /// Drop the static index; queries fail open
    pub fn clear_static_index(&mut self) {
        self.statics = None;
    }

    /// Current static index
    pub fn static_index(&self) -> Option<&Arc<StaticIndex>> {
        self.statics.as_ref()
    }

    /// Recompute moving obstacle boxes from refreshed world matrices
    pub fn update_obstacle_boxes(&mut self, moving_meshes: &[&dyn CollisionSource]) {
        update_obstacle_boxes(moving_meshes, &mut self.tracker);
    }

    /// Moving obstacle tracker
    pub fn tracker(&self) -> &MovingObstacleTracker {
        &self.tracker
    }

    /// Shared registry
    pub fn registry(&self) -> &SharedObstacleRegistry {
        &self.registry
    }

    /// Player state
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// Key state
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    /// Forward a host key-down event
    pub fn on_key_down(&mut self, event: &KeyEvent) -> bool {
        on_key_down_walking(event, &mut self.keys)
    }

    /// Forward a host key-up event
    pub fn on_key_up(&mut self, event: &KeyEvent) -> bool {
        on_key_up_walking(event, &mut self.keys)
    }

    fn step_player(&mut self, elapsed_seconds: f32) -> Option<CollisionOutcome> {
        let world = CollisionWorld {
            statics: self.statics.as_deref(),
            moving: self.tracker.obstacles(),
            world_floor: self.config.spatial.world_floor,
        };
        self.controller
            .step(&mut self.player, &mut self.keys, elapsed_seconds, &world)
    }
}

/// Register a scene's static meshes and build its index
pub fn instantiate_collision(scene: SceneContext<'_>) -> Result<CollisionContext, CollisionError> {
    let SceneContext {
        config,
        registry,
        box_meshes,
        triangle_meshes,
    } = scene;

    let mut context = CollisionContext::new(config, registry)?;
    {
        let mut registry = context.registry.write();
        for mesh in &box_meshes {
            registry.add_obstacle(*mesh);
        }
        for mesh in &triangle_meshes {
            registry.extract_per_triangle(*mesh);
        }
    }
    context.rebuild_static_index()?;

    info!(
        "Walking collision ready: {} box meshes, {} triangle meshes, {} colliders",
        box_meshes.len(),
        triangle_meshes.len(),
        context.registry.read().len()
    );
    Ok(context)
}

/// Advance the player one frame and write the result to `controls`
///
/// The host object's position and heading are read first, so teleports done
/// by the host are respected. Disabled walking and invalid frame times leave
/// everything untouched.
pub fn walking_animation_callback(
    context: &mut CollisionContext,
    controls: &mut dyn ControlsObject,
    elapsed_seconds: f32,
    enabled: bool,
) -> Option<CollisionOutcome> {
    if !enabled {
        return None;
    }

    let position = controls.position();
    if position != context.player.position {
        debug!("Player moved by host to {:?}", position);
        context.player.position = position;
    }
    context.player.yaw = controls.yaw();

    let outcome = context.step_player(elapsed_seconds)?;
    controls.set_position(context.player.position);
    controls.set_yaw(context.player.yaw);
    trace!("Player at {:?} ({:?})", context.player.position, context.player.mode);
    Some(outcome)
}
