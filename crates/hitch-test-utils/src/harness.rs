//! [`SimHarness`]: a physics test app that shuts down cleanly on drop.

use bevy_app::App;
use bevy_ecs::prelude::*;
use hitch_core::config::PhysicsConfig;
use hitch_physics::desc::{BodyDesc, ShapeDesc};
use hitch_physics::rapier::PhysicsWorld;

use crate::app::physics_test_app_with;
use crate::spawn;

/// Owns a rapier test app and ticks it.
///
/// Dropping the harness runs [`hitch_physics::shutdown`], so tests may
/// leave bodies attached when they finish.
pub struct SimHarness {
    app: App,
}

impl SimHarness {
    /// Fixed `1/60 s` steps, no gravity.
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::fixed(1.0 / 60.0))
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            app: physics_test_app_with(config),
        }
    }

    pub const fn app(&self) -> &App {
        &self.app
    }

    pub const fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn physics(&self) -> &PhysicsWorld {
        self.world().resource::<PhysicsWorld>()
    }

    pub fn physics_mut(&mut self) -> Mut<'_, PhysicsWorld> {
        self.world_mut().resource_mut::<PhysicsWorld>()
    }

    /// Run one full app update.
    pub fn tick(&mut self) {
        self.app.update();
    }

    /// Run `ticks` app updates.
    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Tick until `done` holds, at most `max_ticks` times.
    ///
    /// Returns the number of ticks taken, or `None` if `done` never held.
    pub fn run_until(&mut self, max_ticks: usize, mut done: impl FnMut(&World) -> bool) -> Option<usize> {
        for tick in 1..=max_ticks {
            self.tick();
            if done(self.world()) {
                return Some(tick);
            }
        }
        None
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world().get_entity(entity).is_ok()
    }

    pub fn spawn_body(&mut self, desc: &BodyDesc) -> Entity {
        spawn::spawn_body(self.world_mut(), desc)
    }

    pub fn spawn_with_shape(&mut self, body: &BodyDesc, shape: &ShapeDesc) -> Entity {
        spawn::spawn_with_shape(self.world_mut(), body, shape)
    }

    pub fn spawn_static_shape(&mut self, desc: &ShapeDesc) -> Entity {
        spawn::spawn_static_shape(self.world_mut(), desc)
    }
}

impl Default for SimHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimHarness {
    fn drop(&mut self) {
        // A failed assertion already unwinds; a second panic would abort.
        if std::thread::panicking() {
            return;
        }
        hitch_physics::shutdown(self.app.world_mut());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
