//! [`RapierBackend`]: concrete physics backend using raw `rapier2d`.

use bevy_app::{App, PreUpdate};
use bevy_ecs::prelude::*;
use bevy_log::error;

use hitch_core::HitchSet;
use hitch_core::config::PhysicsConfig;

use crate::backend::PhysicsBackend;

use super::systems::step_world;
use super::world::PhysicsWorld;

/// Insert the [`PhysicsWorld`] resource built from the app's [`PhysicsConfig`].
fn insert_physics_world(app: &mut App) {
    let config = app
        .world()
        .get_resource::<PhysicsConfig>()
        .cloned()
        .unwrap_or_default();
    if let Err(err) = config.validate() {
        error!("invalid physics config: {err}");
    }
    app.insert_resource(PhysicsWorld::new(&config));
}

/// Raw rapier2d physics backend.
///
/// Inserts a [`PhysicsWorld`] resource and registers the physics step system
/// in [`HitchSet::Step`] on the `PreUpdate` schedule.
/// Reads gravity, timestep and substeps from [`PhysicsConfig`].
pub struct RapierBackend;

impl PhysicsBackend for RapierBackend {
    fn build(&self, app: &mut App) {
        insert_physics_world(app);
        app.add_systems(PreUpdate, step_world.in_set(HitchSet::Step));
    }

    fn name(&self) -> &str {
        "rapier2d"
    }
}
