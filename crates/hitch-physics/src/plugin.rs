//! The main physics plugin that delegates to a concrete backend.

use bevy_app::{App, Last, Plugin, PreUpdate, Update};
use bevy_ecs::prelude::*;

use hitch_core::{HitchCorePlugin, HitchSet};

use crate::backend::PhysicsBackend;
use crate::collision::{CollisionPolicy, apply_collisions, clear_collisions, react_to_collisions};
use crate::lifecycle::{attach_body, attach_shape, detach_body, detach_shape};

/// Bevy plugin that wires a [`PhysicsBackend`] into the app.
///
/// # Usage
///
/// ```ignore
/// app.add_plugins(HitchPhysicsPlugin::new(RapierBackend));
/// ```
///
/// The backend's [`build`](PhysicsBackend::build) inserts the world and its
/// step system. The plugin itself registers the attach/detach observers and
/// the collision systems in [`HitchSet::Collide`], [`HitchSet::React`] and
/// [`HitchSet::Cleanup`]. [`HitchCorePlugin`] is added if missing.
pub struct HitchPhysicsPlugin {
    backend: Box<dyn PhysicsBackend>,
}

impl HitchPhysicsPlugin {
    /// Create a new physics plugin with the given backend.
    pub fn new(backend: impl PhysicsBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// The name of the active physics backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

impl Plugin for HitchPhysicsPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<HitchCorePlugin>() {
            app.add_plugins(HitchCorePlugin);
        }
        app.init_resource::<CollisionPolicy>();

        self.backend.build(app);

        app.add_observer(attach_body)
            .add_observer(detach_body)
            .add_observer(attach_shape)
            .add_observer(detach_shape)
            .add_systems(PreUpdate, apply_collisions.in_set(HitchSet::Collide))
            .add_systems(Update, react_to_collisions.in_set(HitchSet::React))
            .add_systems(Last, clear_collisions.in_set(HitchSet::Cleanup));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
