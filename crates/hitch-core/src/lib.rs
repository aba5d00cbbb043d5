// hitch-core: System ordering, simulation clock, config and errors for hitch.

pub mod config;
pub mod error;
pub mod time;

use bevy_app::{App, Last, Plugin, PreUpdate, Update};
use bevy_ecs::prelude::*;

use config::PhysicsConfig;
use time::SimTime;

// ---------------------------------------------------------------------------
// HitchSet
// ---------------------------------------------------------------------------

/// Per-tick ordering of the physics bridge.
///
/// `Step` and `Collide` run chained in `PreUpdate`, so gameplay systems in
/// `Update` always observe post-step positions. Consumers live in `React`
/// and leftover relations are dropped in `Cleanup` on `Last`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitchSet {
    /// Advance the physics world.
    Step,
    /// Turn buffered pair-begin relations into components.
    Collide,
    /// React to collision relations.
    React,
    /// Clear relations that were not consumed this tick.
    Cleanup,
}

// ---------------------------------------------------------------------------
// HitchCorePlugin
// ---------------------------------------------------------------------------

/// Configures [`HitchSet`] ordering and inserts [`SimTime`].
///
/// A [`PhysicsConfig`] already present in the app is kept; otherwise the
/// default is inserted.
pub struct HitchCorePlugin;

impl Plugin for HitchCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimTime>()
            .init_resource::<PhysicsConfig>()
            .configure_sets(PreUpdate, (HitchSet::Step, HitchSet::Collide).chain())
            .configure_sets(Update, HitchSet::React)
            .configure_sets(Last, HitchSet::Cleanup);
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        HitchCorePlugin, HitchSet,
        config::{PhysicsConfig, Timestep},
        error::{ConfigError, HitchError, PhysicsError},
        time::SimTime,
    };
}
