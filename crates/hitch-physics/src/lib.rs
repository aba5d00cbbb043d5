// hitch-physics: rapier2d bodies and shapes bound to bevy_ecs entities.
//
// Bodies and shapes are created from a `PhysicsWorld` resource and owned by
// components. Attaching a component inserts the engine object into the world
// and detaching it removes the object again, so every handle is released
// exactly once and never while the engine still simulates it. Pair-begin
// handlers registered per collision category turn contacts into per-tick
// `Collisions` relations.

pub mod backend;
pub mod collision;
pub mod components;
pub mod desc;
pub mod handle;
pub mod lifecycle;
pub mod plugin;
pub mod rapier;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        backend::PhysicsBackend,
        collision::{CollisionBegin, CollisionCategory, CollisionPolicy, Collisions},
        components::{Body, Shape},
        desc::{BodyDesc, BodyKind, Geometry, ShapeDesc},
        lifecycle::shutdown,
        plugin::HitchPhysicsPlugin,
        rapier::{PhysicsWorld, RapierBackend},
    };
}

// Re-export the common entry points at crate root for convenience.
pub use lifecycle::shutdown;
pub use plugin::HitchPhysicsPlugin;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
