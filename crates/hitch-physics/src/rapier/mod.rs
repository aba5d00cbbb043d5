//! Raw `rapier2d` physics backend.
//!
//! This module implements [`PhysicsBackend`](crate::backend::PhysicsBackend)
//! using the `rapier2d` crate directly (not `bevy_rapier2d`). We own the
//! [`PhysicsPipeline`](rapier2d::pipeline::PhysicsPipeline), call `step()`
//! ourselves, and route pair-begin notifications through its contact
//! modification hook.

pub mod backend;
mod hooks;
pub mod store;
pub mod systems;
pub mod world;

pub use backend::RapierBackend;
pub use world::PhysicsWorld;
