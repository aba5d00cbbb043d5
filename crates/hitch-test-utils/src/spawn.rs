//! Entity spawn helpers for tests.

use bevy_ecs::prelude::*;
use hitch_physics::components::{Body, Shape};
use hitch_physics::desc::{BodyDesc, ShapeDesc};
use hitch_physics::rapier::PhysicsWorld;

/// Spawn an entity owning a new body.
///
/// # Panics
///
/// Panics if the world has no [`PhysicsWorld`] or the description is invalid.
pub fn spawn_body(world: &mut World, desc: &BodyDesc) -> Entity {
    let body = world
        .resource::<PhysicsWorld>()
        .create_body(desc)
        .expect("invalid body fixture");
    world.spawn(body).id()
}

/// Spawn an entity owning a new body and one shape attached to it.
///
/// The body is attached before the shape.
///
/// # Panics
///
/// Panics if the world has no [`PhysicsWorld`] or a description is invalid.
pub fn spawn_with_shape(world: &mut World, body: &BodyDesc, shape: &ShapeDesc) -> Entity {
    let entity = spawn_body(world, body);
    let shape = {
        let body = world.get::<Body>(entity).expect("body was just attached");
        world
            .resource::<PhysicsWorld>()
            .create_shape(body, shape)
            .expect("invalid shape fixture")
    };
    world.entity_mut(entity).insert(shape);
    entity
}

/// Spawn an entity owning a shape on the world's static anchor.
///
/// # Panics
///
/// Panics if the world has no [`PhysicsWorld`] or the description is invalid.
pub fn spawn_static_shape(world: &mut World, desc: &ShapeDesc) -> Entity {
    let shape: Shape = world
        .resource::<PhysicsWorld>()
        .create_static_shape(desc)
        .expect("invalid shape fixture");
    world.spawn(shape).id()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
