//! Observers that keep [`PhysicsWorld`] membership in step with components.
//!
//! Inserting a [`Body`] or [`Shape`] adds it to the world. Removing it,
//! replacing it or despawning its entity removes it before the component
//! value is dropped, so the handle is always out of the world by the time it
//! is released.

use bevy_ecs::prelude::*;
use bevy_log::{debug, info};

use crate::components::{Body, Shape};
use crate::rapier::PhysicsWorld;

/// Stamp the entity's identity on its new body and start simulating it.
///
/// # Panics
///
/// Panics if no [`PhysicsWorld`] exists, the body is null, or it is already
/// in the world.
pub fn attach_body(
    insert: On<Insert, Body>,
    bodies: Query<&Body>,
    physics: Option<ResMut<PhysicsWorld>>,
) {
    let entity = insert.entity;
    let Ok(body) = bodies.get(entity) else {
        return;
    };
    let Some(mut physics) = physics else {
        panic!("Body attached to {entity} without a PhysicsWorld resource");
    };
    body.stamp_identity(entity);
    physics.add_body(body);
    debug!("attached body {:?} to {entity}", body.raw());
}

/// Stop simulating a body that is about to leave its entity.
pub fn detach_body(
    replace: On<Replace, Body>,
    bodies: Query<&Body>,
    physics: Option<ResMut<PhysicsWorld>>,
) {
    let entity = replace.entity;
    let (Ok(body), Some(mut physics)) = (bodies.get(entity), physics) else {
        return;
    };
    if body.is_null() {
        return;
    }
    physics.remove_body(body);
    debug!("detached body {:?} from {entity}", body.raw());
}

/// Start simulating a newly attached shape.
///
/// # Panics
///
/// Panics if no [`PhysicsWorld`] exists, the shape is null, or it is already
/// in the world.
pub fn attach_shape(
    insert: On<Insert, Shape>,
    shapes: Query<&Shape>,
    physics: Option<ResMut<PhysicsWorld>>,
) {
    let entity = insert.entity;
    let Ok(shape) = shapes.get(entity) else {
        return;
    };
    let Some(mut physics) = physics else {
        panic!("Shape attached to {entity} without a PhysicsWorld resource");
    };
    physics.add_shape(shape);
    debug!("attached shape {:?} to {entity}", shape.raw());
}

/// Stop simulating a shape that is about to leave its entity.
pub fn detach_shape(
    replace: On<Replace, Shape>,
    shapes: Query<&Shape>,
    physics: Option<ResMut<PhysicsWorld>>,
) {
    let entity = replace.entity;
    let (Ok(shape), Some(mut physics)) = (shapes.get(entity), physics) else {
        return;
    };
    if shape.is_null() {
        return;
    }
    physics.remove_shape(shape);
    debug!("detached shape {:?} from {entity}", shape.raw());
}

/// Detach every shape and body, then destroy the [`PhysicsWorld`].
///
/// Dropping a `World` does not run observers, so an app that still holds
/// attached bodies must call this before it is dropped.
pub fn shutdown(world: &mut World) {
    let shapes: Vec<Entity> = world
        .query_filtered::<Entity, With<Shape>>()
        .iter(world)
        .collect();
    for entity in &shapes {
        world.entity_mut(*entity).remove::<Shape>();
    }

    let bodies: Vec<Entity> = world
        .query_filtered::<Entity, With<Body>>()
        .iter(world)
        .collect();
    for entity in &bodies {
        world.entity_mut(*entity).remove::<Body>();
    }

    if world.remove_resource::<PhysicsWorld>().is_some() {
        info!(
            "physics shut down ({} bodies, {} shapes released)",
            bodies.len(),
            shapes.len()
        );
    }
}
