//! Physics components.
//!
//! [`Body`] and [`Shape`] each own one engine object through an
//! [`Owned`] handle. Inserting one on an entity adds the object to the
//! [`PhysicsWorld`](crate::rapier::PhysicsWorld); removing it (or despawning
//! the entity) takes it out again before the handle frees it.

use bevy_ecs::prelude::*;
use bevy_math::Vec2;

use crate::collision::CollisionCategory;
use crate::handle::Owned;
use crate::rapier::store::{RawBody, RawShape, decode_identity, decode_shape_tag, encode_identity};

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// A rigid body owned by this entity.
///
/// Created with [`PhysicsWorld::create_body`](crate::rapier::PhysicsWorld::create_body).
/// `Body::default()` is a null body; attaching one panics.
#[derive(Component, Debug, Default)]
pub struct Body(pub(crate) Owned<RawBody>);

impl Body {
    pub const fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Borrow the raw engine handle.
    ///
    /// # Panics
    ///
    /// Panics if the body is null.
    #[track_caller]
    pub fn raw(&self) -> &RawBody {
        self.0.raw()
    }

    /// Move ownership out, leaving a null body behind.
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self(self.0.take())
    }

    pub fn position(&self) -> Vec2 {
        self.raw().with(|rb| {
            let t = rb.translation();
            Vec2::new(t.x, t.y)
        })
    }

    pub fn velocity(&self) -> Vec2 {
        self.raw().with(|rb| {
            let v = rb.linvel();
            Vec2::new(v.x, v.y)
        })
    }

    pub fn angle(&self) -> f32 {
        self.raw().with(|rb| rb.rotation().angle())
    }

    pub fn mass(&self) -> f32 {
        self.raw().with(rapier2d::prelude::RigidBody::mass)
    }

    pub fn set_position(&self, position: Vec2) {
        self.raw().with_mut(|rb| {
            rb.set_translation(rapier2d::prelude::Vector::new(position.x, position.y), true);
        });
    }

    pub fn set_velocity(&self, velocity: Vec2) {
        self.raw().with_mut(|rb| {
            rb.set_linvel(rapier2d::prelude::Vector::new(velocity.x, velocity.y), true);
        });
    }

    /// Store `entity` in the body's user-data slot.
    pub fn stamp_identity(&self, entity: Entity) {
        self.raw().with_mut(|rb| rb.user_data = encode_identity(entity));
    }

    /// The entity stamped by [`stamp_identity`](Self::stamp_identity), if any.
    pub fn identity(&self) -> Option<Entity> {
        self.raw().with(|rb| decode_identity(rb.user_data))
    }

    /// Whether the body is currently inserted in its world.
    pub fn is_member(&self) -> bool {
        let raw = self.raw();
        raw.lock().body_is_member(raw.handle)
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Collision geometry owned by this entity.
///
/// The shape is anchored to the body it was created against, which may
/// belong to a different entity. Collisions always resolve to the entity
/// that owns the body.
#[derive(Component, Debug, Default)]
pub struct Shape(pub(crate) Owned<RawShape>);

impl Shape {
    pub const fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Borrow the raw engine handle.
    ///
    /// # Panics
    ///
    /// Panics if the shape is null.
    #[track_caller]
    pub fn raw(&self) -> &RawShape {
        self.0.raw()
    }

    #[must_use]
    pub fn take(&mut self) -> Self {
        Self(self.0.take())
    }

    pub fn category(&self) -> CollisionCategory {
        self.raw()
            .with(|collider, _| CollisionCategory(decode_shape_tag(collider.user_data).0))
    }

    pub fn is_sensor(&self) -> bool {
        self.raw()
            .with(|collider, _| decode_shape_tag(collider.user_data).1)
    }

    pub fn is_member(&self) -> bool {
        let raw = self.raw();
        raw.lock().collider_is_member(raw.handle)
    }

    /// Entity stamped on the body this shape is attached to.
    pub fn body_identity(&self) -> Option<Entity> {
        self.raw().with(|collider, bodies| {
            collider
                .parent()
                .and_then(|parent| bodies.get(parent))
                .and_then(|rb| decode_identity(rb.user_data))
        })
    }

    /// World-space endpoints of a segment or capsule shape.
    pub fn segment_endpoints(&self) -> Option<(Vec2, Vec2)> {
        self.raw().with(|collider, bodies| {
            let shape = collider.shape();
            let segment = shape
                .as_segment()
                .or_else(|| shape.as_capsule().map(|capsule| &capsule.segment))?;

            let (origin, angle) = collider
                .parent()
                .and_then(|parent| bodies.get(parent))
                .map_or((Vec2::ZERO, 0.0), |rb| {
                    let t = rb.translation();
                    (Vec2::new(t.x, t.y), rb.rotation().angle())
                });
            let rotation = Vec2::from_angle(angle);
            let to_world = |x: f32, y: f32| origin + rotation.rotate(Vec2::new(x, y));

            Some((
                to_world(segment.a.x, segment.a.y),
                to_world(segment.b.x, segment.b.y),
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
