//! The [`PhysicsWorld`] singleton resource.

use std::sync::Arc;

use bevy_ecs::entity::Entity;
use bevy_ecs::prelude::Resource;
use bevy_log::debug;
use bevy_math::Vec2;
use hitch_core::config::PhysicsConfig;
use hitch_core::error::PhysicsError;
use rapier2d::prelude::Vector;

use crate::collision::{CollisionBegin, CollisionCategory, CollisionHandlers};
use crate::components::{Body, Shape};
use crate::desc::{BodyDesc, ShapeDesc};
use crate::handle::Owned;

use super::hooks::BeginDispatch;
use super::store::{RawBody, RawShape, RawWorld, SharedStore, SimStore};

/// The simulation world, published as a bevy resource.
///
/// Owns the engine world and the registered pair-begin handlers. Bodies and
/// shapes are created here but owned by whoever holds the returned
/// [`Body`]/[`Shape`]; the world only tracks their membership.
///
/// Every mutating method asserts that the handle it is given belongs to this
/// world and that membership actually changes; violating either is a
/// programmer error.
#[derive(Resource)]
pub struct PhysicsWorld {
    world: Owned<RawWorld>,
    handlers: CollisionHandlers,
    relations: Vec<(Entity, Entity)>,
}

impl PhysicsWorld {
    /// Create a world using the gravity from `config`.
    pub fn new(config: &PhysicsConfig) -> Self {
        let [gx, gy] = config.gravity;
        Self {
            world: Owned::new(RawWorld::new(Vector::new(gx, gy))),
            handlers: CollisionHandlers::default(),
            relations: Vec::new(),
        }
    }

    fn store(&self) -> &SharedStore {
        &self.world.raw().store
    }

    fn lock(&self) -> parking_lot::MutexGuard<'_, SimStore> {
        self.world.raw().lock()
    }

    fn owns(&self, store: &SharedStore) -> bool {
        Arc::ptr_eq(self.store(), store)
    }

    // -- Gravity --

    pub fn gravity(&self) -> Vec2 {
        let gravity = self.lock().gravity;
        Vec2::new(gravity.x, gravity.y)
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.lock().gravity = Vector::new(gravity.x, gravity.y);
    }

    // -- Creation --

    /// Create a body that is not yet simulated. Insert it with
    /// [`add_body`](Self::add_body), usually by attaching it to an entity.
    pub fn create_body(&self, desc: &BodyDesc) -> Result<Body, PhysicsError> {
        desc.validate()?;
        let handle = self.lock().insert_body(desc);
        Ok(Body(Owned::new(RawBody {
            store: Arc::clone(self.store()),
            handle,
        })))
    }

    /// Create a shape attached to `body`.
    pub fn create_shape(&self, body: &Body, desc: &ShapeDesc) -> Result<Shape, PhysicsError> {
        desc.validate()?;
        let raw_body = body.raw();
        if !self.owns(&raw_body.store) {
            return Err(PhysicsError::ForeignHandle);
        }
        let handle = self.lock().insert_collider(raw_body.handle, desc);
        Ok(Shape(Owned::new(RawShape {
            store: Arc::clone(self.store()),
            handle,
        })))
    }

    /// Create a shape attached to the world's static anchor, for level geometry.
    pub fn create_static_shape(&self, desc: &ShapeDesc) -> Result<Shape, PhysicsError> {
        desc.validate()?;
        let handle = {
            let mut store = self.lock();
            let anchor = store.anchor;
            store.insert_collider(anchor, desc)
        };
        Ok(Shape(Owned::new(RawShape {
            store: Arc::clone(self.store()),
            handle,
        })))
    }

    // -- Membership --

    /// Start simulating `body`.
    ///
    /// # Panics
    ///
    /// Panics if `body` is null, belongs to another world or is already inserted.
    #[track_caller]
    pub fn add_body(&mut self, body: &Body) {
        let raw = self.check_owned_body(body);
        let mut store = self.lock();
        let rb = store
            .bodies
            .get_mut(raw.handle)
            .unwrap_or_else(|| panic!("body {raw:?} missing from its store"));
        assert!(!rb.is_enabled(), "body {raw:?} is already in the world");
        rb.set_enabled(true);
    }

    /// Stop simulating `body`.
    ///
    /// # Panics
    ///
    /// Panics if `body` is null, belongs to another world or is not inserted.
    #[track_caller]
    pub fn remove_body(&mut self, body: &Body) {
        let raw = self.check_owned_body(body);
        let mut store = self.lock();
        let rb = store
            .bodies
            .get_mut(raw.handle)
            .unwrap_or_else(|| panic!("body {raw:?} missing from its store"));
        assert!(rb.is_enabled(), "body {raw:?} is not in the world");
        rb.set_enabled(false);
    }

    pub fn contains_body(&self, body: &Body) -> bool {
        body.0
            .get()
            .is_some_and(|raw| self.owns(&raw.store) && self.lock().body_is_member(raw.handle))
    }

    /// Start simulating `shape`.
    ///
    /// # Panics
    ///
    /// Panics if `shape` is null, belongs to another world or is already inserted.
    #[track_caller]
    pub fn add_shape(&mut self, shape: &Shape) {
        let raw = self.check_owned_shape(shape);
        let mut store = self.lock();
        let collider = store
            .colliders
            .get_mut(raw.handle)
            .unwrap_or_else(|| panic!("shape {raw:?} missing from its store"));
        assert!(!collider.is_enabled(), "shape {raw:?} is already in the world");
        collider.set_enabled(true);
    }

    /// Stop simulating `shape`.
    ///
    /// # Panics
    ///
    /// Panics if `shape` is null, belongs to another world or is not inserted.
    #[track_caller]
    pub fn remove_shape(&mut self, shape: &Shape) {
        let raw = self.check_owned_shape(shape);
        let mut store = self.lock();
        let collider = store
            .colliders
            .get_mut(raw.handle)
            .unwrap_or_else(|| panic!("shape {raw:?} missing from its store"));
        assert!(collider.is_enabled(), "shape {raw:?} is not in the world");
        collider.set_enabled(false);
    }

    pub fn contains_shape(&self, shape: &Shape) -> bool {
        shape.0
            .get()
            .is_some_and(|raw| self.owns(&raw.store) && self.lock().collider_is_member(raw.handle))
    }

    /// Number of bodies and shapes currently inserted.
    pub fn member_count(&self) -> usize {
        self.lock().member_count()
    }

    #[track_caller]
    fn check_owned_body<'b>(&self, body: &'b Body) -> &'b RawBody {
        let raw = body.raw();
        assert!(self.owns(&raw.store), "body {raw:?} belongs to another world");
        raw
    }

    #[track_caller]
    fn check_owned_shape<'s>(&self, shape: &'s Shape) -> &'s RawShape {
        let raw = shape.raw();
        assert!(self.owns(&raw.store), "shape {raw:?} belongs to another world");
        raw
    }

    // -- Collisions --

    /// Register the pair-begin handler for shapes of `category`.
    ///
    /// The handler runs inside [`step`](Self::step) while the engine is
    /// locked, so it must not call back into bodies or shapes.
    pub fn on_collision_begin(
        &mut self,
        category: CollisionCategory,
        handler: impl Fn(&mut CollisionBegin<'_>) -> bool + Send + Sync + 'static,
    ) {
        debug!("pair-begin handler registered for {category}");
        self.handlers.insert(category, handler);
    }

    pub const fn handlers(&self) -> &CollisionHandlers {
        &self.handlers
    }

    /// Relations recorded since the last call.
    pub fn take_relations(&mut self) -> Vec<(Entity, Entity)> {
        std::mem::take(&mut self.relations)
    }

    // -- Stepping --

    /// Advance the world by `dt` seconds.
    ///
    /// `is_live` reports whether an entity still exists; pair-begin
    /// notifications involving dead entities record no relation. A
    /// non-positive `dt` does nothing.
    pub fn step(&mut self, dt: f32, is_live: impl Fn(Entity) -> bool + Send + Sync) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }
        let dispatch = BeginDispatch::new(&self.handlers, is_live);
        self.world.raw().lock().step(dt, &dispatch);
        self.relations.extend(dispatch.into_relations());
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("world", &self.world)
            .field("handlers", &self.handlers)
            .field("pending_relations", &self.relations.len())
            .finish()
    }
}
