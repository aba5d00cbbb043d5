//! Shared rapier2d state and the raw handle types that point into it.
//!
//! Every body and shape is inserted into the rapier sets as soon as it is
//! created, so its rapier handle is stable for its whole life. World
//! membership is the engine's own enabled flag: adding enables the object,
//! removing disables it, and releasing removes it from the set.

use std::fmt;
use std::sync::Arc;

use bevy_ecs::entity::Entity;
use parking_lot::{Mutex, MutexGuard};
use rapier2d::prelude::*;

use crate::desc::{BodyDesc, BodyKind, Geometry, ShapeDesc};
use crate::handle::Release;

/// Marks a body `user_data` that carries an entity identity.
const IDENTITY_TAG: u128 = 1 << 64;
/// Marks a collider `user_data` as a sensor.
const SENSOR_FLAG: u128 = 1 << 32;

/// Encode an entity into a body's `user_data` slot.
pub(crate) fn encode_identity(entity: Entity) -> u128 {
    IDENTITY_TAG | u128::from(entity.to_bits())
}

/// Decode an entity from a body's `user_data` slot.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn decode_identity(user_data: u128) -> Option<Entity> {
    (user_data & IDENTITY_TAG != 0).then(|| Entity::from_bits(user_data as u64))
}

/// Encode a shape's category and sensor flag into a collider's `user_data` slot.
pub(crate) fn encode_shape_tag(desc: &ShapeDesc) -> u128 {
    let sensor = if desc.sensor { SENSOR_FLAG } else { 0 };
    u128::from(desc.category.0) | sensor
}

/// Category and sensor flag of a collider `user_data` slot.
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn decode_shape_tag(user_data: u128) -> (u32, bool) {
    (user_data as u32, user_data & SENSOR_FLAG != 0)
}

// ---------------------------------------------------------------------------
// SimStore
// ---------------------------------------------------------------------------

/// All rapier state for one world.
///
/// `PhysicsPipeline::step()` requires mutable access to every set
/// simultaneously, so they live together behind one lock.
pub(crate) struct SimStore {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,

    pub pipeline: PhysicsPipeline,
    pub islands: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub ccd_solver: CCDSolver,

    pub params: IntegrationParameters,
    pub gravity: Vector,
    /// Fixed body that static shapes hang off.
    pub anchor: RigidBodyHandle,
    /// Set once the owning world has been released.
    pub destroyed: bool,
}

pub(crate) type SharedStore = Arc<Mutex<SimStore>>;

impl SimStore {
    pub fn new(gravity: Vector) -> Self {
        let mut bodies = RigidBodySet::new();
        let anchor = bodies.insert(RigidBodyBuilder::fixed().build());

        Self {
            bodies,
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            params: IntegrationParameters::default(),
            gravity,
            anchor,
            destroyed: false,
        }
    }

    /// Insert a body that is not yet simulated.
    pub fn insert_body(&mut self, desc: &BodyDesc) -> RigidBodyHandle {
        let builder = match desc.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        }
        .translation(Vector::new(desc.position.x, desc.position.y))
        .linvel(Vector::new(desc.velocity.x, desc.velocity.y));

        let builder = match desc.kind {
            BodyKind::Dynamic if desc.moment.is_infinite() => builder
                .locked_axes(LockedAxes::ROTATION_LOCKED)
                .additional_mass(desc.mass),
            BodyKind::Dynamic => builder.additional_mass_properties(MassProperties::new(
                Vector::ZERO,
                desc.mass,
                desc.moment,
            )),
            BodyKind::Kinematic | BodyKind::Static => builder,
        };

        let handle = self.bodies.insert(builder.build());
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_enabled(false);
        }
        handle
    }

    /// Insert a collider attached to `parent`, not yet simulated.
    pub fn insert_collider(&mut self, parent: RigidBodyHandle, desc: &ShapeDesc) -> ColliderHandle {
        let builder = match desc.geometry {
            Geometry::Circle { radius, offset } => {
                ColliderBuilder::ball(radius).translation(Vector::new(offset.x, offset.y))
            }
            Geometry::Box {
                width,
                height,
                radius,
            } if radius > 0.0 => ColliderBuilder::round_cuboid(width / 2.0, height / 2.0, radius),
            Geometry::Box { width, height, .. } => {
                ColliderBuilder::cuboid(width / 2.0, height / 2.0)
            }
            Geometry::Segment { a, b, radius } if radius > 0.0 => {
                ColliderBuilder::capsule_from_endpoints(
                    Vector::new(a.x, a.y),
                    Vector::new(b.x, b.y),
                    radius,
                )
            }
            Geometry::Segment { a, b, .. } => {
                ColliderBuilder::segment(Vector::new(a.x, a.y), Vector::new(b.x, b.y))
            }
        };

        // Mass comes from the body description alone.
        let collider = builder
            .density(0.0)
            .friction(desc.friction)
            .restitution(desc.elasticity)
            .user_data(encode_shape_tag(desc))
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .build();

        let handle = self
            .colliders
            .insert_with_parent(collider, parent, &mut self.bodies);
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.set_enabled(false);
        }
        handle
    }

    pub fn body_is_member(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.get(handle).is_some_and(RigidBody::is_enabled)
    }

    pub fn collider_is_member(&self, handle: ColliderHandle) -> bool {
        self.colliders.get(handle).is_some_and(Collider::is_enabled)
    }

    /// Shapes attached to `handle` that are still inserted.
    pub fn attached_member_count(&self, handle: RigidBodyHandle) -> usize {
        self.bodies.get(handle).map_or(0, |body| {
            body.colliders()
                .iter()
                .filter(|collider| self.collider_is_member(**collider))
                .count()
        })
    }

    /// Bodies and shapes currently inserted, not counting the static anchor.
    pub fn member_count(&self) -> usize {
        let bodies = self
            .bodies
            .iter()
            .filter(|(handle, body)| *handle != self.anchor && body.is_enabled())
            .count();
        let colliders = self.colliders.iter().filter(|(_, c)| c.is_enabled()).count();
        bodies + colliders
    }

    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            false,
        );
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, true);
    }

    /// Run one engine step of `dt` seconds.
    pub fn step(&mut self, dt: f32, hooks: &dyn PhysicsHooks) {
        self.params.dt = dt;
        self.pipeline.step(
            self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            hooks,
            &(),
        );
    }

    /// Drop every engine object and refuse further use.
    pub fn teardown(&mut self) {
        let gravity = self.gravity;
        *self = Self::new(gravity);
        self.destroyed = true;
    }
}

fn lock_live<'a>(store: &'a SharedStore, kind: &str) -> MutexGuard<'a, SimStore> {
    let guard = store.lock();
    assert!(!guard.destroyed, "{kind} used after its world was destroyed");
    guard
}

// ---------------------------------------------------------------------------
// RawWorld
// ---------------------------------------------------------------------------

/// The engine world.
pub struct RawWorld {
    pub(crate) store: SharedStore,
}

impl RawWorld {
    pub(crate) fn new(gravity: Vector) -> Self {
        Self {
            store: Arc::new(Mutex::new(SimStore::new(gravity))),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SimStore> {
        lock_live(&self.store, RawWorld::KIND)
    }
}

impl fmt::Debug for RawWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:p}", Arc::as_ptr(&self.store))
    }
}

impl Release for RawWorld {
    const KIND: &'static str = "world";

    fn release(self) {
        let mut store = self.store.lock();
        let members = store.member_count();
        if members > 0 && !std::thread::panicking() {
            drop(store);
            panic!("world destroyed while {members} bodies/shapes are still inserted");
        }
        store.teardown();
    }
}

// ---------------------------------------------------------------------------
// RawBody
// ---------------------------------------------------------------------------

/// A rigid body living in a world's store.
pub struct RawBody {
    pub(crate) store: SharedStore,
    pub(crate) handle: RigidBodyHandle,
}

impl RawBody {
    pub(crate) fn lock(&self) -> MutexGuard<'_, SimStore> {
        lock_live(&self.store, RawBody::KIND)
    }

    /// Run `f` against the rapier body.
    pub(crate) fn with<T>(&self, f: impl FnOnce(&RigidBody) -> T) -> T {
        let store = self.lock();
        let body = store
            .bodies
            .get(self.handle)
            .unwrap_or_else(|| panic!("body {:?} missing from its store", self.handle));
        f(body)
    }

    /// Run `f` against the rapier body mutably.
    pub(crate) fn with_mut<T>(&self, f: impl FnOnce(&mut RigidBody) -> T) -> T {
        let mut store = self.lock();
        let body = store
            .bodies
            .get_mut(self.handle)
            .unwrap_or_else(|| panic!("body {:?} missing from its store", self.handle));
        f(body)
    }
}

impl fmt::Debug for RawBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.handle.into_raw_parts();
        write!(f, "{index}v{generation}")
    }
}

impl Release for RawBody {
    const KIND: &'static str = "body";

    fn release(self) {
        let mut store = self.store.lock();
        if store.destroyed {
            return;
        }
        if store.body_is_member(self.handle) && !std::thread::panicking() {
            drop(store);
            panic!("body {self:?} freed while still inserted in the world");
        }
        let attached = store.attached_member_count(self.handle);
        if attached > 0 && !std::thread::panicking() {
            drop(store);
            panic!("body {self:?} freed while {attached} attached shapes are still inserted");
        }
        store.remove_body(self.handle);
    }
}

// ---------------------------------------------------------------------------
// RawShape
// ---------------------------------------------------------------------------

/// A collider living in a world's store.
pub struct RawShape {
    pub(crate) store: SharedStore,
    pub(crate) handle: ColliderHandle,
}

impl RawShape {
    pub(crate) fn lock(&self) -> MutexGuard<'_, SimStore> {
        lock_live(&self.store, RawShape::KIND)
    }

    pub(crate) fn with<T>(&self, f: impl FnOnce(&Collider, &RigidBodySet) -> T) -> T {
        let store = self.lock();
        let collider = store
            .colliders
            .get(self.handle)
            .unwrap_or_else(|| panic!("shape {:?} missing from its store", self.handle));
        f(collider, &store.bodies)
    }
}

impl fmt::Debug for RawShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (index, generation) = self.handle.into_raw_parts();
        write!(f, "{index}v{generation}")
    }
}

impl Release for RawShape {
    const KIND: &'static str = "shape";

    fn release(self) {
        let mut store = self.store.lock();
        if store.destroyed {
            return;
        }
        if store.collider_is_member(self.handle) && !std::thread::panicking() {
            drop(store);
            panic!("shape {self:?} freed while still inserted in the world");
        }
        store.remove_collider(self.handle);
    }
}
