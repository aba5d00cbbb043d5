//! Pair-begin dispatch through rapier's contact modification hook.
//!
//! Every collider is created with `MODIFY_SOLVER_CONTACTS`, so rapier calls
//! [`PhysicsHooks::modify_solver_contacts`] for each touching manifold during
//! the step. The first time a manifold produces solver contacts the handler
//! for its category is consulted, and the decision is stored in the
//! manifold's `user_data` so later steps reuse it without calling back.

use bevy_ecs::entity::Entity;
use bevy_log::debug;
use parking_lot::Mutex;
use rapier2d::prelude::*;

use crate::collision::{CollisionBegin, CollisionCategory, CollisionHandlers};

use super::store::{decode_identity, decode_shape_tag};

const UNDECIDED: u32 = 0;
const RESPOND: u32 = 1;
const PASS_THROUGH: u32 = 2;

/// One side of a contact.
struct Side {
    entity: Option<Entity>,
    category: CollisionCategory,
    sensor: bool,
}

impl Side {
    fn of(handle: ColliderHandle, colliders: &ColliderSet, bodies: &RigidBodySet) -> Option<Self> {
        let collider = colliders.get(handle)?;
        let (category, sensor) = decode_shape_tag(collider.user_data);
        let entity = collider
            .parent()
            .and_then(|parent| bodies.get(parent))
            .and_then(|body| decode_identity(body.user_data));
        Some(Self {
            entity,
            category: CollisionCategory(category),
            sensor,
        })
    }
}

/// Hook object alive for the duration of one engine step.
pub(crate) struct BeginDispatch<'a, F> {
    handlers: &'a CollisionHandlers,
    is_live: F,
    relations: Mutex<Vec<(Entity, Entity)>>,
}

impl<'a, F> BeginDispatch<'a, F>
where
    F: Fn(Entity) -> bool + Send + Sync,
{
    pub fn new(handlers: &'a CollisionHandlers, is_live: F) -> Self {
        Self {
            handlers,
            is_live,
            relations: Mutex::new(Vec::new()),
        }
    }

    /// Relations recorded by handlers during the step.
    pub fn into_relations(self) -> Vec<(Entity, Entity)> {
        self.relations.into_inner()
    }

    /// Decide whether the engine responds to a new contact between two colliders.
    fn begin(
        &self,
        (c1, c2): (ColliderHandle, ColliderHandle),
        colliders: &ColliderSet,
        bodies: &RigidBodySet,
    ) -> bool {
        let (Some(a), Some(b)) = (
            Side::of(c1, colliders, bodies),
            Side::of(c2, colliders, bodies),
        ) else {
            return true;
        };
        let respond = !(a.sensor || b.sensor);

        let (this, other, handler) = if let Some(handler) = self.handlers.get(a.category) {
            (a, b, handler)
        } else if let Some(handler) = self.handlers.get(b.category) {
            (b, a, handler)
        } else {
            return respond;
        };

        let (Some(this_entity), Some(other_entity)) = (this.entity, other.entity) else {
            debug!("pair-begin on a body without identity; skipping");
            return respond;
        };
        if !(self.is_live)(this_entity) || !(self.is_live)(other_entity) {
            debug!("pair-begin {this_entity} -> {other_entity} on a stale entity; skipping");
            return respond;
        }

        let mut relations = Vec::new();
        let mut begin = CollisionBegin::new(
            (this_entity, this.category),
            (other_entity, other.category),
            &mut relations,
        );
        let accepted = handler(&mut begin);
        debug!(
            "pair-begin {this_entity} -> {other_entity} ({}): {}",
            this.category,
            if accepted { "respond" } else { "pass through" }
        );

        self.relations.lock().append(&mut relations);
        accepted && respond
    }
}

impl<F> PhysicsHooks for BeginDispatch<'_, F>
where
    F: Fn(Entity) -> bool + Send + Sync,
{
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        match *context.user_data {
            UNDECIDED => {}
            PASS_THROUGH => {
                context.solver_contacts.clear();
                return;
            }
            _ => return,
        }
        if context.solver_contacts.is_empty() {
            return;
        }

        let respond = self.begin(
            (context.collider1, context.collider2),
            context.colliders,
            context.bodies,
        );
        if respond {
            *context.user_data = RESPOND;
        } else {
            *context.user_data = PASS_THROUGH;
            context.solver_contacts.clear();
        }
    }
}
