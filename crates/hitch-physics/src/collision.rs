//! Collision categories, pair-begin handlers and the per-tick collision relation.
//!
//! Handlers run inside the engine step. They receive the two entities whose
//! shapes started touching, may record relations between them, and return
//! whether the engine should apply its normal collision response. Recorded
//! relations become [`Collisions`] components in [`HitchSet::Collide`] and
//! are removed again at the end of the tick.
//!
//! [`HitchSet::Collide`]: hitch_core::HitchSet::Collide

use std::collections::HashMap;
use std::fmt;

use bevy_ecs::entity::Entities;
use bevy_ecs::name::Name;
use bevy_ecs::prelude::*;
use bevy_log::{debug, info};

use crate::rapier::PhysicsWorld;

// ---------------------------------------------------------------------------
// CollisionCategory
// ---------------------------------------------------------------------------

/// Collision type tag carried by every shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CollisionCategory(pub u32);

impl CollisionCategory {
    /// Category of shapes that were not given one. Registering a handler for
    /// it is rejected in debug builds.
    pub const DEFAULT: Self = Self(0);
}

impl fmt::Display for CollisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CollisionBegin
// ---------------------------------------------------------------------------

/// Context handed to a pair-begin handler.
///
/// `this` is the entity whose shape matched the handler's category, `other`
/// is the entity on the opposite side of the contact.
pub struct CollisionBegin<'a> {
    this: Entity,
    other: Entity,
    this_category: CollisionCategory,
    other_category: CollisionCategory,
    relations: &'a mut Vec<(Entity, Entity)>,
}

impl<'a> CollisionBegin<'a> {
    pub(crate) const fn new(
        (this, this_category): (Entity, CollisionCategory),
        (other, other_category): (Entity, CollisionCategory),
        relations: &'a mut Vec<(Entity, Entity)>,
    ) -> Self {
        Self {
            this,
            other,
            this_category,
            other_category,
            relations,
        }
    }

    pub const fn this(&self) -> Entity {
        self.this
    }

    pub const fn other(&self) -> Entity {
        self.other
    }

    pub const fn this_category(&self) -> CollisionCategory {
        self.this_category
    }

    pub const fn other_category(&self) -> CollisionCategory {
        self.other_category
    }

    /// Mark `from` as having collided with `to`.
    pub fn relate(&mut self, from: Entity, to: Entity) {
        self.relations.push((from, to));
    }

    /// Mark both participants as having collided with each other.
    pub fn relate_both(&mut self) {
        let (this, other) = (self.this, self.other);
        self.relate(this, other);
        self.relate(other, this);
    }
}

/// A pair-begin handler. The return value selects the collision response:
/// `true` lets the engine resolve the contact, `false` lets the shapes pass
/// through each other for as long as they touch.
pub type BeginHandler = dyn Fn(&mut CollisionBegin<'_>) -> bool + Send + Sync;

// ---------------------------------------------------------------------------
// CollisionHandlers
// ---------------------------------------------------------------------------

/// Wildcard pair-begin handlers keyed by category.
#[derive(Default)]
pub struct CollisionHandlers {
    handlers: HashMap<CollisionCategory, Box<BeginHandler>>,
}

impl CollisionHandlers {
    /// Register `handler` for `category`, replacing any previous one.
    pub fn insert(
        &mut self,
        category: CollisionCategory,
        handler: impl Fn(&mut CollisionBegin<'_>) -> bool + Send + Sync + 'static,
    ) {
        debug_assert!(
            category != CollisionCategory::DEFAULT,
            "the default category cannot have a pair-begin handler"
        );
        if self.handlers.insert(category, Box::new(handler)).is_some() {
            debug!("replaced pair-begin handler for {category}");
        }
    }

    pub fn get(&self, category: CollisionCategory) -> Option<&BeginHandler> {
        self.handlers.get(&category).map(|handler| &**handler)
    }

    pub fn contains(&self, category: CollisionCategory) -> bool {
        self.handlers.contains_key(&category)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for CollisionHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut categories: Vec<_> = self.handlers.keys().collect();
        categories.sort();
        f.debug_struct("CollisionHandlers")
            .field("categories", &categories)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Collisions
// ---------------------------------------------------------------------------

/// Entities this entity collided with during the current tick.
///
/// Present only between [`HitchSet::Collide`](hitch_core::HitchSet::Collide)
/// and [`HitchSet::Cleanup`](hitch_core::HitchSet::Cleanup) of the tick the
/// contact began in.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Collisions(Vec<Entity>);

impl Collisions {
    pub fn entities(&self) -> &[Entity] {
        &self.0
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.0.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn add(&mut self, entity: Entity) {
        if !self.contains(entity) {
            self.0.push(entity);
        }
    }
}

// ---------------------------------------------------------------------------
// CollisionPolicy
// ---------------------------------------------------------------------------

/// Built-in reaction to [`Collisions`], run in
/// [`HitchSet::React`](hitch_core::HitchSet::React).
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Despawn every entity that collided.
    #[default]
    Despawn,
    /// Log every entity that collided and leave it alone.
    Log,
    /// Do nothing; reactions are provided by the application.
    Custom,
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Attach the relations buffered during the step as [`Collisions`].
pub fn apply_collisions(
    mut commands: Commands,
    mut physics: ResMut<PhysicsWorld>,
    entities: &Entities,
    mut struck: Query<&mut Collisions>,
) {
    let mut fresh: HashMap<Entity, Collisions> = HashMap::new();

    for (from, to) in physics.take_relations() {
        if !entities.contains(from) {
            debug!("dropping collision relation on stale entity {from}");
            continue;
        }
        if let Ok(mut existing) = struck.get_mut(from) {
            existing.add(to);
        } else {
            fresh.entry(from).or_default().add(to);
        }
    }

    for (entity, collisions) in fresh {
        commands.entity(entity).try_insert(collisions);
    }
}

/// Apply the configured [`CollisionPolicy`].
pub fn react_to_collisions(
    mut commands: Commands,
    policy: Res<CollisionPolicy>,
    struck: Query<(Entity, &Collisions, Option<&Name>)>,
) {
    for (entity, collisions, name) in &struck {
        match *policy {
            CollisionPolicy::Despawn => {
                debug!("{} collided; removing", label(entity, name));
                commands.entity(entity).despawn();
            }
            CollisionPolicy::Log => {
                info!(
                    "{} collided with {:?}",
                    label(entity, name),
                    collisions.entities()
                );
            }
            CollisionPolicy::Custom => return,
        }
    }
}

/// Remove every [`Collisions`] left at the end of the tick.
pub fn clear_collisions(mut commands: Commands, struck: Query<Entity, With<Collisions>>) {
    for entity in &struck {
        commands.entity(entity).remove::<Collisions>();
    }
}

fn label(entity: Entity, name: Option<&Name>) -> String {
    match name {
        Some(name) => format!("{name} ({entity})"),
        None => entity.to_string(),
    }
}
