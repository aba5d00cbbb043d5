//! Integration test: collision scenarios through the full app schedule.
//!
//! Each test builds a rapier app with zero gravity, ticks it at 1/60 s and
//! checks what the pair-begin handlers and the collision policy did:
//! 1. A projectile that hits a target removes both
//! 2. A pass-through projectile removes every target it crosses and keeps
//!    its velocity
//! 3. Static geometry is never moved by stepping
//! 4. Sensor shapes report contacts without a collision response
//! 5. Extra shapes on a separate entity resolve to the body's owner
//! 6. Under the despawn policy, extra shapes must be detached before their
//!    owner goes away

use bevy_app::Update;
use bevy_ecs::name::Name;
use bevy_ecs::prelude::*;
use bevy_math::Vec2;

use hitch_core::HitchSet;
use hitch_physics::collision::react_to_collisions;
use hitch_physics::prelude::*;
use hitch_test_utils::SimHarness;

const PLAYER: CollisionCategory = CollisionCategory(1);
const OBJECT: CollisionCategory = CollisionCategory(2);
const PROJECTILE: CollisionCategory = CollisionCategory(3);
const SENSOR: CollisionCategory = CollisionCategory(4);

/// `(holder, collided-with)` for every `Collisions` seen in `React`.
#[derive(Resource, Default)]
struct Struck(Vec<(Entity, Vec<Entity>)>);

fn record_struck(mut struck: ResMut<Struck>, collisions: Query<(Entity, &Collisions)>) {
    for (entity, collisions) in &collisions {
        struck.0.push((entity, collisions.entities().to_vec()));
    }
}

/// Harness that keeps struck entities alive and records their relations.
fn recording_harness() -> SimHarness {
    let mut sim = SimHarness::new();
    sim.world_mut().insert_resource(CollisionPolicy::Custom);
    sim.app_mut()
        .init_resource::<Struck>()
        .add_systems(Update, record_struck.in_set(HitchSet::React));
    sim
}

/// Attach one more `OBJECT` circle to `owner`'s body, held by a new entity.
fn spawn_extra_shape(sim: &mut SimHarness, owner: Entity, offset: Vec2) -> Entity {
    let world = sim.world_mut();
    let body = world.get::<Body>(owner).unwrap();
    let shape = world
        .resource::<PhysicsWorld>()
        .create_shape(
            body,
            &ShapeDesc::new(Geometry::Circle { radius: 1.0, offset }).with_category(OBJECT),
        )
        .unwrap();
    world.spawn(shape).id()
}

/// Despawn extra shapes whose body owner is about to be despawned.
fn drop_extra_shapes(world: &mut World) {
    let struck: Vec<Entity> = world
        .query_filtered::<Entity, With<Collisions>>()
        .iter(world)
        .collect();
    let extras: Vec<Entity> = world
        .query::<(Entity, &Shape)>()
        .iter(world)
        .filter(|(entity, shape)| {
            shape
                .body_identity()
                .is_some_and(|owner| owner != *entity && struck.contains(&owner))
        })
        .map(|(entity, _)| entity)
        .collect();
    for extra in extras {
        world.despawn(extra);
    }
}

fn arrow(sim: &mut SimHarness, position: Vec2, velocity: Vec2) -> Entity {
    let arrow = sim.spawn_with_shape(
        &BodyDesc::dynamic(1.0, f32::INFINITY).at(position).moving(velocity),
        &ShapeDesc::circle(1.0).with_category(PROJECTILE),
    );
    sim.world_mut().entity_mut(arrow).insert(Name::new("arrow"));
    arrow
}

#[test]
fn projectile_hits_target() {
    let mut sim = SimHarness::new();
    let arrow = arrow(&mut sim, Vec2::ZERO, Vec2::new(10.0, 0.0));
    let apple = sim.spawn_with_shape(
        &BodyDesc::dynamic(1.0, f32::INFINITY).at(Vec2::new(10.0, 0.0)),
        &ShapeDesc::rounded_box(5.0, 5.0, 3.0).with_category(OBJECT),
    );
    sim.world_mut().entity_mut(apple).insert(Name::new("apple"));

    sim.physics_mut().on_collision_begin(PROJECTILE, |begin| {
        begin.relate_both();
        true
    });

    sim.run(60);

    assert!(!sim.is_alive(arrow), "arrow should be destroyed");
    assert!(!sim.is_alive(apple), "apple should be destroyed");
    assert_eq!(sim.physics().member_count(), 0);
}

#[test]
fn pass_through_projectile_keeps_velocity() {
    let mut sim = SimHarness::new();
    let arrow = arrow(&mut sim, Vec2::ZERO, Vec2::new(25.0, 0.0));
    let apples: Vec<Entity> = (1..=5u8)
        .map(|i| {
            sim.spawn_with_shape(
                &BodyDesc::dynamic(1.0, f32::INFINITY).at(Vec2::new(5.0 * f32::from(i), 0.0)),
                &ShapeDesc::rect(1.0, 1.0).with_category(OBJECT),
            )
        })
        .collect();

    sim.physics_mut().on_collision_begin(PROJECTILE, |begin| {
        let (this, other) = (begin.this(), begin.other());
        begin.relate(other, this);
        false
    });

    sim.run(60);

    assert!(sim.is_alive(arrow), "arrow should pass through");
    for apple in apples {
        assert!(!sim.is_alive(apple), "apple {apple} should be destroyed");
    }
    let velocity = sim.world().get::<Body>(arrow).unwrap().velocity();
    assert_eq!(velocity, Vec2::new(25.0, 0.0));
}

#[test]
fn resting_contact_leaves_static_geometry_alone() {
    let mut sim = SimHarness::new();
    let ground = sim.spawn_static_shape(&ShapeDesc::segment(Vec2::ZERO, Vec2::new(400.0, 0.0)));
    let crate_box = sim.spawn_with_shape(
        &BodyDesc::dynamic(1.0, f32::INFINITY).at(Vec2::new(100.0, 100.0)),
        &ShapeDesc::rect(10.0, 10.0),
    );

    sim.tick();

    let endpoints = sim.world().get::<Shape>(ground).unwrap().segment_endpoints();
    assert_eq!(endpoints, Some((Vec2::ZERO, Vec2::new(400.0, 0.0))));

    let position = sim.world().get::<Body>(crate_box).unwrap().position();
    approx::assert_relative_eq!(position.x, 100.0, epsilon = 1e-6);
    approx::assert_relative_eq!(position.y, 100.0, epsilon = 1e-6);
}

#[test]
fn sensor_reports_without_response() {
    let mut sim = recording_harness();
    let player = sim.spawn_with_shape(
        &BodyDesc::dynamic(1.0, f32::INFINITY).moving(Vec2::new(10.0, 0.0)),
        &ShapeDesc::circle(1.0).with_category(PLAYER),
    );
    let trap = sim.spawn_with_shape(
        &BodyDesc::fixed().at(Vec2::new(5.0, 0.0)),
        &ShapeDesc::rect(2.0, 2.0).with_category(SENSOR).sensor(),
    );

    // Accepting the contact does not matter: sensors never respond.
    sim.physics_mut().on_collision_begin(SENSOR, |begin| {
        let (this, other) = (begin.this(), begin.other());
        begin.relate(other, this);
        true
    });

    sim.run(60);

    let struck = &sim.world().resource::<Struck>().0;
    assert_eq!(struck.as_slice(), &[(player, vec![trap])]);

    let body = sim.world().get::<Body>(player).unwrap();
    approx::assert_relative_eq!(body.velocity().x, 10.0, epsilon = 1e-4);
    approx::assert_relative_eq!(body.position().x, 10.0, epsilon = 1e-2);
}

#[test]
fn extra_shapes_resolve_to_the_body_owner() {
    let mut sim = recording_harness();
    let owner = sim.spawn_with_shape(
        &BodyDesc::dynamic(1.0, f32::INFINITY),
        &ShapeDesc::circle(1.0).with_category(OBJECT),
    );
    let extra = spawn_extra_shape(&mut sim, owner, Vec2::new(0.0, 10.0));
    let arrow = arrow(&mut sim, Vec2::new(-10.0, 10.0), Vec2::new(10.0, 0.0));

    sim.physics_mut().on_collision_begin(PROJECTILE, |begin| {
        begin.relate_both();
        true
    });

    let hit = sim.run_until(120, |world| !world.resource::<Struck>().0.is_empty());
    assert!(hit.is_some(), "arrow never reached the offset shape");

    let struck = &sim.world().resource::<Struck>().0;
    assert!(struck.contains(&(owner, vec![arrow])));
    assert!(struck.contains(&(arrow, vec![owner])));
    assert!(struck.iter().all(|(entity, _)| *entity != extra));
}

#[test]
#[should_panic(expected = "attached shapes are still inserted")]
fn despawning_owner_with_attached_extra_shape_panics() {
    let mut sim = SimHarness::new();
    let owner = sim.spawn_with_shape(
        &BodyDesc::dynamic(1.0, f32::INFINITY),
        &ShapeDesc::circle(1.0).with_category(OBJECT),
    );
    spawn_extra_shape(&mut sim, owner, Vec2::new(0.0, 10.0));
    arrow(&mut sim, Vec2::new(-10.0, 10.0), Vec2::new(10.0, 0.0));

    sim.physics_mut().on_collision_begin(PROJECTILE, |begin| {
        begin.relate_both();
        true
    });

    sim.run(120);
}

#[test]
fn despawn_policy_tears_down_extra_shapes_first() {
    let mut sim = SimHarness::new();
    sim.app_mut().add_systems(
        Update,
        drop_extra_shapes
            .in_set(HitchSet::React)
            .before(react_to_collisions),
    );
    let owner = sim.spawn_with_shape(
        &BodyDesc::dynamic(1.0, f32::INFINITY),
        &ShapeDesc::circle(1.0).with_category(OBJECT),
    );
    let extras = [
        spawn_extra_shape(&mut sim, owner, Vec2::new(0.0, 10.0)),
        spawn_extra_shape(&mut sim, owner, Vec2::new(0.0, -10.0)),
    ];
    let arrow = arrow(&mut sim, Vec2::new(-10.0, 10.0), Vec2::new(10.0, 0.0));
    assert_eq!(sim.physics().member_count(), 6);

    sim.physics_mut().on_collision_begin(PROJECTILE, |begin| {
        begin.relate_both();
        true
    });

    let gone = sim.run_until(120, |world| world.get_entity(owner).is_err());
    assert!(gone.is_some(), "arrow never reached the offset shape");

    assert!(!sim.is_alive(arrow));
    for extra in extras {
        assert!(!sim.is_alive(extra), "extra shape {extra} should be despawned");
    }
    assert_eq!(sim.physics().member_count(), 0);
}
