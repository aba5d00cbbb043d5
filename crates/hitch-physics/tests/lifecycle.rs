//! Integration test: handle lifecycle and per-tick relation bookkeeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bevy_ecs::name::Name;
use bevy_math::Vec2;

use hitch_core::config::PhysicsConfig;
use hitch_core::time::SimTime;
use hitch_physics::prelude::*;
use hitch_test_utils::SimHarness;

const OBJECT: CollisionCategory = CollisionCategory(2);
const PROJECTILE: CollisionCategory = CollisionCategory(3);

fn moving(velocity: Vec2) -> BodyDesc {
    BodyDesc::dynamic(1.0, f32::INFINITY).moving(velocity)
}

fn projectile() -> ShapeDesc {
    ShapeDesc::circle(1.0).with_category(PROJECTILE)
}

#[test]
fn despawned_entities_leave_the_world() {
    let mut sim = SimHarness::new();
    let entity = sim.spawn_with_shape(&moving(Vec2::X), &projectile());
    assert_eq!(sim.physics().member_count(), 2);

    sim.world_mut().despawn(entity);
    assert_eq!(sim.physics().member_count(), 0);

    // Stepping an empty world is fine.
    sim.run(3);
}

#[test]
fn zero_timestep_leaves_bodies_untouched() {
    let mut sim = SimHarness::with_config(PhysicsConfig::fixed(0.0));
    let entity = sim.spawn_body(&moving(Vec2::new(10.0, 5.0)).at(Vec2::new(1.0, 1.0)));

    sim.run(10);

    let body = sim.world().get::<Body>(entity).unwrap();
    assert_eq!(body.position(), Vec2::new(1.0, 1.0));
    assert_eq!(body.velocity(), Vec2::new(10.0, 5.0));
    assert_eq!(sim.world().resource::<SimTime>().ticks(), 0);
}

#[test]
fn handler_runs_once_per_contact() {
    let mut sim = SimHarness::new();
    sim.world_mut().insert_resource(CollisionPolicy::Custom);
    let arrow = sim.spawn_with_shape(&moving(Vec2::new(10.0, 0.0)), &projectile());
    sim.spawn_with_shape(
        &BodyDesc::fixed().at(Vec2::new(5.0, 0.0)),
        &ShapeDesc::rect(4.0, 4.0).with_category(OBJECT),
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    sim.physics_mut().on_collision_begin(PROJECTILE, move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
        false
    });

    // The arrow overlaps the box for many ticks on its way through.
    sim.run(90);

    assert_eq!(calls.load(Ordering::Relaxed), 1);
    let position = sim.world().get::<Body>(arrow).unwrap().position();
    approx::assert_relative_eq!(position.x, 15.0, epsilon = 1e-2);
}

#[test]
fn relations_do_not_outlive_the_tick() {
    let mut sim = SimHarness::new();
    sim.world_mut().insert_resource(CollisionPolicy::Log);
    let arrow = sim.spawn_with_shape(&moving(Vec2::new(10.0, 0.0)), &projectile());
    let apple = sim.spawn_with_shape(
        &BodyDesc::dynamic(1.0, f32::INFINITY).at(Vec2::new(5.0, 0.0)),
        &ShapeDesc::circle(1.0).with_category(OBJECT),
    );
    sim.world_mut().entity_mut(apple).insert(Name::new("apple"));

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    sim.physics_mut().on_collision_begin(PROJECTILE, move |begin| {
        counter.fetch_add(1, Ordering::Relaxed);
        begin.relate_both();
        true
    });

    for _ in 0..60 {
        sim.tick();
        let mut collisions = sim.world_mut().query::<&Collisions>();
        assert_eq!(collisions.iter(sim.world()).count(), 0);
    }

    // The log policy leaves both participants alive.
    assert!(calls.load(Ordering::Relaxed) >= 1);
    assert!(sim.is_alive(arrow));
    assert!(sim.is_alive(apple));
}

#[test]
fn stale_identity_records_nothing_and_keeps_response() {
    let mut sim = SimHarness::new();
    let arrow = sim.spawn_with_shape(&moving(Vec2::new(10.0, 0.0)), &projectile());

    // A body stamped with an entity that no longer exists, inserted by hand.
    let ghost = sim.world_mut().spawn_empty().id();
    sim.world_mut().despawn(ghost);
    let (body, shape) = {
        let physics = sim.physics();
        let body = physics
            .create_body(&BodyDesc::dynamic(1.0, f32::INFINITY).at(Vec2::new(5.0, 0.0)))
            .unwrap();
        let shape = physics
            .create_shape(&body, &ShapeDesc::circle(1.0).with_category(OBJECT))
            .unwrap();
        (body, shape)
    };
    body.stamp_identity(ghost);
    {
        let mut physics = sim.physics_mut();
        physics.add_body(&body);
        physics.add_shape(&shape);
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    sim.physics_mut().on_collision_begin(PROJECTILE, move |begin| {
        counter.fetch_add(1, Ordering::Relaxed);
        begin.relate_both();
        false
    });

    sim.run(60);

    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert!(sim.is_alive(arrow));
    let velocity = sim.world().get::<Body>(arrow).unwrap().velocity();
    assert!(velocity.x < 9.0, "contact response should slow the arrow, got {velocity}");

    {
        let mut physics = sim.physics_mut();
        physics.remove_shape(&shape);
        physics.remove_body(&body);
    }
}

#[test]
fn handles_detached_and_reattached_keep_simulating() {
    let mut sim = SimHarness::new();
    let first = sim.spawn_body(&moving(Vec2::new(60.0, 0.0)));
    sim.tick();

    let body = sim.world_mut().entity_mut(first).take::<Body>().unwrap();
    assert!(!body.is_member());
    sim.tick();
    approx::assert_relative_eq!(body.position().x, 1.0, epsilon = 1e-4);

    let second = sim.world_mut().spawn(body).id();
    sim.tick();

    let body = sim.world().get::<Body>(second).unwrap();
    assert_eq!(body.identity(), Some(second));
    approx::assert_relative_eq!(body.position().x, 2.0, epsilon = 1e-4);
}
