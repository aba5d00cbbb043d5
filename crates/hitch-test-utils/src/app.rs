//! Bevy test app builders.

use bevy_app::App;
use hitch_core::config::PhysicsConfig;
use hitch_physics::HitchPhysicsPlugin;
use hitch_physics::rapier::RapierBackend;

/// Create a test app with the rapier backend stepping `1/60 s` per update.
///
/// Gravity is off. The caller must run
/// [`hitch_physics::shutdown`] before dropping an app with attached bodies;
/// [`SimHarness`](crate::SimHarness) does this automatically.
pub fn physics_test_app() -> App {
    physics_test_app_with(PhysicsConfig::fixed(1.0 / 60.0))
}

/// Create a rapier test app with the given configuration.
pub fn physics_test_app_with(config: PhysicsConfig) -> App {
    let mut app = App::new();
    app.insert_resource(config);
    app.add_plugins(HitchPhysicsPlugin::new(RapierBackend));
    app.finish();
    app.cleanup();
    app
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use hitch_core::time::SimTime;
    use hitch_physics::rapier::PhysicsWorld;

    use super::*;

    #[test]
    fn physics_app_builds() {
        let app = physics_test_app();
        assert!(app.world().get_resource::<PhysicsWorld>().is_some());
        assert!(app.world().get_resource::<SimTime>().is_some());
    }

    #[test]
    fn physics_app_can_update() {
        let mut app = physics_test_app();
        app.update();
        app.update();
        assert_eq!(app.world().resource::<SimTime>().ticks(), 2);
    }

    #[test]
    fn config_is_passed_through() {
        let app = physics_test_app_with(PhysicsConfig::fixed(0.01).with_gravity(0.0, -10.0));
        assert_eq!(
            app.world().resource::<PhysicsWorld>().gravity(),
            bevy_math::Vec2::new(0.0, -10.0)
        );
    }
}
