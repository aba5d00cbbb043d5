//! Rapier physics step system.

use bevy_ecs::entity::Entities;
use bevy_ecs::prelude::*;
use bevy_log::warn;
use bevy_time::Time;

use hitch_core::config::{PhysicsConfig, Timestep};
use hitch_core::time::SimTime;

use super::world::PhysicsWorld;

/// Tick delta in seconds, or `None` if no time source is available.
fn tick_delta(config: &PhysicsConfig, time: Option<&Time>) -> Option<f64> {
    match config.timestep {
        Timestep::Fixed { dt } => Some(dt),
        Timestep::Measured => time.map(Time::delta_secs_f64),
    }
}

/// Advance the [`PhysicsWorld`] by one tick.
///
/// The tick delta comes from [`PhysicsConfig::timestep`] and is split evenly
/// across `substeps` engine steps. Pair-begin handlers only see entities that
/// are still alive when the step runs.
#[allow(clippy::needless_pass_by_value)]
pub fn step_world(
    mut physics: ResMut<PhysicsWorld>,
    config: Res<PhysicsConfig>,
    time: Option<Res<Time>>,
    mut sim_time: ResMut<SimTime>,
    entities: &Entities,
    mut warned_no_clock: Local<bool>,
) {
    let Some(dt) = tick_delta(&config, time.as_deref()) else {
        if !*warned_no_clock {
            warn!("measured timestep selected but no Time resource exists; physics is paused");
            *warned_no_clock = true;
        }
        return;
    };
    if dt.is_nan() || dt <= 0.0 {
        return;
    }

    let substeps = config.substeps.max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let sub_dt = (dt / substeps as f64) as f32;
    for _ in 0..substeps {
        physics.step(sub_dt, |entity| entities.contains(entity));
    }
    sim_time.tick(dt);
}
