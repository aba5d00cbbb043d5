//! Hitch collision scenario runner.
//!
//! Provides two modes of operation:
//! - `scenario`: Run one of the built-in collision scenarios headlessly and
//!   print the surviving entities
//! - `info`: Print workspace crate versions and the effective configuration

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bevy_app::App;
use bevy_ecs::name::Name;
use bevy_ecs::prelude::*;
use bevy_log::{Level, LogPlugin, info};
use bevy_math::Vec2;
use bevy_time::TimePlugin;
use clap::{Parser, Subcommand, ValueEnum};

use hitch_core::prelude::*;
use hitch_physics::prelude::*;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Physics/ECS lifecycle bridge demo.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a collision scenario and print the surviving entities.
    Scenario {
        /// Which scenario to run.
        #[arg(value_enum)]
        scenario: Scenario,

        /// Number of ticks to run.
        #[arg(short, long, default_value_t = 60)]
        ticks: u32,

        /// Physics configuration file (TOML).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log verbosity.
        #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
        log_level: LogLevel,
    },

    /// Print crate information.
    Info {
        /// Physics configuration file (TOML).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    /// An arrow hits an apple; both are removed.
    Projectile,
    /// A fast arrow passes through a row of apples, removing each one.
    PassThrough,
    /// A box hovers above static ground; nothing moves.
    Resting,
    /// A player walks over a sensor trap and is removed.
    Trap,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

const PLAYER: CollisionCategory = CollisionCategory(1);
const OBJECT: CollisionCategory = CollisionCategory(2);
const PROJECTILE: CollisionCategory = CollisionCategory(3);
const SENSOR: CollisionCategory = CollisionCategory(4);

// ---------------------------------------------------------------------------
// Scenario setup
// ---------------------------------------------------------------------------

/// Spawn a named entity owning a body and one shape, body first.
fn spawn_named(
    world: &mut World,
    name: &str,
    body: &BodyDesc,
    shape: &ShapeDesc,
) -> Result<Entity, PhysicsError> {
    let physics = world.resource::<PhysicsWorld>();
    let body = physics.create_body(body)?;
    let shape = physics.create_shape(&body, shape)?;

    let entity = world.spawn((Name::new(name.to_owned()), body)).id();
    world.entity_mut(entity).insert(shape);
    Ok(entity)
}

fn arrow(world: &mut World, velocity: Vec2) -> Result<Entity, PhysicsError> {
    spawn_named(
        world,
        "arrow",
        &BodyDesc::dynamic(1.0, f32::INFINITY).moving(velocity),
        &ShapeDesc::circle(1.0).with_category(PROJECTILE),
    )
}

fn setup(world: &mut World, scenario: Scenario) -> Result<(), PhysicsError> {
    match scenario {
        Scenario::Projectile => {
            arrow(world, Vec2::new(10.0, 0.0))?;
            spawn_named(
                world,
                "apple",
                &BodyDesc::dynamic(1.0, f32::INFINITY).at(Vec2::new(10.0, 0.0)),
                &ShapeDesc::rounded_box(5.0, 5.0, 3.0).with_category(OBJECT),
            )?;
            world
                .resource_mut::<PhysicsWorld>()
                .on_collision_begin(PROJECTILE, |begin| {
                    begin.relate_both();
                    true
                });
        }
        Scenario::PassThrough => {
            arrow(world, Vec2::new(25.0, 0.0))?;
            for i in 1..=5u8 {
                spawn_named(
                    world,
                    &format!("apple {i}"),
                    &BodyDesc::dynamic(1.0, f32::INFINITY).at(Vec2::new(5.0 * f32::from(i), 0.0)),
                    &ShapeDesc::rect(1.0, 1.0).with_category(OBJECT),
                )?;
            }
            world
                .resource_mut::<PhysicsWorld>()
                .on_collision_begin(PROJECTILE, |begin| {
                    let (this, other) = (begin.this(), begin.other());
                    begin.relate(other, this);
                    false
                });
        }
        Scenario::Resting => {
            let ground = world
                .resource::<PhysicsWorld>()
                .create_static_shape(&ShapeDesc::segment(Vec2::ZERO, Vec2::new(400.0, 0.0)))?;
            world.spawn((Name::new("ground"), ground));
            spawn_named(
                world,
                "box",
                &BodyDesc::dynamic(1.0, f32::INFINITY).at(Vec2::new(100.0, 100.0)),
                &ShapeDesc::rect(10.0, 10.0),
            )?;
        }
        Scenario::Trap => {
            spawn_named(
                world,
                "player",
                &BodyDesc::dynamic(1.0, f32::INFINITY).moving(Vec2::new(10.0, 0.0)),
                &ShapeDesc::circle(1.0).with_category(PLAYER),
            )?;
            spawn_named(
                world,
                "trap",
                &BodyDesc::fixed().at(Vec2::new(5.0, 0.0)),
                &ShapeDesc::rect(2.0, 2.0).with_category(SENSOR).sensor(),
            )?;
            world
                .resource_mut::<PhysicsWorld>()
                .on_collision_begin(SENSOR, |begin| {
                    let (this, other) = (begin.this(), begin.other());
                    begin.relate(other, this);
                    true
                });
        }
    }
    Ok(())
}

fn report(world: &mut World) {
    let mut named = world.query::<(Entity, &Name, Option<&Body>, Option<&Shape>)>();
    let mut rows: Vec<_> = named.iter(world).collect();
    rows.sort_by_key(|(entity, ..)| *entity);

    println!("surviving entities: {}", rows.len());
    for (entity, name, body, shape) in rows {
        if let Some((a, b)) = shape.and_then(Shape::segment_endpoints) {
            println!("  {name} ({entity}): segment {a} -> {b}");
        } else if let Some(body) = body {
            println!(
                "  {name} ({entity}): position {} velocity {}",
                body.position(),
                body.velocity()
            );
        } else {
            println!("  {name} ({entity})");
        }
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<PhysicsConfig, ConfigError> {
    path.map_or_else(|| Ok(PhysicsConfig::default()), PhysicsConfig::from_file)
}

fn run_scenario(
    scenario: Scenario,
    ticks: u32,
    config: Option<&Path>,
    log_level: LogLevel,
) -> Result<(), HitchError> {
    let config = load_config(config)?;

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: log_level.into(),
        ..Default::default()
    })
    .add_plugins(TimePlugin)
    .insert_resource(config)
    .add_plugins(HitchPhysicsPlugin::new(RapierBackend));
    app.finish();
    app.cleanup();

    let result = setup(app.world_mut(), scenario);
    if result.is_ok() {
        info!("running {scenario:?} for {ticks} ticks");
        for _ in 0..ticks {
            app.update();
        }
        println!("{scenario:?} after {}", app.world().resource::<SimTime>());
        report(app.world_mut());
    }

    shutdown(app.world_mut());
    result.map_err(HitchError::from)
}

fn run_info(config: Option<&Path>) -> Result<(), HitchError> {
    let config = load_config(config)?;

    println!("hitch v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  hitch-core       {}", env!("CARGO_PKG_VERSION"));
    println!("  hitch-physics    {}", env!("CARGO_PKG_VERSION"));
    println!("  hitch-test-utils {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("backend: {}", RapierBackend.name());
    println!("config: {config:#?}");
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Scenario {
            scenario,
            ticks,
            config,
            log_level,
        }) => run_scenario(scenario, ticks, config.as_deref(), log_level),
        Some(Commands::Info { config }) => run_info(config.as_deref()),
        None => {
            // Default: the projectile scenario with defaults
            run_scenario(Scenario::Projectile, 60, None, LogLevel::Info)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
