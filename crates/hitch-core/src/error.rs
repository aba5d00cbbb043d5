use thiserror::Error;

/// Top-level error type for hitch.
#[derive(Debug, Error)]
pub enum HitchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid timestep: {0} (must be > 0)")]
    InvalidTimestep(f64),

    #[error("substeps must be >= 1")]
    InvalidSubsteps,

    #[error("Gravity must be finite, got [{0}, {1}]")]
    InvalidGravity(f32, f32),
}

/// Errors raised while building simulation objects.
///
/// Misuse of live objects (null handles, freeing a world member, attaching
/// twice) is a programmer error and panics instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid mass: {0} (must be finite and > 0)")]
    InvalidMass(f32),

    #[error("Body belongs to a different physics world")]
    ForeignHandle,
}
