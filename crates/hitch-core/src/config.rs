use std::path::Path;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_gravity() -> [f32; 2] {
    [0.0, 0.0]
}
const fn default_substeps() -> usize {
    1
}
const fn default_dt() -> f64 {
    1.0 / 60.0
}

// ---------------------------------------------------------------------------
// Timestep
// ---------------------------------------------------------------------------

/// How much time each tick advances the physics world by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Timestep {
    /// Advance by a constant delta every tick.
    Fixed {
        #[serde(default = "default_dt")]
        dt: f64,
    },
    /// Advance by the frame delta reported by `bevy_time`.
    Measured,
}

impl Default for Timestep {
    fn default() -> Self {
        Self::Fixed { dt: default_dt() }
    }
}

// ---------------------------------------------------------------------------
// PhysicsConfig
// ---------------------------------------------------------------------------

/// Physics world configuration.
///
/// ```toml
/// gravity = [0.0, -9.81]
/// substeps = 2
///
/// [timestep]
/// mode = "fixed"
/// dt = 0.016666
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct PhysicsConfig {
    /// Ambient acceleration applied to every dynamic body (default: none).
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 2],

    /// Per-tick time source.
    #[serde(default)]
    pub timestep: Timestep,

    /// Engine steps per tick; the tick delta is split evenly between them.
    #[serde(default = "default_substeps")]
    pub substeps: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            timestep: Timestep::default(),
            substeps: default_substeps(),
        }
    }
}

impl PhysicsConfig {
    /// Fixed-step config with the given delta.
    #[must_use]
    pub fn fixed(dt: f64) -> Self {
        Self {
            timestep: Timestep::Fixed { dt },
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.gravity = [x, y];
        self
    }

    #[must_use]
    pub const fn with_substeps(mut self, substeps: usize) -> Self {
        self.substeps = substeps;
        self
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Timestep::Fixed { dt } = self.timestep
            && (!dt.is_finite() || dt <= 0.0)
        {
            return Err(ConfigError::InvalidTimestep(dt));
        }
        if self.substeps == 0 {
            return Err(ConfigError::InvalidSubsteps);
        }
        let [gx, gy] = self.gravity;
        if !gx.is_finite() || !gy.is_finite() {
            return Err(ConfigError::InvalidGravity(gx, gy));
        }
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_values() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, [0.0, 0.0]);
        assert_eq!(config.substeps, 1);
        assert_eq!(config.timestep, Timestep::Fixed { dt: 1.0 / 60.0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = PhysicsConfig::from_toml("").unwrap();
        assert_eq!(config, PhysicsConfig::default());
    }

    #[test]
    fn parses_measured_timestep() {
        let config = PhysicsConfig::from_toml(
            r#"
            gravity = [0.0, -100.0]

            [timestep]
            mode = "measured"
            "#,
        )
        .unwrap();
        assert_eq!(config.timestep, Timestep::Measured);
        assert_eq!(config.gravity, [0.0, -100.0]);
    }

    #[test]
    fn parses_fixed_timestep_and_substeps() {
        let config = PhysicsConfig::from_toml(
            r#"
            substeps = 4

            [timestep]
            mode = "fixed"
            dt = 0.01
            "#,
        )
        .unwrap();
        assert_eq!(config.substeps, 4);
        assert_eq!(config.timestep, Timestep::Fixed { dt: 0.01 });
    }

    #[test]
    fn rejects_non_positive_dt() {
        let err = PhysicsConfig::fixed(0.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimestep(_)));
        let err = PhysicsConfig::fixed(-0.1).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimestep(_)));
    }

    #[test]
    fn rejects_zero_substeps() {
        let err = PhysicsConfig::default().with_substeps(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSubsteps));
    }

    #[test]
    fn rejects_non_finite_gravity() {
        let err = PhysicsConfig::default()
            .with_gravity(f32::INFINITY, 0.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGravity(..)));
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = PhysicsConfig::from_toml("[timestep]\nmode = \"warp\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn from_file_round_trips_through_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gravity = [1.0, 2.0]\nsubsteps = 3").unwrap();

        let config = PhysicsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.gravity, [1.0, 2.0]);
        assert_eq!(config.substeps, 3);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = PhysicsConfig::from_file("/nonexistent/hitch.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
