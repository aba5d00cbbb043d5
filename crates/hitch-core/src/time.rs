use std::fmt;
use std::time::Duration;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SimTime
// ---------------------------------------------------------------------------

/// Simulated time advanced by the physics stepper.
///
/// Tracks elapsed time as an integer nanosecond count so that summing many
/// `1/60` ticks does not drift, alongside the number of ticks that actually
/// advanced the world. Ticks with a zero delta are not counted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, Resource,
)]
pub struct SimTime {
    nanos: u64,
    ticks: u64,
}

impl SimTime {
    /// Clock at zero with no ticks.
    #[must_use]
    pub const fn new() -> Self {
        Self { nanos: 0, ticks: 0 }
    }

    /// Raw nanosecond count.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    /// Number of non-empty steps recorded.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Elapsed time in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Elapsed time as a [`Duration`].
    #[must_use]
    pub const fn to_duration(&self) -> Duration {
        Duration::from_nanos(self.nanos)
    }

    /// Record one step of `dt_secs`. Non-positive or non-finite deltas are ignored.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tick(&mut self, dt_secs: f64) {
        if !dt_secs.is_finite() || dt_secs <= 0.0 {
            return;
        }
        let delta = (dt_secs * 1_000_000_000.0).round() as u64;
        self.nanos = self.nanos.saturating_add(delta);
        self.ticks += 1;
    }

    /// Back to zero.
    pub const fn reset(&mut self) {
        self.nanos = 0;
        self.ticks = 0;
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.nanos / 1_000_000_000;
        let millis = (self.nanos % 1_000_000_000) / 1_000_000;
        write!(f, "{secs}.{millis:03}s (tick {})", self.ticks)
    }
}
