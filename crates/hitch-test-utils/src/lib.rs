//! Shared test fixtures and utilities for hitch crates.
//!
//! Provides reusable helpers for building physics test apps, spawning
//! bodies and shapes, and ticking a simulation that shuts itself down
//! cleanly when it goes out of scope.

pub mod app;
pub mod harness;
pub mod spawn;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use app::{physics_test_app, physics_test_app_with};
pub use harness::SimHarness;
pub use spawn::{spawn_body, spawn_static_shape, spawn_with_shape};
