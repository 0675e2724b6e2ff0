//! Rollbug - terrain physics core for a rolling 2D platformer character
//!
//! Core modules:
//! - `sim`: Deterministic character simulation (mask, sensor, motion, pose)
//! - `scene`: Thin orchestrator owning the terrain and the character
//! - `settings`: Data-driven tuning, loaded from JSON
//! - `autopilot`: Seeded input generator for the demo and tests

pub mod autopilot;
pub mod error;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::{DebugOverlay, Settings, Tuning};

use glam::Vec2;

/// Simulation constants that are not part of the tunable set
pub mod consts {
    /// Reference frame time in milliseconds (60 Hz). Animation speeds are
    /// expressed per reference frame.
    pub const REFERENCE_FRAME_MS: f32 = 16.0;

    /// Base of the exponential render follow curve
    pub const RENDER_FOLLOW_BASE: f32 = 0.001;

    /// Distance under which a ground snap lands exactly on target
    pub const SNAP_EPSILON: f32 = 0.25;

    /// Below this horizontal speed a released roll stands back up
    pub const ROLL_EXIT_SPEED: f32 = 1.0;
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

/// Unit tangent of a slope angle (radians)
#[inline]
pub fn slope_tangent(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Unit normal of a slope angle, pointing down into the ground in screen
/// coordinates (y grows downward)
#[inline]
pub fn slope_normal(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}

/// Axis-aligned bounding extents of a `size` rectangle rotated by `degrees`
#[inline]
pub fn rotated_extents(size: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(
        (size.x * cos).abs() + (size.y * sin).abs(),
        (size.x * sin).abs() + (size.y * cos).abs(),
    )
}
