//! Tuning and settings
//!
//! Every physics constant lives in [`Tuning`]. [`Settings`] wraps it with the
//! level-wide values and is persisted as JSON.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How much per-tick diagnostic data the scene keeps around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DebugOverlay {
    #[default]
    Off,
    /// Probe rays and their hits
    Rays,
    /// Rays plus the slope line
    Full,
}

impl DebugOverlay {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugOverlay::Off => "Off",
            DebugOverlay::Rays => "Rays",
            DebugOverlay::Full => "Full",
        }
    }

    /// Whether ray traces are kept
    pub fn keeps_rays(&self) -> bool {
        !matches!(self, DebugOverlay::Off)
    }

    /// Whether the slope line is kept
    pub fn keeps_slope_line(&self) -> bool {
        matches!(self, DebugOverlay::Full)
    }
}

impl fmt::Display for DebugOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebugOverlay {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Ok(DebugOverlay::Off),
            "rays" => Ok(DebugOverlay::Rays),
            "full" | "all" => Ok(DebugOverlay::Full),
            _ => Err(format!("unknown debug overlay '{}' (off, rays, full)", s)),
        }
    }
}

/// Character physics tuning
///
/// Velocities and accelerations are per tick, timers are in seconds,
/// distances in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Body ===
    /// Collision radius
    pub radius: f32,

    // === Walking ===
    pub walk_accel: f32,
    /// Fraction of horizontal speed lost per tick with no input
    pub walk_friction: f32,
    pub walk_max_speed: f32,

    // === Rolling ===
    pub roll_friction: f32,
    /// Slope-aligned acceleration while rolling
    pub roll_gravity: f32,
    /// Nominal radius used to turn rolled distance into spin
    pub roll_radius_px: f32,

    // === Air ===
    pub gravity: f32,

    // === Ground sensor ===
    pub ray_offsets: Vec<f32>,
    pub ray_length: u32,
    /// How far above the sensed surface still counts as grounded
    pub ground_grace_px: f32,

    // === Ground snap ===
    pub ground_snap_strength: f32,
    pub max_snap_per_frame: f32,

    // === Jump ===
    pub jump_pow: f32,
    /// Landing checks are skipped for this long after launch
    pub jump_land_ignore_time: f32,
    /// Jump overlay is forced off after this long (0 = until landing)
    pub jump_max_lock_time: f32,
    /// Upward 1 px nudges allowed when resolving a landing
    pub landing_retries: u32,

    // === Presentation ===
    pub render_follow_speed: f32,
    pub render_snap_dist: f32,
    pub draw_size: [u32; 2],
    /// Offset along the slope normal applied to the blit while grounded
    pub ground_offset: f32,
    /// Animation speed per unit of horizontal speed
    pub anim_speed_scale: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            radius: 20.0,

            walk_accel: 0.25,
            walk_friction: 0.12,
            walk_max_speed: 5.0,

            roll_friction: 0.02,
            roll_gravity: 0.4,
            roll_radius_px: 250.0,

            gravity: 0.5,

            ray_offsets: vec![-40.0, -20.0, 0.0, 20.0, 40.0],
            ray_length: 80,
            ground_grace_px: 6.0,

            ground_snap_strength: 0.28,
            max_snap_per_frame: 10.0,

            jump_pow: 10.0,
            jump_land_ignore_time: 0.08,
            jump_max_lock_time: 0.0,
            landing_retries: 10,

            render_follow_speed: 18.0,
            render_snap_dist: 90.0,
            draw_size: [100, 100],
            ground_offset: -15.0,
            anim_speed_scale: 0.3 * 0.2,
        }
    }
}

impl Tuning {
    /// Check the invariants a character relies on
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(Error::InvalidRadius(self.radius));
        }
        let [width, height] = self.draw_size;
        if width == 0 || height == 0 {
            return Err(Error::InvalidDrawSize { width, height });
        }
        if self.ray_offsets.iter().any(|o| !o.is_finite()) {
            return Err(Error::Tuning("ray offsets must be finite".into()));
        }
        if !(self.roll_radius_px.is_finite() && self.roll_radius_px > 0.0) {
            return Err(Error::Tuning(format!(
                "roll radius must be positive, got {}",
                self.roll_radius_px
            )));
        }
        if !(0.0..=1.0).contains(&self.ground_snap_strength) {
            return Err(Error::Tuning(format!(
                "ground snap strength must be within [0, 1], got {}",
                self.ground_snap_strength
            )));
        }
        Ok(())
    }
}

/// Level-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,

    /// World to mask translation shared by every terrain consumer
    pub surface_offset: IVec2,

    /// Intro countdown, drained at 0.01 per elapsed millisecond
    pub intro_timer: f32,

    pub debug_overlay: DebugOverlay,

    // === Demo ===
    pub demo_ticks: u32,
    pub demo_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            surface_offset: IVec2::ZERO,
            intro_timer: 10.0,
            debug_overlay: DebugOverlay::Off,
            demo_ticks: 600,
            demo_seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.tuning.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
