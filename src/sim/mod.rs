//! Deterministic character simulation
//!
//! All gameplay physics lives here. This module must stay pure and
//! deterministic:
//! - Elapsed time is supplied by the caller, never measured
//! - Input arrives as a sampled snapshot
//! - The terrain is borrowed read-only
//! - No rendering or platform dependencies

pub mod animation;
pub mod mask;
pub mod pose;
pub mod sensor;
pub mod state;
pub mod tick;

pub use animation::{Animation, FrameHandle};
pub use mask::{DEFAULT_ALPHA_THRESHOLD, Mask, TerrainMask};
pub use pose::{DrawPose, follow, follow_alpha};
pub use sensor::{GroundSensor, RayTrace, SlopeLine, closest_hit, slope_from_hits};
pub use state::{
    AnimationSet, Character, CharacterSprites, Facing, InputSnapshot, MovementState,
};
pub use tick::{TickDiagnostics, snap_toward};
