//! Character state and construction
//!
//! Everything the per-tick update mutates lives on [`Character`]. Diagnostic
//! traces are returned from the update instead of being stored here.

use glam::Vec2;

use super::animation::{Animation, FrameHandle};
use super::mask::Mask;
use super::sensor::GroundSensor;
use crate::error::{Error, Result};
use crate::settings::Tuning;

/// Locomotion mode. Jumping is an overlay on top of either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementState {
    Walking,
    Rolling,
}

impl MovementState {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            MovementState::Walking => 0,
            MovementState::Rolling => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Keys held this tick, sampled once by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub jump: bool,
    pub quit: bool,
}

/// Frames and collision shape supplied by the asset loader
#[derive(Debug, Clone)]
pub struct CharacterSprites {
    pub walk: Vec<FrameHandle>,
    pub roll: Vec<FrameHandle>,
    /// Solid pixels of the rolling pose, any size; scaled to the draw size
    pub roll_silhouette: Mask,
}

/// Walk and roll animation speeds before velocity takes over
const WALK_ANIM_SPEED: f32 = 8.0;
const ROLL_ANIM_SPEED: f32 = 12.0;

/// One animation per movement state
#[derive(Debug, Clone)]
pub struct AnimationSet {
    animations: [Animation; 2],
}

impl AnimationSet {
    pub fn new(walk: Vec<FrameHandle>, roll: Vec<FrameHandle>) -> Result<Self> {
        let walk = Animation::new(walk, WALK_ANIM_SPEED)
            .ok_or(Error::EmptyAnimation(MovementState::Walking))?;
        let roll = Animation::new(roll, ROLL_ANIM_SPEED)
            .ok_or(Error::EmptyAnimation(MovementState::Rolling))?;
        Ok(Self {
            animations: [walk, roll],
        })
    }

    #[inline]
    pub fn get(&self, state: MovementState) -> &Animation {
        &self.animations[state.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, state: MovementState) -> &mut Animation {
        &mut self.animations[state.index()]
    }
}

/// The player character
#[derive(Debug, Clone)]
pub struct Character {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Smoothed follower of `position`, presentation only
    pub render_position: Vec2,
    pub on_ground: bool,
    /// Radians; only meaningful while `on_ground`
    pub slope_angle: f32,
    pub facing: Facing,
    pub state: MovementState,
    /// Jump overlay: no ground sensing, mask landing instead
    pub jumping: bool,
    /// Degrees in [0, 360)
    pub roll_spin_degrees: f32,
    /// Seconds until landing checks resume
    pub jump_land_ignore_timer: f32,
    /// Seconds until the jump overlay is forced off
    pub jump_lock_timer: f32,

    pub(crate) tuning: Tuning,
    pub(crate) sensor: GroundSensor,
    pub(crate) animations: AnimationSet,
    /// Roll silhouette at draw size, facing right
    pub(crate) silhouette_right: Mask,
    pub(crate) silhouette_left: Mask,
}

impl Character {
    /// Create a character standing at `position`.
    ///
    /// Fails on a non-positive radius, an empty animation or an empty
    /// collision silhouette.
    pub fn new(position: Vec2, tuning: Tuning, sprites: CharacterSprites) -> Result<Self> {
        tuning.validate()?;
        let animations = AnimationSet::new(sprites.walk, sprites.roll)?;

        let [width, height] = tuning.draw_size;
        let silhouette_right = sprites.roll_silhouette.scaled(width, height);
        if silhouette_right.is_empty() {
            return Err(Error::EmptySilhouette);
        }
        let silhouette_left = silhouette_right.flipped_horizontal();

        let sensor = GroundSensor::new(tuning.ray_offsets.clone(), tuning.ray_length);

        log::debug!(
            "Character created at ({:.1}, {:.1}) radius {}",
            position.x,
            position.y,
            tuning.radius
        );

        Ok(Self {
            position,
            velocity: Vec2::ZERO,
            render_position: position,
            on_ground: false,
            slope_angle: 0.0,
            facing: Facing::Right,
            state: MovementState::Walking,
            jumping: false,
            roll_spin_degrees: 0.0,
            jump_land_ignore_timer: 0.0,
            jump_lock_timer: 0.0,
            tuning,
            sensor,
            animations,
            silhouette_right,
            silhouette_left,
        })
    }

    /// Placeholder frames (two walk, one roll) and a disc silhouette matching
    /// the collision radius
    pub fn with_placeholder_sprites(position: Vec2, tuning: Tuning) -> Result<Self> {
        let [width, height] = tuning.draw_size;
        let sprites = CharacterSprites {
            walk: vec![FrameHandle(0), FrameHandle(1)],
            roll: vec![FrameHandle(2)],
            roll_silhouette: Mask::centered_disc(width, height, tuning.radius),
        };
        Self::new(position, tuning, sprites)
    }

    /// Animation for the current state
    #[inline]
    pub fn current_animation(&self) -> &Animation {
        self.animations.get(self.state)
    }

    #[inline]
    pub fn animation(&self, state: MovementState) -> &Animation {
        self.animations.get(state)
    }

    /// Collision silhouette for the current facing
    #[inline]
    pub fn silhouette(&self) -> &Mask {
        match self.facing {
            Facing::Right => &self.silhouette_right,
            Facing::Left => &self.silhouette_left,
        }
    }
}
