//! Presentation pose
//!
//! The render position trails the physics position so snaps and landing
//! nudges read as motion instead of pops. Rotation combines the slope with
//! the roll spin.

use glam::Vec2;

use super::animation::FrameHandle;
use super::state::{Character, Facing, MovementState};
use crate::consts::RENDER_FOLLOW_BASE;
use crate::{rotated_extents, slope_normal};

/// Everything a renderer needs to composite the character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawPose {
    pub frame: FrameHandle,
    /// Counter-clockwise degrees
    pub rotation_degrees: f32,
    /// Mirror horizontally after rotating
    pub flip_x: bool,
    /// Size of the rotated image's bounding box
    pub extents: Vec2,
    /// Top-left corner of the rotated image
    pub blit_position: Vec2,
}

/// Exponential follow factor for one step
#[inline]
pub fn follow_alpha(follow_speed: f32, elapsed_s: f32) -> f32 {
    1.0 - RENDER_FOLLOW_BASE.powf(follow_speed * elapsed_s)
}

/// One smoothing step of `render` toward `target`. Gaps wider than
/// `snap_dist` jump straight to the target.
pub fn follow(render: Vec2, target: Vec2, follow_speed: f32, snap_dist: f32, elapsed_s: f32) -> Vec2 {
    let delta = target - render;
    if delta.length() > snap_dist {
        return target;
    }
    render + delta * follow_alpha(follow_speed, elapsed_s)
}

impl Character {
    pub(crate) fn update_render_position(&mut self, elapsed_s: f32) {
        self.render_position = follow(
            self.render_position,
            self.position,
            self.tuning.render_follow_speed,
            self.tuning.render_snap_dist,
            elapsed_s,
        );
    }

    /// Slope plus spin in degrees, signed for the facing
    pub fn rotation_degrees(&self) -> f32 {
        let slope = if self.on_ground {
            self.slope_angle.to_degrees()
        } else {
            0.0
        };
        let spin = if self.state == MovementState::Rolling {
            self.roll_spin_degrees
        } else {
            0.0
        };
        match self.facing {
            Facing::Right => -(slope + spin),
            Facing::Left => slope + spin,
        }
    }

    /// Pose for this frame
    pub fn draw_pose(&self) -> DrawPose {
        let [w, h] = self.tuning.draw_size;
        let rotation_degrees = self.rotation_degrees();
        let extents = rotated_extents(Vec2::new(w as f32, h as f32), rotation_degrees);

        let mut blit_position = self.render_position - extents * 0.5;
        if self.on_ground {
            blit_position += slope_normal(self.slope_angle) * self.tuning.ground_offset;
        }

        DrawPose {
            frame: self.current_animation().current(),
            rotation_degrees,
            flip_x: self.facing == Facing::Left,
            extents,
            blit_position,
        }
    }
}
