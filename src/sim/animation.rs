//! Sprite frame animation

use crate::consts::REFERENCE_FRAME_MS;

/// Opaque image id owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u32);

/// A looping frame sequence with a fractional play-head
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<FrameHandle>,
    /// Frames advanced per reference frame
    pub speed: f32,
    index: f32,
}

impl Animation {
    /// Returns `None` for an empty frame list
    pub fn new(frames: Vec<FrameHandle>, speed: f32) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            frames,
            speed,
            index: 0.0,
        })
    }

    /// Advance the play-head by `elapsed_ms`.
    ///
    /// Overflowing the last frame resets to the first frame instead of
    /// wrapping by the overshoot, so a large step shows frame 0.
    pub fn advance(&mut self, elapsed_ms: f32) {
        let step = self.speed * (elapsed_ms / REFERENCE_FRAME_MS);
        if step.is_finite() && step > 0.0 {
            self.index += step;
        }
        if self.index >= self.frames.len() as f32 || !self.index.is_finite() {
            self.index = 0.0;
        }
    }

    /// Play-head position
    #[inline]
    pub fn index(&self) -> f32 {
        self.index
    }

    /// Index of the displayed frame
    #[inline]
    pub fn frame_index(&self) -> usize {
        (self.index as usize).min(self.frames.len() - 1)
    }

    /// Currently displayed frame
    #[inline]
    pub fn current(&self) -> FrameHandle {
        self.frames[self.frame_index()]
    }
}
