//! Crate error type
//!
//! Simulation itself never fails; these are construction and loading errors.

use thiserror::Error;

use crate::sim::MovementState;

/// Errors raised while building a character, a mask or loading settings.
#[derive(Debug, Error)]
pub enum Error {
    #[error("collision radius must be positive and finite, got {0}")]
    InvalidRadius(f32),

    #[error("animation for {0:?} has no frames")]
    EmptyAnimation(MovementState),

    #[error("collision silhouette has no solid pixels")]
    EmptySilhouette,

    #[error("draw size must be at least 1x1, got {width}x{height}")]
    InvalidDrawSize { width: u32, height: u32 },

    #[error("mask data length {actual} does not match {width}x{height}")]
    MaskSize {
        width: u32,
        height: u32,
        actual: usize,
    },

    #[error("invalid tuning: {0}")]
    Tuning(String),

    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
