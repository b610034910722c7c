use crate::Identity;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid field dimensions {width}x{height}")]
    InvalidField { width: f32, height: f32 },

    #[error("heatmap bins must be between 1 and 4096")]
    InvalidBins,

    #[error("distance threshold must be positive and finite, got {0}")]
    InvalidThreshold(f32),

    #[error("recent track buffer capacity must be non-zero")]
    InvalidCapacity,

    #[error("invalid bounding box ({x1}, {y1}, {x2}, {y2})")]
    InvalidBox { x1: f32, y1: f32, x2: f32, y2: f32 },

    #[error("position ({x}, {y}) lies outside the {width}x{height} field")]
    PositionOutOfField {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },

    #[error("frame is {got:?} but the session field is {expected:?}")]
    FrameDims {
        expected: (u32, u32),
        got: (u32, u32),
    },

    #[error("unknown identity {0}")]
    UnknownIdentity(Identity),

    #[error("session is stopped")]
    Stopped,

    #[error("assignment could not be solved: {0}")]
    Assignment(String),
}
