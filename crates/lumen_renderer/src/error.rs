//! Errors surfaced by the render entry points.
//!
//! Light transport itself never fails; these cover the caller-side buffer
//! contract and the worker pool.

use thiserror::Error;

/// Errors that can occur when setting up or running a render.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Frame must be at least 1x1, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    #[error("Unsupported bytes per pixel: {0} (expected 3 or 4)")]
    UnsupportedPixelSize(usize),

    #[error("Row stride of {stride} bytes cannot hold a row of {row_bytes} bytes")]
    StrideTooSmall { stride: usize, row_bytes: usize },

    #[error("Pixel buffer holds {actual} bytes but the frame needs {required}")]
    BufferTooSmall { actual: usize, required: usize },

    #[error("Workers stopped after delivering {received} of {expected} rows")]
    IncompleteFrame { received: u32, expected: u32 },
}

pub type RenderResult<T> = Result<T, RenderError>;
