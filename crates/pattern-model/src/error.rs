//! Errors raised by the pattern model and the edit isolation guard.

use std::path::PathBuf;

use crate::layer::LayerId;
use crate::pixel::PixelBufferError;

/// Structural problems with model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("action window is inverted: end_frame {end_frame} < start_frame {start_frame}")]
    InvalidWindow { start_frame: u32, end_frame: u32 },

    #[error("parameter assignment '{0}' must look like key=value")]
    InvalidParamAssignment(String),

    #[error("layer {0} does not exist")]
    LayerNotFound(LayerId),

    #[error("action index {index} is out of range for layer {layer} ({count} actions)")]
    ActionIndexOutOfRange {
        layer: LayerId,
        index: usize,
        count: usize,
    },

    #[error(transparent)]
    Pixels(#[from] PixelBufferError),

    #[error("cannot change layer settings: {0}")]
    Isolation(#[from] IsolationViolation),
}

/// A mutation that would cross the boundary of the active edit target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IsolationViolation {
    #[error("attempted to edit layer {target}, but active layer is {active}")]
    WrongLayer { target: LayerId, active: LayerId },

    #[error("cannot perform edit operations while a render is in progress")]
    RenderInProgress,

    #[error("another edit is already in progress on this pattern")]
    EditInProgress,

    #[error("layer {0} is locked")]
    LayerLocked(LayerId),

    #[error("layer {mutated} was mutated, but active layer is {active}")]
    CrossLayerMutation { mutated: LayerId, active: LayerId },

    #[error("frame count of layer {layer} changed by {actual}, expected {expected}")]
    UnexpectedFrameCount {
        layer: LayerId,
        expected: i64,
        actual: i64,
    },

    #[error("layer data changed during a read-only render")]
    RenderMutated,
}

/// Errors from explicit frame lifecycle and edit operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("frame {frame_index} does not exist in layer {layer}; create it first")]
    FrameNotFound { layer: LayerId, frame_index: u32 },

    #[error("frame {frame_index} already exists in layer {layer}")]
    FrameAlreadyExists { layer: LayerId, frame_index: u32 },

    #[error("isolation violation: {0}")]
    Isolation(#[from] IsolationViolation),

    #[error("invalid edit context: {0}")]
    InvalidContext(String),

    #[error("layer {0} does not exist")]
    LayerNotFound(LayerId),

    #[error("pixel ({x}, {y}) is outside the {width}x{height} matrix")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("pixels are {actual_width}x{actual_height}, matrix is {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error(transparent)]
    Pixels(#[from] PixelBufferError),
}

impl EditError {
    pub fn is_isolation_violation(&self) -> bool {
        matches!(self, EditError::Isolation(_))
    }
}

/// Errors that can occur when loading or saving pattern files.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid pattern: {message}")]
    ValidationError { message: String },
}
