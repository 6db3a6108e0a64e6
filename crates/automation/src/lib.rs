//! GlowGrid Automation — the transform pipeline
//!
//! Turns a base frame plus a layer's time-windowed actions into the pixels
//! for one absolute frame index:
//! - **Transforms:** one pure function per action kind
//! - **Parameters:** typed, validated views over free-form action params
//! - **Pipeline:** selects active actions, orders them by fixed priority and
//!   applies them in sequence
//!
//! Nothing here touches a pattern in place: every transform reads a
//! `PixelBuffer` and returns a new one, so results depend only on the base
//! pixels, the action list and the frame index.

pub mod error;
pub mod params;
pub mod pipeline;
pub mod transforms;

pub use error::{parse_action_kind, TransformError};
pub use pipeline::{
    evaluate_alpha, evaluate_pipeline, evaluate_pipeline_detailed, schedule, Evaluation,
    ScheduledAction, SkippedAction,
};
pub use transforms::{apply_transform, transform_fn, TransformFn};
