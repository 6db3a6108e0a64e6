//! GlowGrid Render Engine
//!
//! The two consumers of the automation pipeline:
//!
//! - **Baked mode** ([`generator`]): evaluate a layer's actions at a run of
//!   frame indices and store the results as real frames.
//! - **Live mode** ([`live`]): evaluate every layer on the fly and blend the
//!   results into one output frame, without writing anything back.
//!
//! Both call the same `evaluate_pipeline`, so for a single opaque layer the
//! baked frame `i` and the live render of index `i` are identical.
//!
//! # Pipeline Architecture
//!
//! ```text
//!                    ┌──────────────── live ────────────────┐
//! layer frames ──┐   │                                      │
//!                ├── evaluate_pipeline(frame, actions, i) ──┼── blend (z order) ── output
//! layer actions ─┘   │                                      │
//!                    └──────────────── baked ───────────────┘
//!                                        │
//!                                        ▼
//!                      ┌──────────── one edit guard ────────────┐
//!                      │ append_baked_frames → finalize_actions │
//!                      └────────────────────────────────────────┘
//! ```

pub mod background;
pub mod blend;
pub mod generator;
pub mod live;

pub use background::bake_in_background;
pub use blend::{blend_channel, blend_pixel, KeyedOverwrite, LayerBlend, StandardBlend};
pub use generator::{
    bake_layer, generate_frames, BakeOutcome, BakeRequest, CancellationToken, GenerationError,
    GenerationOptions, GenerationProgress, ProgressCallback,
};
pub use live::{render_composite_frame, LiveRenderer, RenderError, RenderOptions, Strictness};
