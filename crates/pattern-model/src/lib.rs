//! GlowGrid Pattern Model
//!
//! Defines the core data contracts for GlowGrid patterns:
//! - **Pixels:** `Rgb` and the row-major `PixelBuffer` every transform works on
//! - **Actions:** time-windowed automation steps with a fixed priority
//! - **Layers:** sparse frame storage plus compositing settings
//! - **Pattern:** the project root, persisted as `*.glowgrid.json`
//! - **Editing:** the render/edit gate and the edit isolation guard
//!
//! Frame indices are absolute and zero-based. Reading a frame that does not
//! exist never creates it; frames come into being only through
//! [`Editor::create_frame`] and [`Editor::append_baked_frames`].

pub mod action;
pub mod edit;
pub mod error;
pub mod frame;
pub mod gate;
pub mod invariants;
pub mod layer;
pub mod pattern;
pub mod pixel;

pub use action::*;
pub use edit::*;
pub use error::*;
pub use frame::*;
pub use gate::*;
pub use layer::*;
pub use pattern::*;
pub use pixel::*;
