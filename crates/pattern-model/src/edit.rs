//! Edit isolation guard.
//!
//! Every mutation of frame data goes through an [`Editor`], which is bound to
//! one [`EditContext`] (one active layer and frame). Each operation names its
//! target layer explicitly and is validated against the context before any
//! data is touched:
//!
//! ```text
//! Idle -> Validating -> Applying -> Idle
//!              |
//!              +-> Rejected (EditError::Isolation)
//! ```
//!
//! Frames are never created implicitly. Reads that miss return
//! [`EditError::FrameNotFound`].

use std::ops::Range;

use crate::error::{EditError, IsolationViolation};
use crate::frame::Frame;
use crate::gate::EditModeGuard;
use crate::invariants::{self, PatternSnapshot};
use crate::layer::{LayerId, LayerTrack};
use crate::pattern::Pattern;
use crate::pixel::{PixelBuffer, Rgb};

/// The active edit target. Built fresh whenever the selection changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditContext {
    pub active_layer_id: LayerId,
    pub active_frame_index: u32,
    pub width: u32,
    pub height: u32,
}

impl EditContext {
    pub fn new(active_layer_id: LayerId, active_frame_index: u32, width: u32, height: u32) -> Self {
        Self {
            active_layer_id,
            active_frame_index,
            width,
            height,
        }
    }

    /// Context using the pattern's matrix dimensions.
    pub fn for_pattern(pattern: &Pattern, active_layer_id: LayerId, active_frame_index: u32) -> Self {
        Self::new(
            active_layer_id,
            active_frame_index,
            pattern.width(),
            pattern.height(),
        )
    }

    pub fn validate(&self) -> Result<(), EditError> {
        if self.width == 0 || self.height == 0 {
            return Err(EditError::InvalidContext(format!(
                "matrix dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    fn check_dimensions(&self, pixels: &PixelBuffer) -> Result<(), EditError> {
        if pixels.dimensions() != (self.width, self.height) {
            return Err(EditError::DimensionMismatch {
                width: self.width,
                height: self.height,
                actual_width: pixels.width(),
                actual_height: pixels.height(),
            });
        }
        Ok(())
    }
}

/// Read-only frame access. Usable at any time, including during a render.
pub fn get_frame_for_read(layer: &LayerTrack, frame_index: u32) -> Result<&Frame, EditError> {
    layer.frame(frame_index).ok_or(EditError::FrameNotFound {
        layer: layer.id,
        frame_index,
    })
}

/// Exclusive, context-bound write access to a pattern's frame data.
///
/// Holding an `Editor` keeps the pattern's gate in edit mode, so renders
/// sharing the gate are refused until it is dropped.
#[derive(Debug)]
pub struct Editor<'a> {
    pattern: &'a mut Pattern,
    ctx: EditContext,
    frame_duration_ms: u32,
    _guard: EditModeGuard,
}

impl<'a> Editor<'a> {
    pub(crate) fn new(pattern: &'a mut Pattern, ctx: EditContext, guard: EditModeGuard) -> Self {
        Self {
            pattern,
            ctx,
            frame_duration_ms: Frame::DEFAULT_DURATION_MS,
            _guard: guard,
        }
    }

    /// Duration given to frames created by [`Editor::create_frame`].
    pub fn with_frame_duration(mut self, duration_ms: u32) -> Self {
        self.frame_duration_ms = duration_ms;
        self
    }

    pub fn context(&self) -> &EditContext {
        &self.ctx
    }

    pub fn pattern(&self) -> &Pattern {
        &*self.pattern
    }

    /// Validating step shared by every operation.
    fn target(&mut self, layer: LayerId) -> Result<&mut LayerTrack, EditError> {
        if layer != self.ctx.active_layer_id {
            return Err(IsolationViolation::WrongLayer {
                target: layer,
                active: self.ctx.active_layer_id,
            }
            .into());
        }
        if self.pattern.gate().is_rendering() {
            return Err(IsolationViolation::RenderInProgress.into());
        }
        let track = self
            .pattern
            .layer_mut(layer)
            .ok_or(EditError::LayerNotFound(layer))?;
        if track.locked {
            return Err(IsolationViolation::LayerLocked(layer).into());
        }
        Ok(track)
    }

    fn snapshot(&self) -> Option<PatternSnapshot> {
        cfg!(debug_assertions).then(|| PatternSnapshot::capture(&*self.pattern))
    }

    /// Debug builds verify that only the target layer changed and that its
    /// frame count moved by exactly `frame_delta`.
    fn verify(
        &self,
        before: Option<PatternSnapshot>,
        layer: LayerId,
        frame_delta: i64,
    ) -> Result<(), EditError> {
        if let Some(before) = before {
            let after = PatternSnapshot::capture(&*self.pattern);
            invariants::assert_only_layer_changed(&before, &after, layer)?;
            invariants::assert_frame_count_change(&before, &after, layer, frame_delta)?;
        }
        Ok(())
    }

    /// Create the frame at the active index. `None` creates a black frame.
    pub fn create_frame(
        &mut self,
        layer: LayerId,
        initial_pixels: Option<PixelBuffer>,
    ) -> Result<&mut Frame, EditError> {
        let ctx = self.ctx;
        let pixels = match initial_pixels {
            Some(pixels) => {
                pixels.validate()?;
                ctx.check_dimensions(&pixels)?;
                pixels
            }
            None => PixelBuffer::new(ctx.width, ctx.height),
        };
        let duration_ms = self.frame_duration_ms;
        let before = self.snapshot();

        let track = self.target(layer)?;
        if track.has_frame(ctx.active_frame_index) {
            return Err(EditError::FrameAlreadyExists {
                layer,
                frame_index: ctx.active_frame_index,
            });
        }
        track
            .frames_mut()
            .insert(ctx.active_frame_index, Frame::new(pixels, duration_ms));
        tracing::debug!(layer = %layer, frame = ctx.active_frame_index, "created frame");

        self.verify(before, layer, 1)?;
        self.frame_for_edit(layer)
    }

    /// Mutable access to the existing active frame. Never creates it.
    pub fn frame_for_edit(&mut self, layer: LayerId) -> Result<&mut Frame, EditError> {
        let frame_index = self.ctx.active_frame_index;
        self.target(layer)?
            .frames_mut()
            .get_mut(&frame_index)
            .ok_or(EditError::FrameNotFound { layer, frame_index })
    }

    pub fn set_pixel(&mut self, layer: LayerId, x: u32, y: u32, colour: Rgb) -> Result<(), EditError> {
        let (width, height) = (self.ctx.width, self.ctx.height);
        let before = self.snapshot();
        let frame = self.frame_for_edit(layer)?;
        if !frame.pixels.set(x, y, colour) {
            return Err(EditError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        // Painting makes the pixel opaque.
        if let Some(alpha) = frame.alpha.as_mut() {
            if let Some(a) = alpha.get_mut((y * width + x) as usize) {
                *a = u8::MAX;
            }
        }
        self.verify(before, layer, 0)
    }

    /// Set one pixel's alpha, materialising an opaque channel first if the
    /// frame has none.
    pub fn set_alpha(&mut self, layer: LayerId, x: u32, y: u32, alpha: u8) -> Result<(), EditError> {
        let (width, height) = (self.ctx.width, self.ctx.height);
        if x >= width || y >= height {
            return Err(EditError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        let before = self.snapshot();
        let frame = self.frame_for_edit(layer)?;
        frame.validate_alpha()?;
        let len = frame.pixels.len();
        let channel = frame.alpha.get_or_insert_with(|| vec![u8::MAX; len]);
        if let Some(a) = channel.get_mut((y * width + x) as usize) {
            *a = alpha;
        }
        self.verify(before, layer, 0)
    }

    /// Replace the active frame's pixels wholesale.
    pub fn replace_pixels(&mut self, layer: LayerId, pixels: PixelBuffer) -> Result<(), EditError> {
        pixels.validate()?;
        self.ctx.check_dimensions(&pixels)?;
        let before = self.snapshot();
        self.frame_for_edit(layer)?.pixels = pixels;
        self.verify(before, layer, 0)
    }

    /// Fill the active frame with black.
    pub fn clear(&mut self, layer: LayerId) -> Result<(), EditError> {
        let before = self.snapshot();
        self.frame_for_edit(layer)?.pixels.fill(Rgb::BLACK);
        self.verify(before, layer, 0)
    }

    /// Delete the active frame, returning it.
    pub fn delete_frame(&mut self, layer: LayerId) -> Result<Frame, EditError> {
        let frame_index = self.ctx.active_frame_index;
        let before = self.snapshot();
        let removed = self
            .target(layer)?
            .frames_mut()
            .remove(&frame_index)
            .ok_or(EditError::FrameNotFound { layer, frame_index })?;
        tracing::debug!(layer = %layer, frame = frame_index, "deleted frame");
        self.verify(before, layer, -1)?;
        Ok(removed)
    }

    /// Append frames after the layer's last frame, in order. Nothing is
    /// written unless every frame matches the matrix dimensions. Returns the
    /// absolute indices that were filled.
    pub fn append_baked_frames(
        &mut self,
        layer: LayerId,
        frames: Vec<Frame>,
    ) -> Result<Range<u32>, EditError> {
        for frame in &frames {
            frame.pixels.validate()?;
            frame.validate_alpha()?;
            self.ctx.check_dimensions(&frame.pixels)?;
        }
        let count = u32::try_from(frames.len()).map_err(|_| {
            EditError::InvalidContext(format!("cannot append {} frames to one layer", frames.len()))
        })?;
        let before = self.snapshot();

        let track = self.target(layer)?;
        let start = track.frame_count();
        let end = start.checked_add(count).ok_or_else(|| {
            EditError::InvalidContext(format!(
                "appending {count} frames after index {start} overflows the frame index range"
            ))
        })?;
        let storage = track.frames_mut();
        for (index, frame) in (start..end).zip(frames) {
            storage.insert(index, frame);
        }
        tracing::debug!(layer = %layer, start, count, "appended baked frames");

        self.verify(before, layer, i64::from(count))?;
        Ok(start..end)
    }

    /// Mark every action on `layer` finalized. Runs under the same guard as
    /// the frame edits, so a bake can append and finalize in one step.
    pub fn finalize_actions(&mut self, layer: LayerId) -> Result<usize, EditError> {
        let before = self.snapshot();
        let finalized = self.target(layer)?.finalize_actions();
        tracing::debug!(layer = %layer, finalized, "finalized actions");
        self.verify(before, layer, 0)?;
        Ok(finalized)
    }
}
