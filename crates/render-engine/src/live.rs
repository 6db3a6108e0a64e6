//! Live-mode compositing.
//!
//! Renders one output frame by evaluating every visible layer's pipeline at
//! the absolute frame index and blending the results bottom to top. Nothing
//! is written back to the pattern; the render guard on the mode gate keeps
//! edits out for the duration.

use std::ops::Range;

use glowgrid_automation::{evaluate_alpha, evaluate_pipeline};
use glowgrid_common::config::AutomationConfig;
use glowgrid_pattern_model::{IsolationViolation, LayerId, LayerTrack, ModeGate, Pattern, PixelBuffer};
use serde::{Deserialize, Serialize};

use crate::blend::{KeyedOverwrite, LayerBlend, StandardBlend};

/// What to do when a visible layer has no frame at the rendered index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Treat the layer as transparent.
    #[default]
    Lenient,
    /// Fail the render.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub strictness: Strictness,
}

impl RenderOptions {
    pub fn from_config(config: &AutomationConfig) -> Self {
        Self {
            strictness: if config.strict_missing_frames {
                Strictness::Strict
            } else {
                Strictness::Lenient
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Isolation(#[from] IsolationViolation),

    #[error("invalid output size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("layer {layer} has no frame {frame_index}")]
    FrameNotFound { layer: LayerId, frame_index: u32 },

    #[error("layer {layer} frame {frame_index} is {actual_width}x{actual_height}, expected {width}x{height}")]
    DimensionMismatch {
        layer: LayerId,
        frame_index: u32,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("layer {layer} frame {frame_index} has corrupt pixel data: {reason}")]
    CorruptFrame {
        layer: LayerId,
        frame_index: u32,
        reason: String,
    },
}

/// Composite `layers` at `frame_index` into a fresh `width`x`height` buffer.
///
/// Layers are drawn in ascending `z_index`, ties in slice order. A layer is
/// skipped when it is outside its own frame window, hidden, or (leniently)
/// missing a frame at the index.
pub fn render_composite_frame(
    gate: &ModeGate,
    layers: &[LayerTrack],
    frame_index: u32,
    width: u32,
    height: u32,
    blend: &dyn LayerBlend,
    options: &RenderOptions,
) -> Result<PixelBuffer, RenderError> {
    let _guard = gate.enter_render()?;
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }

    let mut ordered: Vec<&LayerTrack> = layers.iter().collect();
    ordered.sort_by_key(|l| l.z_index);

    let mut output = PixelBuffer::new(width, height);
    let mut drawn = 0usize;
    for layer in ordered {
        if !layer.is_active_at(frame_index) {
            continue;
        }
        let Some(frame) = layer.frame(frame_index) else {
            if layer.visible && options.strictness == Strictness::Strict {
                return Err(RenderError::FrameNotFound {
                    layer: layer.id,
                    frame_index,
                });
            }
            tracing::debug!(layer = %layer.id, frame = frame_index, "no frame, layer transparent");
            continue;
        };
        if !frame.effective_visible(layer.visible) {
            continue;
        }

        if frame.pixels.dimensions() != (width, height) {
            return Err(RenderError::DimensionMismatch {
                layer: layer.id,
                frame_index,
                width,
                height,
                actual_width: frame.pixels.width(),
                actual_height: frame.pixels.height(),
            });
        }
        frame
            .pixels
            .validate()
            .and_then(|()| frame.validate_alpha())
            .map_err(|e| RenderError::CorruptFrame {
                layer: layer.id,
                frame_index,
                reason: e.to_string(),
            })?;

        let evaluated = evaluate_pipeline(&frame.pixels, layer.actions(), frame_index);
        let alpha = evaluate_alpha(frame, layer.actions(), frame_index);
        blend.blend(
            &mut output,
            &evaluated,
            alpha.as_deref(),
            layer.blend_mode,
            frame.effective_opacity(layer.opacity),
        );
        drawn += 1;
    }

    tracing::debug!(frame = frame_index, layers = drawn, blend = blend.name(), "composited frame");
    Ok(output)
}

/// Renders frames of a whole pattern with a fixed blend strategy.
pub struct LiveRenderer {
    blend: Box<dyn LayerBlend>,
    options: RenderOptions,
}

impl std::fmt::Debug for LiveRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveRenderer")
            .field("blend", &self.blend.name())
            .field("options", &self.options)
            .finish()
    }
}

impl Default for LiveRenderer {
    fn default() -> Self {
        Self::standard()
    }
}

impl LiveRenderer {
    pub fn new(blend: Box<dyn LayerBlend>, options: RenderOptions) -> Self {
        Self { blend, options }
    }

    pub fn standard() -> Self {
        Self::new(Box::new(StandardBlend), RenderOptions::default())
    }

    pub fn keyed() -> Self {
        Self::new(Box::new(KeyedOverwrite), RenderOptions::default())
    }

    pub fn from_config(config: &AutomationConfig) -> Self {
        Self::new(Box::new(StandardBlend), RenderOptions::from_config(config))
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn blend_name(&self) -> &str {
        self.blend.name()
    }

    pub fn render_frame(&self, pattern: &Pattern, frame_index: u32) -> Result<PixelBuffer, RenderError> {
        render_composite_frame(
            pattern.gate(),
            pattern.layers(),
            frame_index,
            pattern.width(),
            pattern.height(),
            self.blend.as_ref(),
            &self.options,
        )
    }

    /// Render each index in `frames`, stopping at the first error.
    pub fn render_range(&self, pattern: &Pattern, frames: Range<u32>) -> Result<Vec<PixelBuffer>, RenderError> {
        tracing::info!(
            pattern = %pattern.name,
            start = frames.start,
            end = frames.end,
            blend = self.blend.name(),
            "Rendering frames"
        );
        frames.map(|f| self.render_frame(pattern, f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowgrid_pattern_model::{Action, ActionKind, BlendMode, EditContext, Rgb};

    fn two_layer_pattern() -> (Pattern, LayerId, LayerId) {
        let mut pattern = Pattern::with_blank_frame("live", 4, 1, 10, 100);
        let bottom = pattern.layers()[0].id;
        let top = pattern.add_layer("Top").unwrap();

        let ctx = EditContext::for_pattern(&pattern, bottom, 0);
        pattern.editor(ctx).unwrap().set_pixel(bottom, 0, 0, Rgb::RED).unwrap();
        let ctx = EditContext::for_pattern(&pattern, top, 0);
        let mut editor = pattern.editor(ctx).unwrap();
        editor.create_frame(top, None).unwrap();
        editor.set_pixel(top, 1, 0, Rgb::BLUE).unwrap();
        drop(editor);
        (pattern, bottom, top)
    }

    #[test]
    fn test_keyed_composite_keeps_both_layers() {
        let (pattern, _, _) = two_layer_pattern();
        let out = LiveRenderer::keyed().render_frame(&pattern, 0).unwrap();
        assert_eq!(out.get(0, 0), Some(Rgb::RED));
        assert_eq!(out.get(1, 0), Some(Rgb::BLUE));
    }

    #[test]
    fn test_normal_top_layer_covers_bottom() {
        let (pattern, _, _) = two_layer_pattern();
        let out = LiveRenderer::standard().render_frame(&pattern, 0).unwrap();
        assert_eq!(out.get(0, 0), Some(Rgb::BLACK));
        assert_eq!(out.get(1, 0), Some(Rgb::BLUE));
    }

    #[test]
    fn test_transparent_top_pixel_leaves_bottom_visible() {
        let (mut pattern, _, top) = two_layer_pattern();
        let ctx = EditContext::for_pattern(&pattern, top, 0);
        let mut editor = pattern.editor(ctx).unwrap();
        for x in 0..4 {
            editor.set_alpha(top, x, 0, 0).unwrap();
        }
        editor.set_pixel(top, 1, 0, Rgb::BLUE).unwrap();
        drop(editor);

        let out = LiveRenderer::standard().render_frame(&pattern, 0).unwrap();
        assert_eq!(out.get(0, 0), Some(Rgb::RED));
        assert_eq!(out.get(1, 0), Some(Rgb::BLUE));
        assert_eq!(out.get(2, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn test_alpha_moves_with_scrolled_pixels() {
        let mut pattern = Pattern::new("alpha", 4, 1, 10);
        let bottom = pattern.layers()[0].id;
        let top = pattern.add_layer("Top").unwrap();

        let ctx = EditContext::for_pattern(&pattern, bottom, 1);
        pattern
            .editor(ctx)
            .unwrap()
            .create_frame(bottom, Some(PixelBuffer::filled(4, 1, Rgb::RED)))
            .unwrap();
        let ctx = EditContext::for_pattern(&pattern, top, 1);
        let mut editor = pattern.editor(ctx).unwrap();
        editor.create_frame(top, Some(PixelBuffer::filled(4, 1, Rgb::GREEN))).unwrap();
        editor.set_alpha(top, 1, 0, 0).unwrap();
        drop(editor);
        pattern
            .add_action(top, Action::new(ActionKind::Scroll, 0).with_param("direction", "left"))
            .unwrap();

        // The hole at x=1 moves to x=0; the cell entering at x=3 is opaque black.
        let out = LiveRenderer::standard().render_frame(&pattern, 1).unwrap();
        assert_eq!(out.pixels(), &[Rgb::RED, Rgb::GREEN, Rgb::GREEN, Rgb::BLACK]);
    }

    #[test]
    fn test_corrupt_alpha_rejected() {
        let (pattern, _, top) = two_layer_pattern();
        let mut value = serde_json::to_value(&pattern).unwrap();
        value["layers"][1]["frames"]["0"]["alpha"] = serde_json::json!([0, 0]);
        let corrupt: Pattern = serde_json::from_value(value).unwrap();
        assert!(matches!(
            LiveRenderer::standard().render_frame(&corrupt, 0),
            Err(RenderError::CorruptFrame { layer, .. }) if layer == top
        ));
    }

    #[test]
    fn test_z_index_reorders_layers() {
        let (mut pattern, bottom, _) = two_layer_pattern();
        pattern.set_layer_z_index(bottom, 5).unwrap();
        let out = LiveRenderer::standard().render_frame(&pattern, 0).unwrap();
        assert_eq!(out.get(0, 0), Some(Rgb::RED));
        assert_eq!(out.get(1, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn test_hidden_and_windowed_layers_skip() {
        let (mut pattern, _, top) = two_layer_pattern();
        pattern.set_layer_blend(top, BlendMode::Add).unwrap();
        pattern.set_layer_visible(top, false).unwrap();
        let out = LiveRenderer::standard().render_frame(&pattern, 0).unwrap();
        assert_eq!(out.get(1, 0), Some(Rgb::BLACK));

        pattern.set_layer_visible(top, true).unwrap();
        pattern.set_layer_window(top, Some(1), None).unwrap();
        let out = LiveRenderer::standard().render_frame(&pattern, 0).unwrap();
        assert_eq!(out.get(1, 0), Some(Rgb::BLACK));
        assert_eq!(out.get(0, 0), Some(Rgb::RED));
    }

    #[test]
    fn test_actions_apply_at_absolute_index() {
        let (mut pattern, bottom, top) = two_layer_pattern();
        pattern.set_layer_visible(top, false).unwrap();
        pattern
            .add_action(bottom, Action::new(ActionKind::Scroll, 0))
            .unwrap();
        let ctx = EditContext::for_pattern(&pattern, bottom, 2);
        pattern.editor(ctx).unwrap().create_frame(bottom, None).unwrap();

        // Frame 2 is blank, so the scroll has nothing to move.
        let out = LiveRenderer::standard().render_frame(&pattern, 2).unwrap();
        assert!(out.is_blank());
        // Frame 0 at step 0 is untouched.
        let out = LiveRenderer::standard().render_frame(&pattern, 0).unwrap();
        assert_eq!(out.get(0, 0), Some(Rgb::RED));
    }

    #[test]
    fn test_missing_frame_lenient_and_strict() {
        let (pattern, bottom, _) = two_layer_pattern();
        let lenient = LiveRenderer::standard().render_frame(&pattern, 3).unwrap();
        assert!(lenient.is_blank());

        let strict = LiveRenderer::standard().with_options(RenderOptions {
            strictness: Strictness::Strict,
        });
        assert_eq!(
            strict.render_frame(&pattern, 3),
            Err(RenderError::FrameNotFound {
                layer: bottom,
                frame_index: 3
            })
        );
    }

    #[test]
    fn test_strict_ignores_hidden_layers() {
        let (mut pattern, bottom, top) = two_layer_pattern();
        pattern.set_layer_visible(bottom, false).unwrap();
        pattern.set_layer_visible(top, false).unwrap();
        let strict = LiveRenderer::standard().with_options(RenderOptions {
            strictness: Strictness::Strict,
        });
        assert!(strict.render_frame(&pattern, 7).unwrap().is_blank());
    }

    #[test]
    fn test_render_refused_while_editing() {
        let (mut pattern, bottom, _) = two_layer_pattern();
        let gate = pattern.gate().clone();
        let layers = pattern.layers().to_vec();
        let ctx = EditContext::for_pattern(&pattern, bottom, 0);
        let _editor = pattern.editor(ctx).unwrap();
        assert_eq!(
            render_composite_frame(&gate, &layers, 0, 4, 1, &StandardBlend, &RenderOptions::default()),
            Err(RenderError::Isolation(IsolationViolation::EditInProgress))
        );
    }

    #[test]
    fn test_invalid_output_size() {
        assert_eq!(
            render_composite_frame(&ModeGate::default(), &[], 0, 0, 3, &StandardBlend, &RenderOptions::default()),
            Err(RenderError::InvalidDimensions { width: 0, height: 3 })
        );
    }
}
