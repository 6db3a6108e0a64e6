//! Pattern: the project root that owns every layer.
//!
//! A pattern file (`*.glowgrid.json`) holds the matrix geometry, the layers,
//! their frames as pixel arrays, and each layer's action list.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::edit::{EditContext, Editor};
use crate::error::{EditError, IsolationViolation, ModelError, ProjectError};
use crate::frame::Frame;
use crate::gate::ModeGate;
use crate::layer::{BlendMode, LayerId, LayerTrack};

pub const PATTERN_VERSION: &str = "1.0";

/// Extension used for pattern files.
pub const PATTERN_FILE_EXTENSION: &str = "glowgrid.json";

/// Top-level pattern.
///
/// Layers are owned by value and addressed by [`LayerId`]. Frame data can only
/// be changed through [`Pattern::editor`]; layer settings through the
/// `set_layer_*` methods, which refuse to run while a render holds the gate.
/// Clones share the gate of the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    /// Schema version.
    pub version: String,

    pub name: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: String,

    /// Last modified timestamp (RFC 3339).
    pub modified_at: String,

    width: u32,
    height: u32,

    /// Playback frame rate.
    pub fps: u32,

    layers: Vec<LayerTrack>,

    next_layer_id: u32,

    #[serde(skip)]
    gate: Arc<ModeGate>,
}

impl Pattern {
    /// A new pattern with one empty layer.
    pub fn new(name: impl Into<String>, width: u32, height: u32, fps: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let mut pattern = Self {
            version: PATTERN_VERSION.to_string(),
            name: name.into(),
            created_at: now.clone(),
            modified_at: now,
            width,
            height,
            fps,
            layers: Vec::new(),
            next_layer_id: 1,
            gate: ModeGate::new(),
        };
        pattern.push_layer("Layer 1");
        pattern
    }

    /// A new pattern whose single layer holds a black frame 0.
    pub fn with_blank_frame(
        name: impl Into<String>,
        width: u32,
        height: u32,
        fps: u32,
        duration_ms: u32,
    ) -> Self {
        let mut pattern = Self::new(name, width, height, fps);
        if let Some(layer) = pattern.layers.first_mut() {
            layer
                .frames_mut()
                .insert(0, Frame::blank(width, height, duration_ms));
        }
        pattern
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layers(&self) -> &[LayerTrack] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerTrack> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub(crate) fn layer_mut(&mut self, id: LayerId) -> Option<&mut LayerTrack> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Layers in stacking order (ascending `z_index`, ties in list order).
    pub fn layers_by_z(&self) -> Vec<&LayerTrack> {
        let mut layers: Vec<&LayerTrack> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.z_index);
        layers
    }

    /// Longest layer, in frames.
    pub fn timeline_len(&self) -> u32 {
        self.layers
            .iter()
            .map(LayerTrack::frame_count)
            .max()
            .unwrap_or(0)
    }

    pub fn gate(&self) -> &Arc<ModeGate> {
        &self.gate
    }

    /// Refresh `modified_at`.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }

    fn push_layer(&mut self, name: &str) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        let mut layer = LayerTrack::new(id, name);
        layer.z_index = self
            .layers
            .iter()
            .map(|l| l.z_index + 1)
            .max()
            .unwrap_or(0);
        self.layers.push(layer);
        id
    }

    fn check_not_rendering(&self) -> Result<(), ModelError> {
        if self.gate.is_rendering() {
            return Err(IsolationViolation::RenderInProgress.into());
        }
        Ok(())
    }

    /// Layer whose settings are about to change.
    fn settings_target(&mut self, id: LayerId) -> Result<&mut LayerTrack, ModelError> {
        self.check_not_rendering()?;
        self.layer_mut(id).ok_or(ModelError::LayerNotFound(id))
    }

    /// Add an empty layer on top of the stack.
    pub fn add_layer(&mut self, name: impl Into<String>) -> Result<LayerId, ModelError> {
        self.check_not_rendering()?;
        let name = name.into();
        let id = self.push_layer(&name);
        tracing::debug!(layer = %id, name = %name, "added layer");
        Ok(id)
    }

    /// Remove a layer together with its frames and actions.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<LayerTrack, ModelError> {
        self.check_not_rendering()?;
        let position = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(ModelError::LayerNotFound(id))?;
        Ok(self.layers.remove(position))
    }

    pub fn set_layer_blend(&mut self, id: LayerId, blend_mode: BlendMode) -> Result<(), ModelError> {
        self.settings_target(id)?.blend_mode = blend_mode;
        Ok(())
    }

    /// Set layer opacity, clamped to `[0, 1]`.
    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f32) -> Result<(), ModelError> {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.settings_target(id)?.opacity = opacity;
        Ok(())
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> Result<(), ModelError> {
        self.settings_target(id)?.visible = visible;
        Ok(())
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> Result<(), ModelError> {
        self.settings_target(id)?.locked = locked;
        Ok(())
    }

    pub fn set_layer_z_index(&mut self, id: LayerId, z_index: i32) -> Result<(), ModelError> {
        self.settings_target(id)?.z_index = z_index;
        Ok(())
    }

    /// Restrict the frames at which a layer contributes to a render.
    pub fn set_layer_window(
        &mut self,
        id: LayerId,
        start_frame: Option<u32>,
        end_frame: Option<u32>,
    ) -> Result<(), ModelError> {
        if let (Some(start), Some(end)) = (start_frame, end_frame) {
            if end < start {
                return Err(ModelError::InvalidWindow {
                    start_frame: start,
                    end_frame: end,
                });
            }
        }
        let layer = self.settings_target(id)?;
        layer.start_frame = start_frame;
        layer.end_frame = end_frame;
        Ok(())
    }

    /// Append an action to a layer. Returns its index in the layer's list.
    pub fn add_action(&mut self, id: LayerId, action: Action) -> Result<usize, ModelError> {
        let kind = action.kind;
        let index = self.settings_target(id)?.add_action(action)?;
        tracing::debug!(layer = %id, action = %kind, index, "added action");
        Ok(index)
    }

    pub fn remove_action(&mut self, id: LayerId, index: usize) -> Result<Action, ModelError> {
        self.settings_target(id)?.remove_action(index)
    }

    /// Enter edit mode for the given context.
    ///
    /// Fails if the context is malformed or does not match the matrix, if the
    /// active layer does not exist, or if a render or another edit holds the
    /// gate.
    pub fn editor(&mut self, ctx: EditContext) -> Result<Editor<'_>, EditError> {
        ctx.validate()?;
        if (ctx.width, ctx.height) != self.dimensions() {
            return Err(EditError::InvalidContext(format!(
                "context is {}x{}, pattern is {}x{}",
                ctx.width, ctx.height, self.width, self.height
            )));
        }
        if self.layer(ctx.active_layer_id).is_none() {
            return Err(EditError::LayerNotFound(ctx.active_layer_id));
        }
        let guard = self.gate.enter_edit()?;
        Ok(Editor::new(self, ctx, guard))
    }

    /// Load a pattern file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ProjectError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut pattern: Pattern =
            serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        let max_id = pattern.layers.iter().map(|l| l.id.0).max().unwrap_or(0);
        pattern.next_layer_id = pattern.next_layer_id.max(max_id + 1);

        tracing::info!(
            path = %path.display(),
            layers = pattern.layers.len(),
            frames = pattern.timeline_len(),
            "loaded pattern"
        );
        Ok(pattern)
    }

    /// Write the pattern file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProjectError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ProjectError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ProjectError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), "saved pattern");
        Ok(())
    }

    /// Structural problems a loaded file may carry. Empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];

        if self.width == 0 || self.height == 0 {
            issues.push(format!(
                "matrix dimensions must be non-zero, got {}x{}",
                self.width, self.height
            ));
        }
        if self.fps == 0 {
            issues.push("fps must be non-zero".to_string());
        }

        let mut seen = HashSet::new();
        for layer in &self.layers {
            let label = format!("layer {} ({})", layer.id, layer.name);
            if !seen.insert(layer.id) {
                issues.push(format!("{label}: duplicate layer id"));
            }
            if layer.id.0 >= self.next_layer_id {
                issues.push(format!(
                    "{label}: id is not below next_layer_id {}",
                    self.next_layer_id
                ));
            }
            if !(0.0..=1.0).contains(&layer.opacity) {
                issues.push(format!("{label}: opacity {} outside [0, 1]", layer.opacity));
            }
            if let (Some(start), Some(end)) = (layer.start_frame, layer.end_frame) {
                if end < start {
                    issues.push(format!(
                        "{label}: timing window ends at {end} before it starts at {start}"
                    ));
                }
            }

            for (index, frame) in layer.frames() {
                if let Err(e) = frame.pixels.validate() {
                    issues.push(format!("{label}, frame {index}: {e}"));
                } else if frame.pixels.dimensions() != self.dimensions() {
                    issues.push(format!(
                        "{label}, frame {index}: {}x{} does not match the {}x{} matrix",
                        frame.pixels.width(),
                        frame.pixels.height(),
                        self.width,
                        self.height
                    ));
                }
                if let Err(e) = frame.validate_alpha() {
                    issues.push(format!("{label}, frame {index}: alpha channel: {e}"));
                }
                if let Some(opacity) = frame.opacity {
                    if !(0.0..=1.0).contains(&opacity) {
                        issues.push(format!(
                            "{label}, frame {index}: opacity {opacity} outside [0, 1]"
                        ));
                    }
                }
            }

            for (index, action) in layer.actions().iter().enumerate() {
                if let Err(e) = action.validate() {
                    issues.push(format!("{label}, action {index} ({}): {e}", action.kind));
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::pixel::{PixelBuffer, Rgb};

    #[test]
    fn test_new_pattern_has_one_empty_layer() {
        let pattern = Pattern::new("Test", 16, 8, 10);
        assert_eq!(pattern.version, PATTERN_VERSION);
        assert_eq!(pattern.layers().len(), 1);
        assert_eq!(pattern.layers()[0].id, LayerId(1));
        assert_eq!(pattern.timeline_len(), 0);
        assert!(pattern.validate().is_empty());
    }

    #[test]
    fn test_layer_ids_never_reused() {
        let mut pattern = Pattern::new("ids", 4, 4, 10);
        let b = pattern.add_layer("b").unwrap();
        pattern.remove_layer(b).unwrap();
        let c = pattern.add_layer("c").unwrap();
        assert_ne!(b, c);
        assert_eq!(c, LayerId(3));
        assert!(matches!(
            pattern.remove_layer(b),
            Err(ModelError::LayerNotFound(_))
        ));
    }

    #[test]
    fn test_layers_by_z_is_stable() {
        let mut pattern = Pattern::new("z", 4, 4, 10);
        let first = pattern.layers()[0].id;
        let second = pattern.add_layer("second").unwrap();
        let third = pattern.add_layer("third").unwrap();
        pattern.set_layer_z_index(first, 5).unwrap();
        pattern.set_layer_z_index(second, 0).unwrap();
        pattern.set_layer_z_index(third, 0).unwrap();

        let order: Vec<LayerId> = pattern.layers_by_z().iter().map(|l| l.id).collect();
        assert_eq!(order, vec![second, third, first]);
    }

    #[test]
    fn test_settings_refused_during_render() {
        let mut pattern = Pattern::new("busy", 4, 4, 10);
        let id = pattern.layers()[0].id;
        let gate = Arc::clone(pattern.gate());
        let guard = gate.enter_render().unwrap();

        assert_eq!(
            pattern.set_layer_opacity(id, 0.5),
            Err(ModelError::Isolation(IsolationViolation::RenderInProgress))
        );
        assert!(pattern.add_action(id, Action::new(ActionKind::Scroll, 0)).is_err());
        let ctx = EditContext::for_pattern(&pattern, id, 0);
        assert!(matches!(
            pattern.editor(ctx),
            Err(EditError::Isolation(IsolationViolation::RenderInProgress))
        ));

        drop(guard);
        assert!(pattern.set_layer_opacity(id, 0.5).is_ok());
        assert!(pattern.editor(ctx).is_ok());
    }

    #[test]
    fn test_editor_rejects_mismatched_context() {
        let mut pattern = Pattern::new("ctx", 4, 4, 10);
        let id = pattern.layers()[0].id;
        assert!(matches!(
            pattern.editor(EditContext::new(id, 0, 8, 8)),
            Err(EditError::InvalidContext(_))
        ));
        assert!(matches!(
            pattern.editor(EditContext::new(LayerId(99), 0, 4, 4)),
            Err(EditError::LayerNotFound(LayerId(99)))
        ));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("glowgrid_test_pattern");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join(format!("round_trip.{PATTERN_FILE_EXTENSION}"));

        let mut pattern = Pattern::with_blank_frame("Round Trip", 4, 3, 12, 80);
        let id = pattern.layers()[0].id;
        let ctx = EditContext::for_pattern(&pattern, id, 0);
        pattern
            .editor(ctx)
            .unwrap()
            .set_pixel(id, 3, 2, Rgb::new(10, 20, 30))
            .unwrap();
        pattern
            .add_action(
                id,
                Action::with_window(ActionKind::Wipe, 1, Some(6))
                    .unwrap()
                    .with_param("direction", "top_to_bottom")
                    .with_param("colour", serde_json::json!([255, 0, 0])),
            )
            .unwrap();
        pattern.set_layer_blend(id, BlendMode::Screen).unwrap();
        pattern.set_layer_window(id, Some(0), Some(9)).unwrap();
        pattern.save(&path).unwrap();

        let loaded = Pattern::load(&path).unwrap();
        assert_eq!(loaded.name, "Round Trip");
        assert_eq!(loaded.dimensions(), (4, 3));
        assert_eq!(loaded.fps, 12);
        assert_eq!(loaded.layers(), pattern.layers());
        assert_eq!(loaded.created_at, pattern.created_at);
        assert!(loaded.validate().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_action_type_is_parse_error() {
        let dir = std::env::temp_dir().join("glowgrid_test_unknown_action");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("bad.glowgrid.json");

        let pattern = Pattern::new("bad", 2, 2, 10);
        let mut value = serde_json::to_value(&pattern).unwrap();
        value["layers"][0]["actions"] = serde_json::json!([
            {"type": "brightness", "start_frame": 0, "params": {}}
        ]);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, value.to_string()).unwrap();

        let err = Pattern::load(&path).unwrap_err();
        assert!(matches!(err, ProjectError::ParseError { .. }));
        assert!(err.to_string().contains("bad.glowgrid.json"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut value = serde_json::to_value(Pattern::with_blank_frame("v", 2, 2, 10, 100)).unwrap();
        value["layers"][0]["opacity"] = serde_json::json!(1.5);
        value["layers"][0]["frames"]["0"]["pixels"]["pixels"] = serde_json::json!([[0, 0, 0]]);
        value["layers"][0]["actions"] =
            serde_json::json!([{"type": "scroll", "start_frame": 5, "end_frame": 2}]);
        let mut second = value["layers"][0].clone();
        second["frames"] = serde_json::json!({});
        second["opacity"] = serde_json::json!(1.0);
        second["actions"] = serde_json::json!([]);
        value["layers"].as_array_mut().unwrap().push(second);

        let pattern: Pattern = serde_json::from_value(value).unwrap();
        let issues = pattern.validate();
        assert!(issues.iter().any(|i| i.contains("opacity 1.5")));
        assert!(issues.iter().any(|i| i.contains("expects 4 pixels")));
        assert!(issues.iter().any(|i| i.contains("action 0 (scroll)")));
        assert!(issues.iter().any(|i| i.contains("duplicate layer id")));
    }

    #[test]
    fn test_frame_dimension_mismatch_reported() {
        let mut value = serde_json::to_value(Pattern::new("dims", 2, 2, 10)).unwrap();
        value["layers"][0]["frames"] =
            serde_json::json!({"0": serde_json::to_value(Frame::new(PixelBuffer::new(3, 3), 100)).unwrap()});
        let pattern: Pattern = serde_json::from_value(value).unwrap();
        let issues = pattern.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("does not match the 2x2 matrix"));
    }

    #[test]
    fn test_alpha_length_reported() {
        let mut value = serde_json::to_value(Pattern::with_blank_frame("alpha", 2, 2, 10, 100)).unwrap();
        value["layers"][0]["frames"]["0"]["alpha"] = serde_json::json!([255, 0, 0]);
        let pattern: Pattern = serde_json::from_value(value).unwrap();
        let issues = pattern.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("alpha channel"));
        assert!(issues[0].contains("expects 4 pixels, found 3"));
    }
}
