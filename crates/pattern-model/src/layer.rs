//! Layer tracks: sparse frame storage plus the layer's automation and
//! compositing settings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::ModelError;
use crate::frame::Frame;

/// Stable layer identifier, allocated by the owning pattern and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a layer combines with the layers beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Add,
    Subtract,
    Difference,
    ColorDodge,
    ColorBurn,
}

impl BlendMode {
    pub const ALL: [BlendMode; 9] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Difference,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Add => "add",
            BlendMode::Subtract => "subtract",
            BlendMode::Difference => "difference",
            BlendMode::ColorDodge => "color_dodge",
            BlendMode::ColorBurn => "color_burn",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_opacity() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// One layer of a pattern.
///
/// Frames are keyed by absolute frame index and may be sparse. The frame map
/// is only reachable mutably through the edit isolation guard
/// ([`crate::edit::Editor`]); reading a missing index never creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTrack {
    pub id: LayerId,
    pub name: String,

    #[serde(default)]
    frames: BTreeMap<u32, Frame>,

    #[serde(default)]
    actions: Vec<Action>,

    #[serde(default)]
    pub blend_mode: BlendMode,

    #[serde(default = "default_opacity")]
    pub opacity: f32,

    #[serde(default = "default_visible")]
    pub visible: bool,

    /// Locked layers reject every edit.
    #[serde(default)]
    pub locked: bool,

    /// Stacking order; lower values are drawn first.
    #[serde(default)]
    pub z_index: i32,

    /// First frame (inclusive) at which the layer contributes to a render.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<u32>,

    /// Last frame (inclusive) at which the layer contributes to a render.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frame: Option<u32>,
}

impl LayerTrack {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            frames: BTreeMap::new(),
            actions: Vec::new(),
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
            visible: true,
            locked: false,
            z_index: 0,
            start_frame: None,
            end_frame: None,
        }
    }

    pub fn frame(&self, frame_index: u32) -> Option<&Frame> {
        self.frames.get(&frame_index)
    }

    pub fn has_frame(&self, frame_index: u32) -> bool {
        self.frames.contains_key(&frame_index)
    }

    /// Stored frames in index order.
    pub fn frames(&self) -> impl Iterator<Item = (u32, &Frame)> {
        self.frames.iter().map(|(i, f)| (*i, f))
    }

    /// Number of stored frames (gaps excluded).
    pub fn stored_frames(&self) -> usize {
        self.frames.len()
    }

    /// Timeline length covered by this layer: last index + 1, or 0 when empty.
    pub fn frame_count(&self) -> u32 {
        self.frames
            .keys()
            .next_back()
            .map_or(0, |last| last.saturating_add(1))
    }

    pub(crate) fn frames_mut(&mut self) -> &mut BTreeMap<u32, Frame> {
        &mut self.frames
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Append an action after validating its window. Returns its index.
    pub fn add_action(&mut self, action: Action) -> Result<usize, ModelError> {
        action.validate()?;
        self.actions.push(action);
        Ok(self.actions.len() - 1)
    }

    pub fn remove_action(&mut self, index: usize) -> Result<Action, ModelError> {
        if index >= self.actions.len() {
            return Err(ModelError::ActionIndexOutOfRange {
                layer: self.id,
                index,
                count: self.actions.len(),
            });
        }
        Ok(self.actions.remove(index))
    }

    /// Mark every action as finalized. Returns how many changed state.
    pub fn finalize_actions(&mut self) -> usize {
        let mut changed = 0;
        for action in self.actions.iter_mut().filter(|a| !a.finalized) {
            action.finalized = true;
            changed += 1;
        }
        changed
    }

    /// Whether the layer's timing window includes `frame_index`.
    pub fn is_active_at(&self, frame_index: u32) -> bool {
        self.start_frame.map_or(true, |start| frame_index >= start)
            && self.end_frame.map_or(true, |end| frame_index <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    #[test]
    fn test_frame_count_is_last_index_plus_one() {
        let mut layer = LayerTrack::new(LayerId(1), "Layer 1");
        assert_eq!(layer.frame_count(), 0);
        layer.frames_mut().insert(0, Frame::blank(2, 2, 100));
        layer.frames_mut().insert(4, Frame::blank(2, 2, 100));
        assert_eq!(layer.frame_count(), 5);
        assert_eq!(layer.stored_frames(), 2);
        assert!(layer.frame(2).is_none());
        assert_eq!(layer.stored_frames(), 2);
    }

    #[test]
    fn test_action_list_operations() {
        let mut layer = LayerTrack::new(LayerId(3), "fx");
        assert_eq!(layer.add_action(Action::new(ActionKind::Scroll, 0)), Ok(0));
        assert_eq!(layer.add_action(Action::new(ActionKind::Invert, 2)), Ok(1));

        let mut inverted = Action::new(ActionKind::Wipe, 9);
        inverted.end_frame = Some(1);
        assert!(layer.add_action(inverted).is_err());

        assert_eq!(layer.finalize_actions(), 2);
        assert_eq!(layer.finalize_actions(), 0);

        let removed = layer.remove_action(0).unwrap();
        assert_eq!(removed.kind, ActionKind::Scroll);
        assert!(matches!(
            layer.remove_action(5),
            Err(ModelError::ActionIndexOutOfRange { index: 5, count: 1, .. })
        ));
    }

    #[test]
    fn test_timing_window() {
        let mut layer = LayerTrack::new(LayerId(1), "timed");
        assert!(layer.is_active_at(0));
        layer.start_frame = Some(2);
        layer.end_frame = Some(4);
        assert!(!layer.is_active_at(1));
        assert!(layer.is_active_at(2));
        assert!(layer.is_active_at(4));
        assert!(!layer.is_active_at(5));
    }

    #[test]
    fn test_legacy_layer_defaults() {
        let layer: LayerTrack = serde_json::from_str(r#"{"id":7,"name":"old"}"#).unwrap();
        assert_eq!(layer.id, LayerId(7));
        assert!(layer.visible);
        assert_eq!(layer.opacity, 1.0);
        assert_eq!(layer.blend_mode, BlendMode::Normal);
        assert_eq!(layer.frame_count(), 0);
    }

    #[test]
    fn test_blend_mode_names() {
        let json = serde_json::to_string(&BlendMode::ColorDodge).unwrap();
        assert_eq!(json, "\"color_dodge\"");
        for mode in BlendMode::ALL {
            let parsed: BlendMode =
                serde_json::from_str(&format!("\"{}\"", mode.as_str())).unwrap();
            assert_eq!(parsed, mode);
        }
    }
}
