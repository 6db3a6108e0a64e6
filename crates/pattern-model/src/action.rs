//! Automation actions: a transform kind, its parameters, and the window of
//! absolute frames in which it contributes to the pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The closed set of automation transforms.
///
/// Brightness and fade are post-processing concerns and deliberately have
/// no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Scroll,
    Rotate,
    Mirror,
    Flip,
    Wipe,
    Reveal,
    Bounce,
    Radial,
    ColourCycle,
    Invert,
}

impl ActionKind {
    pub const ALL: [ActionKind; 10] = [
        ActionKind::Scroll,
        ActionKind::Rotate,
        ActionKind::Mirror,
        ActionKind::Flip,
        ActionKind::Wipe,
        ActionKind::Reveal,
        ActionKind::Bounce,
        ActionKind::Radial,
        ActionKind::ColourCycle,
        ActionKind::Invert,
    ];

    /// Fixed execution priority. Lower runs first; mirror and flip share a tier.
    pub const fn priority(self) -> u8 {
        match self {
            ActionKind::Scroll => 10,
            ActionKind::Rotate => 20,
            ActionKind::Mirror | ActionKind::Flip => 30,
            ActionKind::Bounce => 40,
            ActionKind::Wipe => 50,
            ActionKind::Reveal => 60,
            ActionKind::Radial => 70,
            ActionKind::ColourCycle => 80,
            ActionKind::Invert => 90,
        }
    }

    /// Whether the transform output depends on the local step.
    pub const fn is_time_varying(self) -> bool {
        !matches!(
            self,
            ActionKind::Mirror | ActionKind::Flip | ActionKind::Invert
        )
    }

    /// Whether the transform relocates pixels. A frame's alpha channel
    /// follows these; colour effects leave it in place.
    pub const fn moves_pixels(self) -> bool {
        matches!(
            self,
            ActionKind::Scroll
                | ActionKind::Rotate
                | ActionKind::Mirror
                | ActionKind::Flip
                | ActionKind::Bounce
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Scroll => "scroll",
            ActionKind::Rotate => "rotate",
            ActionKind::Mirror => "mirror",
            ActionKind::Flip => "flip",
            ActionKind::Wipe => "wipe",
            ActionKind::Reveal => "reveal",
            ActionKind::Bounce => "bounce",
            ActionKind::Radial => "radial",
            ActionKind::ColourCycle => "colour_cycle",
            ActionKind::Invert => "invert",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action type name that does not map to any [`ActionKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action type '{0}'")]
pub struct UnknownActionType(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "scroll" => Ok(ActionKind::Scroll),
            "rotate" => Ok(ActionKind::Rotate),
            "mirror" => Ok(ActionKind::Mirror),
            "flip" => Ok(ActionKind::Flip),
            "wipe" => Ok(ActionKind::Wipe),
            "reveal" => Ok(ActionKind::Reveal),
            "bounce" => Ok(ActionKind::Bounce),
            "radial" => Ok(ActionKind::Radial),
            "colour_cycle" | "color_cycle" => Ok(ActionKind::ColourCycle),
            "invert" => Ok(ActionKind::Invert),
            _ => Err(UnknownActionType(s.to_string())),
        }
    }
}

/// Free-form action parameters: an ordered map of names to JSON values.
///
/// Interpretation belongs to the transform that consumes them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionParams(BTreeMap<String, serde_json::Value>);

impl ActionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `key=value` pair as typed on a command line. Values that parse
    /// as JSON (numbers, booleans, arrays) keep that type; anything else is a
    /// string.
    pub fn insert_assignment(&mut self, assignment: &str) -> Result<(), ModelError> {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| ModelError::InvalidParamAssignment(assignment.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ModelError::InvalidParamAssignment(assignment.to_string()));
        }
        let raw = raw.trim();
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        self.insert(key, value);
        Ok(())
    }
}

/// One automation action attached to a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Which transform to run.
    #[serde(rename = "type")]
    pub kind: ActionKind,

    /// First absolute frame (inclusive) at which the action is active.
    pub start_frame: u32,

    /// Last absolute frame (inclusive); `None` continues indefinitely.
    #[serde(default)]
    pub end_frame: Option<u32>,

    /// Transform parameters.
    #[serde(default)]
    pub params: ActionParams,

    /// Finalized actions have been baked and no longer contribute.
    #[serde(default)]
    pub finalized: bool,

    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Action {
    /// An action active from `start_frame` onwards, with default parameters.
    pub fn new(kind: ActionKind, start_frame: u32) -> Self {
        Self {
            kind,
            start_frame,
            end_frame: None,
            params: ActionParams::new(),
            finalized: false,
            name: None,
        }
    }

    /// An action with an explicit activation window.
    pub fn with_window(
        kind: ActionKind,
        start_frame: u32,
        end_frame: Option<u32>,
    ) -> Result<Self, ModelError> {
        let action = Self {
            end_frame,
            ..Self::new(kind, start_frame)
        };
        action.validate()?;
        Ok(action)
    }

    pub fn with_params(mut self, params: ActionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check `end_frame >= start_frame`.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self.end_frame {
            Some(end) if end < self.start_frame => Err(ModelError::InvalidWindow {
                start_frame: self.start_frame,
                end_frame: end,
            }),
            _ => Ok(()),
        }
    }

    pub fn priority(&self) -> u8 {
        self.kind.priority()
    }

    /// Whether the action contributes at absolute frame `frame_index`.
    pub fn is_active_at(&self, frame_index: u32) -> bool {
        !self.finalized
            && frame_index >= self.start_frame
            && self.end_frame.map_or(true, |end| frame_index <= end)
    }

    /// Frames elapsed since `start_frame`, or `None` when inactive.
    ///
    /// This is the only frame-relative value a transform ever receives.
    pub fn local_step(&self, frame_index: u32) -> Option<u32> {
        if self.is_active_at(frame_index) {
            Some(frame_index - self.start_frame)
        } else {
            None
        }
    }

    /// Human-readable label for listings.
    pub fn label(&self) -> String {
        let window = match self.end_frame {
            Some(end) => format!("{}..={}", self.start_frame, end),
            None => format!("{}..", self.start_frame),
        };
        match &self.name {
            Some(name) => format!("{name} ({} {window})", self.kind),
            None => format!("{} {window}", self.kind),
        }
    }
}
