//! Typed views over the free-form [`ActionParams`] map.
//!
//! A missing key falls back to the transform's default. A key that is present
//! but has the wrong type or an out-of-range value is an error, never silently
//! replaced.

use glowgrid_pattern_model::{ActionKind, ActionParams, Rgb};
use serde_json::Value;

use crate::error::TransformError;

/// String-valued parameter with a closed set of accepted spellings.
pub trait ParamChoice: Sized + Copy + 'static {
    /// Accepted names after normalisation (lowercase, `-`/space → `_`).
    const NAMES: &'static [(&'static str, Self)];

    fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, v)| *v)
    }

    fn expected() -> String {
        Self::NAMES
            .iter()
            .map(|(n, _)| *n)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ParamChoice for ScrollDirection {
    const NAMES: &'static [(&'static str, Self)] = &[
        ("up", ScrollDirection::Up),
        ("down", ScrollDirection::Down),
        ("left", ScrollDirection::Left),
        ("right", ScrollDirection::Right),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Clockwise,
    CounterClockwise,
}

impl ParamChoice for RotateDirection {
    const NAMES: &'static [(&'static str, Self)] = &[
        ("clockwise", RotateDirection::Clockwise),
        ("cw", RotateDirection::Clockwise),
        ("counter_clockwise", RotateDirection::CounterClockwise),
        ("counterclockwise", RotateDirection::CounterClockwise),
        ("anticlockwise", RotateDirection::CounterClockwise),
        ("ccw", RotateDirection::CounterClockwise),
    ];
}

/// `Horizontal` works along x (left/right), `Vertical` along y (top/bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl ParamChoice for Axis {
    const NAMES: &'static [(&'static str, Self)] = &[
        ("horizontal", Axis::Horizontal),
        ("x", Axis::Horizontal),
        ("vertical", Axis::Vertical),
        ("y", Axis::Vertical),
    ];
}

/// Direction of travel for wipe and reveal edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl ParamChoice for SweepDirection {
    const NAMES: &'static [(&'static str, Self)] = &[
        ("left_to_right", SweepDirection::LeftToRight),
        ("left", SweepDirection::LeftToRight),
        ("right_to_left", SweepDirection::RightToLeft),
        ("right", SweepDirection::RightToLeft),
        ("top_to_bottom", SweepDirection::TopToBottom),
        ("top", SweepDirection::TopToBottom),
        ("bottom_to_top", SweepDirection::BottomToTop),
        ("bottom", SweepDirection::BottomToTop),
    ];
}

impl SweepDirection {
    pub fn axis(self) -> Axis {
        match self {
            SweepDirection::LeftToRight | SweepDirection::RightToLeft => Axis::Horizontal,
            SweepDirection::TopToBottom | SweepDirection::BottomToTop => Axis::Vertical,
        }
    }

    /// Distance of cell `(x, y)` from the edge the sweep starts at.
    pub fn depth(self, x: u32, y: u32, width: u32, height: u32) -> u32 {
        match self {
            SweepDirection::LeftToRight => x,
            SweepDirection::RightToLeft => width - 1 - x,
            SweepDirection::TopToBottom => y,
            SweepDirection::BottomToTop => height - 1 - y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadialMode {
    Sweep,
    Spiral,
    Pulse,
}

impl ParamChoice for RadialMode {
    const NAMES: &'static [(&'static str, Self)] = &[
        ("sweep", RadialMode::Sweep),
        ("spiral", RadialMode::Spiral),
        ("pulse", RadialMode::Pulse),
    ];
}

/// Parameter reader bound to one action kind, for error attribution.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    kind: ActionKind,
    raw: &'a ActionParams,
}

impl<'a> Params<'a> {
    pub fn new(kind: ActionKind, raw: &'a ActionParams) -> Self {
        Self { kind, raw }
    }

    fn invalid(&self, key: &str, reason: impl Into<String>) -> TransformError {
        TransformError::invalid_param(self.kind, key, reason)
    }

    /// Non-negative integer. Whole-valued floats such as `2.0` are accepted.
    pub fn uint(&self, key: &str, default: u32) -> Result<u32, TransformError> {
        let Some(value) = self.raw.get(key) else {
            return Ok(default);
        };
        let parsed = match value {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f as u64)
            }),
            _ => None,
        };
        parsed
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| self.invalid(key, format!("expected a non-negative integer, got {value}")))
    }

    /// Like [`Params::uint`] but rejects zero.
    pub fn positive_uint(&self, key: &str, default: u32) -> Result<u32, TransformError> {
        match self.uint(key, default)? {
            0 => Err(self.invalid(key, "must be greater than zero")),
            v => Ok(v),
        }
    }

    /// Finite number.
    pub fn number(&self, key: &str, default: f64) -> Result<f64, TransformError> {
        let Some(value) = self.raw.get(key) else {
            return Ok(default);
        };
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| self.invalid(key, format!("expected a number, got {value}")))
    }

    pub fn choice<T: ParamChoice>(&self, key: &str, default: T) -> Result<T, TransformError> {
        let Some(value) = self.raw.get(key) else {
            return Ok(default);
        };
        value
            .as_str()
            .and_then(T::from_name)
            .ok_or_else(|| self.invalid(key, format!("expected one of {}, got {value}", T::expected())))
    }

    /// `[r, g, b]` with channels in `0..=255`, or a `"#rrggbb"` string.
    pub fn colour(&self, key: &str, default: Rgb) -> Result<Rgb, TransformError> {
        let Some(value) = self.raw.get(key) else {
            return Ok(default);
        };
        let parsed = match value {
            Value::Array(items) if items.len() == 3 => {
                let channels: Option<Vec<u8>> = items
                    .iter()
                    .map(|c| c.as_u64().and_then(|c| u8::try_from(c).ok()))
                    .collect();
                channels.map(|c| Rgb::new(c[0], c[1], c[2]))
            }
            Value::String(s) => parse_hex_colour(s),
            _ => None,
        };
        parsed.ok_or_else(|| self.invalid(key, format!("expected [r, g, b] or \"#rrggbb\", got {value}")))
    }
}

fn parse_hex_colour(s: &str) -> Option<Rgb> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}
