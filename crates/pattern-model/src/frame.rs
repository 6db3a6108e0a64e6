use serde::{Deserialize, Serialize};

use crate::pixel::{PixelBuffer, PixelBufferError};

/// A single animation frame of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub pixels: PixelBuffer,

    /// How long the frame is shown during playback.
    pub duration_ms: u32,

    /// Set on frames produced by the frame generator.
    #[serde(default)]
    pub is_baked: bool,

    /// Per-frame visibility override; `None` inherits the layer flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,

    /// Per-frame opacity override; `None` inherits the layer opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,

    /// Per-pixel alpha, row-major like `pixels` (0 transparent, 255 opaque).
    /// `None` means every pixel is opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<Vec<u8>>,
}

impl Frame {
    pub const DEFAULT_DURATION_MS: u32 = 100;

    pub fn new(pixels: PixelBuffer, duration_ms: u32) -> Self {
        Self {
            pixels,
            duration_ms,
            is_baked: false,
            visible: None,
            opacity: None,
            alpha: None,
        }
    }

    /// A black frame with every pixel transparent.
    pub fn transparent(width: u32, height: u32, duration_ms: u32) -> Self {
        let pixels = PixelBuffer::new(width, height);
        let alpha = vec![0; pixels.len()];
        Self {
            alpha: Some(alpha),
            ..Self::new(pixels, duration_ms)
        }
    }

    /// An all-black frame.
    pub fn blank(width: u32, height: u32, duration_ms: u32) -> Self {
        Self::new(PixelBuffer::new(width, height), duration_ms)
    }

    /// Generator output.
    pub fn baked(pixels: PixelBuffer, duration_ms: u32) -> Self {
        Self {
            is_baked: true,
            ..Self::new(pixels, duration_ms)
        }
    }

    /// Alpha of the pixel at row-major `index`; opaque when unset.
    pub fn alpha_at(&self, index: usize) -> u8 {
        self.alpha
            .as_ref()
            .and_then(|a| a.get(index).copied())
            .unwrap_or(u8::MAX)
    }

    /// Whether any pixel is less than fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.alpha
            .as_ref()
            .is_some_and(|a| a.iter().any(|&v| v < u8::MAX))
    }

    /// The alpha channel, when present, must cover exactly the pixels.
    pub fn validate_alpha(&self) -> Result<(), PixelBufferError> {
        match &self.alpha {
            Some(alpha) if alpha.len() != self.pixels.len() => Err(PixelBufferError::LengthMismatch {
                width: self.pixels.width(),
                height: self.pixels.height(),
                expected: self.pixels.len(),
                actual: alpha.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn effective_visible(&self, layer_visible: bool) -> bool {
        self.visible.unwrap_or(layer_visible)
    }

    /// Frame override if present, else the layer value, clamped to `[0, 1]`.
    pub fn effective_opacity(&self, layer_opacity: f32) -> f32 {
        let opacity = self.opacity.unwrap_or(layer_opacity);
        if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_inherit_layer() {
        let mut frame = Frame::blank(2, 2, 100);
        assert!(frame.effective_visible(true));
        assert_eq!(frame.effective_opacity(0.4), 0.4);

        frame.visible = Some(false);
        frame.opacity = Some(1.7);
        assert!(!frame.effective_visible(true));
        assert_eq!(frame.effective_opacity(0.4), 1.0);
    }

    #[test]
    fn test_overrides_skipped_when_unset() {
        let json = serde_json::to_value(Frame::baked(PixelBuffer::new(1, 1), 40)).unwrap();
        assert_eq!(json["is_baked"], true);
        assert_eq!(json["duration_ms"], 40);
        assert!(json.get("visible").is_none());
        assert!(json.get("opacity").is_none());
        assert!(json.get("alpha").is_none());
    }

    #[test]
    fn test_alpha_defaults_opaque() {
        let mut frame = Frame::blank(2, 1, 100);
        assert_eq!(frame.alpha_at(1), 255);
        assert!(!frame.has_transparency());

        frame.alpha = Some(vec![255, 0]);
        assert_eq!(frame.alpha_at(1), 0);
        assert!(frame.has_transparency());
        assert!(frame.validate_alpha().is_ok());

        frame.alpha = Some(vec![255]);
        assert!(matches!(
            frame.validate_alpha(),
            Err(PixelBufferError::LengthMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_transparent_frame_round_trips() {
        let frame = Frame::transparent(2, 2, 50);
        assert_eq!(frame.alpha.as_deref(), Some(&[0u8, 0, 0, 0][..]));
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
