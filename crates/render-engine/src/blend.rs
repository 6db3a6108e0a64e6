//! Layer blending.
//!
//! A [`LayerBlend`] composites one evaluated layer onto the accumulated
//! output below it. Two implementations ship:
//!
//! - [`StandardBlend`]: per-channel blend-mode math on normalised values,
//!   followed by an opacity lerp.
//! - [`KeyedOverwrite`]: LED-studio exact mode. Opacity scales brightness,
//!   black is transparent and anything else overwrites.
//!
//! Both honour the top layer's per-pixel alpha: a pixel with alpha 0 leaves
//! the output untouched, and partial alpha multiplies into the opacity.

use glowgrid_pattern_model::{BlendMode, PixelBuffer, Rgb};

/// Strategy for combining a layer with the pixels beneath it.
pub trait LayerBlend: Send + Sync {
    /// Composite `top` onto `below` in place. Both buffers have the same size;
    /// `top_alpha`, when present, holds one value per pixel of `top`.
    fn blend(
        &self,
        below: &mut PixelBuffer,
        top: &PixelBuffer,
        top_alpha: Option<&[u8]>,
        mode: BlendMode,
        opacity: f32,
    );

    fn name(&self) -> &str;
}

/// Blend two normalised channel values.
pub fn blend_channel(mode: BlendMode, b: f64, t: f64) -> f64 {
    match mode {
        BlendMode::Normal => t,
        BlendMode::Multiply => b * t,
        BlendMode::Screen => 1.0 - (1.0 - b) * (1.0 - t),
        BlendMode::Overlay => {
            if b < 0.5 {
                2.0 * b * t
            } else {
                1.0 - 2.0 * (1.0 - b) * (1.0 - t)
            }
        }
        BlendMode::Add => (b + t).min(1.0),
        BlendMode::Subtract => (b - t).max(0.0),
        BlendMode::Difference => (b - t).abs(),
        BlendMode::ColorDodge => (b / (1.0 - t + 0.001)).min(1.0),
        BlendMode::ColorBurn => 1.0 - ((1.0 - b) / (t + 0.001)).min(1.0),
    }
}

/// Blend one pixel, then lerp from `below` toward the result by `opacity`.
pub fn blend_pixel(mode: BlendMode, below: Rgb, top: Rgb, opacity: f64) -> Rgb {
    let channel = |b: u8, t: u8| {
        let b = b as f64 / 255.0;
        let t = t as f64 / 255.0;
        let r = blend_channel(mode, b, t);
        let out = b + (r - b) * opacity;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(
        channel(below.r, top.r),
        channel(below.g, top.g),
        channel(below.b, top.b),
    )
}

/// Alpha at `index`, opaque when there is no channel or it is short.
fn alpha_at(alpha: Option<&[u8]>, index: usize) -> u8 {
    alpha.and_then(|a| a.get(index).copied()).unwrap_or(u8::MAX)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardBlend;

impl LayerBlend for StandardBlend {
    fn blend(
        &self,
        below: &mut PixelBuffer,
        top: &PixelBuffer,
        top_alpha: Option<&[u8]>,
        mode: BlendMode,
        opacity: f32,
    ) {
        let opacity = opacity.clamp(0.0, 1.0) as f64;
        if opacity <= 0.0 {
            return;
        }
        let opaque = top_alpha.map_or(true, |a| a.iter().all(|&v| v == u8::MAX));
        if mode == BlendMode::Normal && opacity >= 1.0 && opaque {
            *below = top.clone();
            return;
        }
        let (w, h) = below.dimensions();
        for y in 0..h {
            for x in 0..w {
                let alpha = alpha_at(top_alpha, (y * w + x) as usize);
                if alpha == 0 {
                    continue;
                }
                let weight = opacity * alpha as f64 / 255.0;
                let b = below.sample(x as i64, y as i64);
                let t = top.sample(x as i64, y as i64);
                below.set(x, y, blend_pixel(mode, b, t, weight));
            }
        }
    }

    fn name(&self) -> &str {
        "standard"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyedOverwrite;

impl LayerBlend for KeyedOverwrite {
    fn blend(
        &self,
        below: &mut PixelBuffer,
        top: &PixelBuffer,
        top_alpha: Option<&[u8]>,
        _mode: BlendMode,
        opacity: f32,
    ) {
        let opacity = opacity.clamp(0.0, 1.0) as f64;
        let (w, h) = below.dimensions();
        for y in 0..h {
            for x in 0..w {
                let alpha = alpha_at(top_alpha, (y * w + x) as usize);
                if alpha == 0 {
                    continue;
                }
                let weight = opacity * alpha as f64 / 255.0;
                let mut t = top.sample(x as i64, y as i64);
                if weight < 1.0 {
                    t = t.scaled(weight);
                }
                if !t.is_black() {
                    below.set(x, y, t);
                }
            }
        }
    }

    fn name(&self) -> &str {
        "keyed"
    }
}
