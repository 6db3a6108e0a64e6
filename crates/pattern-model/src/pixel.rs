//! RGB pixels and the row-major pixel grid every transform reads and writes.

use serde::{Deserialize, Serialize};

/// A single LED colour. Serialized as a `[r, g, b]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }

    /// Scale every channel by `factor` (clamped to `[0, 1]`), flooring toward zero.
    pub fn scaled(&self, factor: f64) -> Rgb {
        let f = factor.clamp(0.0, 1.0);
        Rgb::new(
            (self.r as f64 * f) as u8,
            (self.g as f64 * f) as u8,
            (self.b as f64 * f) as u8,
        )
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        c.channels()
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb::new(r, g, b)
    }
}

/// Errors raised when a pixel grid does not describe a valid matrix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PixelBufferError {
    #[error("pixel buffer must have non-zero dimensions, got {width}x{height}")]
    ZeroSized { width: u32, height: u32 },

    #[error("pixel buffer {width}x{height} expects {expected} pixels, found {actual}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A `width x height` grid of RGB pixels stored row-major.
///
/// Reads outside the grid through [`PixelBuffer::sample`] resolve to black.
/// Nothing in the workspace wraps coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    /// A black buffer. Zero dimensions are allowed here only so callers can
    /// build placeholders; [`PixelBuffer::validate`] rejects them.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgb::BLACK)
    }

    pub fn filled(width: u32, height: u32, colour: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![colour; width as usize * height as usize],
        }
    }

    /// Build a buffer from row-major pixels, checking the pixel count.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<Rgb>,
    ) -> Result<Self, PixelBufferError> {
        let buffer = Self {
            width,
            height,
            pixels,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Build a buffer by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Check the structural invariants. Buffers deserialized from disk may
    /// violate them.
    pub fn validate(&self) -> Result<(), PixelBufferError> {
        if self.width == 0 || self.height == 0 {
            return Err(PixelBufferError::ZeroSized {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize;
        if self.pixels.len() != expected {
            return Err(PixelBufferError::LengthMismatch {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
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

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Rgb> {
        self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        self.index(x, y).and_then(|i| self.pixels.get(i).copied())
    }

    /// Pixel at signed coordinates; anything outside the grid is black.
    pub fn sample(&self, x: i64, y: i64) -> Rgb {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Rgb::BLACK;
        }
        self.get(x as u32, y as u32).unwrap_or(Rgb::BLACK)
    }

    /// Write a pixel. Returns `false` when `(x, y)` is outside the grid.
    pub fn set(&mut self, x: u32, y: u32, colour: Rgb) -> bool {
        match self.index(x, y) {
            Some(i) if i < self.pixels.len() => {
                self.pixels[i] = colour;
                true
            }
            _ => false,
        }
    }

    pub fn fill(&mut self, colour: Rgb) {
        self.pixels.iter_mut().for_each(|p| *p = colour);
    }

    /// Apply `f` to every pixel, producing a new buffer of the same size.
    pub fn map(&self, f: impl Fn(Rgb) -> Rgb) -> PixelBuffer {
        PixelBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|p| f(*p)).collect(),
        }
    }

    /// Build a same-sized buffer where each cell is `f(self, x, y)`.
    pub fn remap(&self, f: impl Fn(&PixelBuffer, u32, u32) -> Rgb) -> PixelBuffer {
        PixelBuffer::from_fn(self.width, self.height, |x, y| f(self, x, y))
    }

    /// True when every pixel is black.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(Rgb::is_black)
    }

    /// Coordinates of every non-black pixel, row-major.
    pub fn lit_pixels(&self) -> Vec<(u32, u32, Rgb)> {
        let w = self.width.max(1);
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_black())
            .map(|(i, p)| ((i as u32) % w, (i as u32) / w, *p))
            .collect()
    }

    /// 64-bit FNV-1a hash of the dimensions and pixel bytes.
    pub fn fingerprint(&self) -> u64 {
        let mut hash = Fnv1a::new();
        self.feed(&mut hash);
        hash.finish()
    }

    pub(crate) fn feed(&self, hash: &mut Fnv1a) {
        hash.write(&self.width.to_le_bytes());
        hash.write(&self.height.to_le_bytes());
        for p in &self.pixels {
            hash.write(&p.channels());
        }
    }
}

/// Incremental 64-bit FNV-1a.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fnv1a(u64);

impl Fnv1a {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub(crate) fn new() -> Self {
        Self(Self::OFFSET)
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= *byte as u64;
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    pub(crate) fn finish(&self) -> u64 {
        self.0
    }
}
