//! The transform library.
//!
//! One pure function per [`ActionKind`], all sharing the [`TransformFn`]
//! signature: base pixels, parameters and the action's local step in, new
//! pixels out. Nothing here reads a clock or keeps state between calls, so
//! identical arguments always produce identical bytes.
//!
//! Every read outside the matrix resolves to black through
//! [`PixelBuffer::sample`]. No transform wraps coordinates.

use glowgrid_pattern_model::{ActionKind, ActionParams, PixelBuffer, Rgb};

use crate::error::TransformError;
use crate::params::{Axis, Params, RadialMode, RotateDirection, ScrollDirection, SweepDirection};

pub type TransformFn = fn(&PixelBuffer, &ActionParams, u32) -> Result<PixelBuffer, TransformError>;

/// Dispatch table from action kind to its transform.
pub fn transform_fn(kind: ActionKind) -> TransformFn {
    match kind {
        ActionKind::Scroll => scroll,
        ActionKind::Rotate => rotate,
        ActionKind::Mirror => mirror,
        ActionKind::Flip => flip,
        ActionKind::Wipe => wipe,
        ActionKind::Reveal => reveal,
        ActionKind::Bounce => bounce,
        ActionKind::Radial => radial,
        ActionKind::ColourCycle => colour_cycle,
        ActionKind::Invert => invert,
    }
}

/// Apply the transform for `kind`.
pub fn apply_transform(
    kind: ActionKind,
    pixels: &PixelBuffer,
    params: &ActionParams,
    local_step: u32,
) -> Result<PixelBuffer, TransformError> {
    transform_fn(kind)(pixels, params, local_step)
}

/// `offset * step` clamped so that shifted coordinates cannot overflow.
fn displacement(offset: u32, step: u32, extent: u32) -> i64 {
    (offset as u64 * step as u64).min(extent as u64 + 1) as i64
}

/// Translate content by `(dx, dy)`; vacated cells are black.
fn shift(pixels: &PixelBuffer, dx: i64, dy: i64) -> PixelBuffer {
    pixels.remap(|src, x, y| src.sample(x as i64 - dx, y as i64 - dy))
}

/// Moves content `offset` cells per step in `direction`.
pub fn scroll(pixels: &PixelBuffer, params: &ActionParams, step: u32) -> Result<PixelBuffer, TransformError> {
    let p = Params::new(ActionKind::Scroll, params);
    let direction = p.choice("direction", ScrollDirection::Right)?;
    let offset = p.uint("offset", 1)?;

    let (w, h) = pixels.dimensions();
    let (dx, dy) = match direction {
        ScrollDirection::Right => (displacement(offset, step, w), 0),
        ScrollDirection::Left => (-displacement(offset, step, w), 0),
        ScrollDirection::Down => (0, displacement(offset, step, h)),
        ScrollDirection::Up => (0, -displacement(offset, step, h)),
    };
    Ok(shift(pixels, dx, dy))
}

/// Quarter turns about the matrix centre: step 0 → 0°, 1 → 90°, 2 → 180°,
/// 3 → 270°, then repeating. The turn count comes from the local step alone;
/// no rotation state carries over between frames.
///
/// Coordinates are doubled so the centre of even-sized matrices stays on the
/// integer grid. Non-square matrices clip; uncovered cells are black.
pub fn rotate(pixels: &PixelBuffer, params: &ActionParams, step: u32) -> Result<PixelBuffer, TransformError> {
    let p = Params::new(ActionKind::Rotate, params);
    let direction = p.choice("direction", RotateDirection::Clockwise)?;

    let quarter_turns = match direction {
        RotateDirection::Clockwise => step % 4,
        RotateDirection::CounterClockwise => (4 - step % 4) % 4,
    };
    if quarter_turns == 0 {
        return Ok(pixels.clone());
    }

    let (w, h) = pixels.dimensions();
    let (cx2, cy2) = (w as i64 - 1, h as i64 - 1);
    Ok(pixels.remap(|src, x, y| {
        // Output offset from the centre, doubled.
        let ox = 2 * x as i64 - cx2;
        let oy = 2 * y as i64 - cy2;
        let (ix, iy) = match quarter_turns {
            1 => (oy, -ox),
            2 => (-ox, -oy),
            _ => (-oy, ox),
        };
        let (sx, sy) = (ix + cx2, iy + cy2);
        if sx % 2 != 0 || sy % 2 != 0 {
            return Rgb::BLACK;
        }
        src.sample(sx / 2, sy / 2)
    }))
}

fn reflect(pixels: &PixelBuffer, axis: Axis) -> PixelBuffer {
    let (w, h) = pixels.dimensions();
    pixels.remap(|src, x, y| match axis {
        Axis::Horizontal => src.sample((w - 1 - x) as i64, y as i64),
        Axis::Vertical => src.sample(x as i64, (h - 1 - y) as i64),
    })
}

/// Reflect left↔right (`horizontal`, default) or top↔bottom.
pub fn mirror(pixels: &PixelBuffer, params: &ActionParams, _step: u32) -> Result<PixelBuffer, TransformError> {
    let axis = Params::new(ActionKind::Mirror, params).choice("axis", Axis::Horizontal)?;
    Ok(reflect(pixels, axis))
}

/// Reflect top↔bottom (`vertical`, default) or left↔right.
pub fn flip(pixels: &PixelBuffer, params: &ActionParams, _step: u32) -> Result<PixelBuffer, TransformError> {
    let axis = Params::new(ActionKind::Flip, params).choice("axis", Axis::Vertical)?;
    Ok(reflect(pixels, axis))
}

/// Edge position `min(offset * step, extent)` along a sweep direction.
fn sweep_position(
    p: &Params<'_>,
    pixels: &PixelBuffer,
    step: u32,
) -> Result<(SweepDirection, u32), TransformError> {
    let direction = p.choice("direction", SweepDirection::LeftToRight)?;
    let offset = p.uint("offset", 1)?;
    let extent = match direction.axis() {
        Axis::Horizontal => pixels.width(),
        Axis::Vertical => pixels.height(),
    };
    let position = (offset as u64 * step as u64).min(extent as u64) as u32;
    Ok((direction, position))
}

/// Conceals: the first `position` lines along the direction become `colour`.
pub fn wipe(pixels: &PixelBuffer, params: &ActionParams, step: u32) -> Result<PixelBuffer, TransformError> {
    let p = Params::new(ActionKind::Wipe, params);
    let (direction, position) = sweep_position(&p, pixels, step)?;
    let colour = p.colour("colour", Rgb::BLACK)?;

    let (w, h) = pixels.dimensions();
    Ok(pixels.remap(|src, x, y| {
        if direction.depth(x, y, w, h) < position {
            colour
        } else {
            src.sample(x as i64, y as i64)
        }
    }))
}

/// Exposes: only the first `position` lines along the direction show content.
pub fn reveal(pixels: &PixelBuffer, params: &ActionParams, step: u32) -> Result<PixelBuffer, TransformError> {
    let p = Params::new(ActionKind::Reveal, params);
    let (direction, position) = sweep_position(&p, pixels, step)?;

    let (w, h) = pixels.dimensions();
    Ok(pixels.remap(|src, x, y| {
        if direction.depth(x, y, w, h) < position {
            src.sample(x as i64, y as i64)
        } else {
            Rgb::BLACK
        }
    }))
}

/// Triangle-wave displacement: 0, 1, .., A, A-1, .., 0, 1, .. (times `offset`).
fn triangle(offset: u32, step: u32, amplitude: u32) -> i64 {
    let period = 2 * amplitude as u64;
    let t = (offset as u64 * step as u64) % period;
    let d = if t <= amplitude as u64 { t } else { period - t };
    d as i64
}

/// Content travels up to `amplitude` cells in `direction` and back.
///
/// Without `direction`, `axis` picks right (`horizontal`, default) or down
/// (`vertical`). An explicit `direction` wins over `axis`.
pub fn bounce(pixels: &PixelBuffer, params: &ActionParams, step: u32) -> Result<PixelBuffer, TransformError> {
    let p = Params::new(ActionKind::Bounce, params);
    let axis = p.choice("axis", Axis::Horizontal)?;
    let direction = p.choice(
        "direction",
        match axis {
            Axis::Horizontal => ScrollDirection::Right,
            Axis::Vertical => ScrollDirection::Down,
        },
    )?;
    let offset = p.uint("offset", 1)?;
    let extent = match direction {
        ScrollDirection::Left | ScrollDirection::Right => pixels.width(),
        ScrollDirection::Up | ScrollDirection::Down => pixels.height(),
    };
    let amplitude = p.uint("amplitude", extent.saturating_sub(1))?;
    if amplitude == 0 {
        return Ok(pixels.clone());
    }

    let d = triangle(offset, step, amplitude);
    Ok(match direction {
        ScrollDirection::Right => shift(pixels, d, 0),
        ScrollDirection::Left => shift(pixels, -d, 0),
        ScrollDirection::Down => shift(pixels, 0, d),
        ScrollDirection::Up => shift(pixels, 0, -d),
    })
}

/// Pixel-centre coordinates of the matrix centre.
fn centre(pixels: &PixelBuffer) -> (f64, f64) {
    (
        (pixels.width() as f64 - 1.0) / 2.0,
        (pixels.height() as f64 - 1.0) / 2.0,
    )
}

/// Radial effects around the matrix centre, selected by `type`:
///
/// - `sweep` (default): a radar beam at `step * speed` degrees with a linear
///   trail `arc` degrees long; pixels are dimmed by how far they trail it.
/// - `spiral`: rotation by `step * speed` degrees, nearest neighbour.
/// - `pulse`: brightness breathing over `period` steps, dimmer toward the
///   corners.
pub fn radial(pixels: &PixelBuffer, params: &ActionParams, step: u32) -> Result<PixelBuffer, TransformError> {
    let p = Params::new(ActionKind::Radial, params);
    let (cx, cy) = centre(pixels);

    match p.choice("type", RadialMode::Sweep)? {
        RadialMode::Sweep => {
            let speed = p.number("speed", 30.0)?;
            let arc = p.number("arc", 90.0)?;
            if arc <= 0.0 {
                return Err(TransformError::invalid_param(
                    ActionKind::Radial,
                    "arc",
                    "must be greater than zero",
                ));
            }
            let beam = (step as f64 * speed).rem_euclid(360.0);
            Ok(pixels.remap(|src, x, y| {
                let angle = (y as f64 - cy).atan2(x as f64 - cx).to_degrees().rem_euclid(360.0);
                let trail = (beam - angle).rem_euclid(360.0);
                let factor = (1.0 - trail / arc).max(0.0);
                src.sample(x as i64, y as i64).scaled(factor)
            }))
        }
        RadialMode::Spiral => {
            let speed = p.number("speed", 30.0)?;
            let (sin, cos) = (step as f64 * speed).rem_euclid(360.0).to_radians().sin_cos();
            Ok(pixels.remap(|src, x, y| {
                let (ox, oy) = (x as f64 - cx, y as f64 - cy);
                let sx = cx + ox * cos + oy * sin;
                let sy = cy - ox * sin + oy * cos;
                src.sample(sx.round() as i64, sy.round() as i64)
            }))
        }
        RadialMode::Pulse => {
            let period = p.positive_uint("period", 10)?;
            let phase = (step % period) as f64 / period as f64;
            let pulse = 0.5 + 0.5 * (1.0 - (phase - 0.5).abs() * 2.0);
            let max_dist = cx.hypot(cy);
            Ok(pixels.remap(|src, x, y| {
                let dist = (x as f64 - cx).hypot(y as f64 - cy);
                let dist_factor = if max_dist > 0.0 { dist / max_dist } else { 0.0 };
                let factor = (1.0 - 0.5 * dist_factor) * pulse;
                src.sample(x as i64, y as i64).scaled(factor)
            }))
        }
    }
}

/// Rotate hue by `degrees_per_step * step` (default 30°/step). Greys keep
/// their value.
pub fn colour_cycle(pixels: &PixelBuffer, params: &ActionParams, step: u32) -> Result<PixelBuffer, TransformError> {
    let p = Params::new(ActionKind::ColourCycle, params);
    let degrees_per_step = p.number("degrees_per_step", 30.0)?;
    let shift = (degrees_per_step * step as f64).rem_euclid(360.0);
    if shift == 0.0 {
        return Ok(pixels.clone());
    }
    Ok(pixels.map(|c| rotate_hue(c, shift)))
}

fn rotate_hue(c: Rgb, degrees: f64) -> Rgb {
    if c.r == c.g && c.g == c.b {
        return c;
    }
    let (h, s, v) = rgb_to_hsv(c);
    hsv_to_rgb((h + degrees).rem_euclid(360.0), s, v)
}

fn rgb_to_hsv(c: Rgb) -> (f64, f64, f64) {
    let r = c.r as f64 / 255.0;
    let g = c.g as f64 / 255.0;
    let b = c.b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };
    (h, s, max)
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_u8 = |f: f64| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}

/// `255 - c` on every channel.
pub fn invert(pixels: &PixelBuffer, _params: &ActionParams, _step: u32) -> Result<PixelBuffer, TransformError> {
    Ok(pixels.map(|c| Rgb::new(255 - c.r, 255 - c.g, 255 - c.b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> ActionParams {
        serde_json::from_value(value).unwrap()
    }

    /// Cell (x, y) holds (x, y, 1).
    fn numbered(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, |x, y| Rgb::new(x as u8, y as u8, 1))
    }

    #[test]
    fn test_scroll_right_fills_black() {
        let buf = numbered(4, 1);
        let out = scroll(&buf, &ActionParams::new(), 1).unwrap();
        assert_eq!(out.get(0, 0), Some(Rgb::BLACK));
        assert_eq!(out.get(1, 0), buf.get(0, 0));
        assert_eq!(out.get(3, 0), buf.get(2, 0));
    }

    #[test]
    fn test_scroll_step_zero_is_identity() {
        let buf = numbered(5, 5);
        for dir in ["up", "down", "left", "right"] {
            let out = scroll(&buf, &params(json!({"direction": dir, "offset": 3})), 0).unwrap();
            assert_eq!(out, buf);
        }
    }

    #[test]
    fn test_scroll_beyond_extent_is_black() {
        let buf = PixelBuffer::filled(4, 4, Rgb::WHITE);
        let out = scroll(&buf, &params(json!({"direction": "up", "offset": 3})), u32::MAX).unwrap();
        assert!(out.is_blank());
    }

    #[test]
    fn test_scroll_rejects_bad_offset() {
        let buf = numbered(2, 2);
        let err = scroll(&buf, &params(json!({"offset": "fast"})), 1).unwrap_err();
        assert!(matches!(err, TransformError::InvalidParam { kind: ActionKind::Scroll, .. }));
    }

    #[test]
    fn test_rotate_quarter_turn_clockwise() {
        // 1 2      3 1
        // 3 4  ->  4 2
        let buf = PixelBuffer::from_pixels(
            2,
            2,
            vec![Rgb::new(1, 0, 0), Rgb::new(2, 0, 0), Rgb::new(3, 0, 0), Rgb::new(4, 0, 0)],
        )
        .unwrap();
        let out = rotate(&buf, &ActionParams::new(), 1).unwrap();
        assert_eq!(
            out.pixels(),
            &[Rgb::new(3, 0, 0), Rgb::new(1, 0, 0), Rgb::new(4, 0, 0), Rgb::new(2, 0, 0)]
        );

        let ccw = rotate(&buf, &params(json!({"direction": "counter_clockwise"})), 3).unwrap();
        assert_eq!(ccw, out);
    }

    #[test]
    fn test_rotate_turns_its_input_by_step() {
        let buf = numbered(3, 3);
        let once = rotate(&buf, &ActionParams::new(), 1).unwrap();
        assert_eq!(rotate(&buf, &ActionParams::new(), 1).unwrap(), once);
        // Whatever arrives is turned by the step's count, with no carried state.
        assert_eq!(
            rotate(&once, &ActionParams::new(), 1).unwrap(),
            rotate(&buf, &ActionParams::new(), 2).unwrap()
        );
        assert_eq!(rotate(&once, &ActionParams::new(), 4).unwrap(), once);
    }

    #[test]
    fn test_rotate_non_square_clips() {
        let buf = PixelBuffer::filled(4, 2, Rgb::WHITE);
        let out = rotate(&buf, &ActionParams::new(), 1).unwrap();
        assert_eq!(out.dimensions(), (4, 2));
        // Only the middle columns are covered by the rotated 2-wide strip.
        assert_eq!(out.get(0, 0), Some(Rgb::BLACK));
        assert_eq!(out.get(1, 0), Some(Rgb::WHITE));
        assert_eq!(out.get(2, 1), Some(Rgb::WHITE));
        assert_eq!(out.get(3, 1), Some(Rgb::BLACK));
    }

    #[test]
    fn test_mirror_and_flip_axes() {
        let buf = numbered(3, 2);
        let mirrored = mirror(&buf, &ActionParams::new(), 7).unwrap();
        assert_eq!(mirrored.get(0, 0), buf.get(2, 0));
        let flipped = flip(&buf, &ActionParams::new(), 7).unwrap();
        assert_eq!(flipped.get(0, 0), buf.get(0, 1));
        let flipped_h = flip(&buf, &params(json!({"axis": "horizontal"})), 0).unwrap();
        assert_eq!(flipped_h, mirrored);
    }

    #[test]
    fn test_wipe_progresses_and_clamps() {
        let buf = PixelBuffer::filled(4, 3, Rgb::WHITE);
        let p = params(json!({"direction": "right_to_left", "colour": [0, 0, 255]}));
        let out = wipe(&buf, &p, 1).unwrap();
        assert_eq!(out.get(3, 0), Some(Rgb::BLUE));
        assert_eq!(out.get(2, 0), Some(Rgb::WHITE));

        let done = wipe(&buf, &p, 100).unwrap();
        assert!(done.pixels().iter().all(|c| *c == Rgb::BLUE));
        assert_eq!(wipe(&buf, &p, 0).unwrap(), buf);
    }

    #[test]
    fn test_reveal_exposes_lines() {
        let buf = PixelBuffer::filled(3, 4, Rgb::GREEN);
        let p = params(json!({"direction": "bottom_to_top", "offset": 2}));
        assert!(reveal(&buf, &p, 0).unwrap().is_blank());
        let out = reveal(&buf, &p, 1).unwrap();
        assert_eq!(out.get(0, 3), Some(Rgb::GREEN));
        assert_eq!(out.get(0, 2), Some(Rgb::GREEN));
        assert_eq!(out.get(0, 1), Some(Rgb::BLACK));
        assert_eq!(reveal(&buf, &p, 9).unwrap(), buf);
    }

    #[test]
    fn test_bounce_triangle_wave() {
        let displacements: Vec<i64> = (0..9).map(|s| triangle(1, s, 3)).collect();
        assert_eq!(displacements, vec![0, 1, 2, 3, 2, 1, 0, 1, 2]);

        let mut buf = PixelBuffer::new(4, 1);
        buf.set(0, 0, Rgb::RED);
        let out = bounce(&buf, &ActionParams::new(), 3).unwrap();
        assert_eq!(out.get(3, 0), Some(Rgb::RED));
        let back = bounce(&buf, &ActionParams::new(), 6).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn test_bounce_left_and_up() {
        let mut row = PixelBuffer::new(4, 1);
        row.set(3, 0, Rgb::RED);
        let left = params(json!({"direction": "left"}));
        assert_eq!(bounce(&row, &left, 2).unwrap().get(1, 0), Some(Rgb::RED));
        assert_eq!(bounce(&row, &left, 3).unwrap().get(0, 0), Some(Rgb::RED));
        assert_eq!(bounce(&row, &left, 6).unwrap(), row);

        let mut column = PixelBuffer::new(1, 3);
        column.set(0, 2, Rgb::BLUE);
        let up = params(json!({"direction": "up"}));
        assert_eq!(bounce(&column, &up, 1).unwrap().get(0, 1), Some(Rgb::BLUE));
        assert_eq!(bounce(&column, &up, 2).unwrap().get(0, 0), Some(Rgb::BLUE));
        assert_eq!(bounce(&column, &up, 3).unwrap().get(0, 1), Some(Rgb::BLUE));
    }

    #[test]
    fn test_bounce_direction_overrides_axis() {
        let buf = numbered(4, 4);
        let vertical = params(json!({"axis": "vertical"}));
        let down = params(json!({"direction": "down"}));
        let up = params(json!({"axis": "horizontal", "direction": "up"}));
        assert_eq!(bounce(&buf, &vertical, 2).unwrap(), bounce(&buf, &down, 2).unwrap());
        assert_eq!(bounce(&buf, &up, 1).unwrap().get(0, 0), buf.get(0, 1));
        assert!(bounce(&buf, &params(json!({"direction": "sideways"})), 1).is_err());
    }

    #[test]
    fn test_bounce_zero_amplitude_is_noop() {
        let buf = numbered(1, 3);
        assert_eq!(bounce(&buf, &ActionParams::new(), 5).unwrap(), buf);
    }

    #[test]
    fn test_radial_sweep_beam_is_full_brightness() {
        let buf = PixelBuffer::filled(5, 5, Rgb::WHITE);
        let out = radial(&buf, &ActionParams::new(), 0).unwrap();
        // Beam at 0° points right from the centre.
        assert_eq!(out.get(4, 2), Some(Rgb::WHITE));
        // Directly above the centre (270°) trails the beam by 90°: dark.
        assert_eq!(out.get(2, 0), Some(Rgb::BLACK));
        // 45° behind the beam (315°, up-right) is at half brightness.
        assert_eq!(out.get(4, 0), Some(Rgb::new(127, 127, 127)));
    }

    #[test]
    fn test_radial_spiral_half_turn_matches_rotate() {
        let buf = numbered(5, 5);
        let spiral = radial(&buf, &params(json!({"type": "spiral", "speed": 90})), 2).unwrap();
        let rotated = rotate(&buf, &ActionParams::new(), 2).unwrap();
        assert_eq!(spiral, rotated);
    }

    #[test]
    fn test_radial_pulse_formula() {
        let buf = PixelBuffer::filled(3, 3, Rgb::new(200, 100, 0));
        let p = params(json!({"type": "pulse"}));
        // Phase 0.5 is the pulse peak; the centre pixel is undimmed.
        let peak = radial(&buf, &p, 5).unwrap();
        assert_eq!(peak.get(1, 1), Some(Rgb::new(200, 100, 0)));
        // Corners are at max distance: factor 0.5.
        assert_eq!(peak.get(0, 0), Some(Rgb::new(100, 50, 0)));
        // Phase 0: pulse factor 0.5.
        let trough = radial(&buf, &p, 0).unwrap();
        assert_eq!(trough.get(1, 1), Some(Rgb::new(100, 50, 0)));

        assert!(radial(&buf, &params(json!({"type": "pulse", "period": 0})), 1).is_err());
        assert!(radial(&buf, &params(json!({"type": "vortex"})), 1).is_err());
    }

    #[test]
    fn test_colour_cycle_hue_rotation() {
        let buf = PixelBuffer::from_pixels(3, 1, vec![Rgb::RED, Rgb::new(90, 90, 90), Rgb::BLUE]).unwrap();
        let p = params(json!({"degrees_per_step": 120}));
        let out = colour_cycle(&buf, &p, 1).unwrap();
        assert_eq!(out.pixels(), &[Rgb::GREEN, Rgb::new(90, 90, 90), Rgb::RED]);
        assert_eq!(colour_cycle(&buf, &p, 3).unwrap(), buf);
        assert_eq!(colour_cycle(&buf, &ActionParams::new(), 0).unwrap(), buf);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let buf = numbered(3, 3);
        let once = invert(&buf, &ActionParams::new(), 0).unwrap();
        assert_eq!(once.get(0, 0), Some(Rgb::new(255, 255, 254)));
        assert_eq!(invert(&once, &ActionParams::new(), 9).unwrap(), buf);
    }

    #[test]
    fn test_dispatch_covers_every_kind() {
        let buf = numbered(4, 4);
        for kind in ActionKind::ALL {
            let out = apply_transform(kind, &buf, &ActionParams::new(), 1).unwrap();
            assert_eq!(out.dimensions(), buf.dimensions(), "{kind}");
        }
    }
}
