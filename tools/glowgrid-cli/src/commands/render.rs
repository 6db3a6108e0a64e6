//! Render composited frames to the terminal.

use std::path::PathBuf;

use glowgrid_common::config::AppConfig;
use glowgrid_pattern_model::PixelBuffer;
use glowgrid_render_engine::{LiveRenderer, RenderOptions, Strictness};

pub struct RenderArgs {
    pub path: PathBuf,
    pub frame: u32,
    pub count: u32,
    pub keyed: bool,
    pub strict: bool,
    pub json: bool,
}

pub fn run(args: RenderArgs, config: &AppConfig) -> anyhow::Result<()> {
    let pattern = super::load_pattern(&args.path)?;

    let mut options = RenderOptions::from_config(&config.automation);
    if args.strict {
        options.strictness = Strictness::Strict;
    }
    let renderer = if args.keyed {
        LiveRenderer::keyed()
    } else {
        LiveRenderer::standard()
    }
    .with_options(options);

    let end = args
        .frame
        .checked_add(args.count)
        .ok_or_else(|| anyhow::anyhow!("Frame range overflows"))?;
    let frames = renderer.render_range(&pattern, args.frame..end)?;

    if args.json {
        let out: Vec<_> = frames
            .iter()
            .zip(args.frame..)
            .map(|(pixels, index)| serde_json::json!({ "frame": index, "pixels": pixels }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (pixels, index) in frames.iter().zip(args.frame..) {
        println!("Frame {index} ({} lit)", pixels.lit_pixels().len());
        print!("{}", ascii(pixels));
    }
    Ok(())
}

/// One character per LED, shaded by brightness.
fn ascii(pixels: &PixelBuffer) -> String {
    const RAMP: &[u8] = b" .:-=+*#%@";
    let mut out = String::with_capacity(((pixels.width() + 1) * pixels.height()) as usize);
    for y in 0..pixels.height() {
        for x in 0..pixels.width() {
            let c = pixels.sample(x as i64, y as i64);
            let level = (c.r as usize + c.g as usize + c.b as usize) / 3;
            out.push(RAMP[level * (RAMP.len() - 1) / 255] as char);
        }
        out.push('\n');
    }
    out
}
