//! Create a new pattern file.

use std::path::PathBuf;

use glowgrid_common::config::AppConfig;
use glowgrid_pattern_model::{Pattern, PATTERN_FILE_EXTENSION};

pub struct NewArgs {
    pub name: String,
    pub output: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub empty: bool,
}

pub fn run(args: NewArgs, config: &AppConfig) -> anyhow::Result<()> {
    let defaults = &config.defaults;
    let width = args.width.unwrap_or(defaults.width);
    let height = args.height.unwrap_or(defaults.height);
    let fps = args.fps.unwrap_or(defaults.fps);
    if width == 0 || height == 0 || fps == 0 {
        anyhow::bail!("Width, height and fps must be positive (got {width}x{height} @ {fps}fps)");
    }

    let dir = args.output.unwrap_or_else(|| config.patterns_dir.clone());
    let path = dir.join(format!("{}.{PATTERN_FILE_EXTENSION}", args.name));
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let pattern = if args.empty {
        Pattern::new(&args.name, width, height, fps)
    } else {
        Pattern::with_blank_frame(&args.name, width, height, fps, defaults.frame_duration_ms)
    };
    super::save_pattern(&pattern, &path)?;

    println!("Created pattern '{}' at {}", args.name, path.display());
    println!("  Matrix: {width}x{height} @ {fps}fps");
    println!(
        "  Layers: {} ({})",
        pattern.layers().len(),
        if args.empty { "no frames" } else { "one blank frame" }
    );

    Ok(())
}
