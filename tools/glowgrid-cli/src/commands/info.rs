//! Show pattern information.

use std::path::PathBuf;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let pattern = super::load_pattern(&path)?;

    println!("Pattern: {}", pattern.name);
    println!("  Version: {}", pattern.version);
    println!("  Created: {}", pattern.created_at);
    println!("  Modified: {}", pattern.modified_at);
    println!(
        "  Matrix: {}x{} @ {}fps",
        pattern.width(),
        pattern.height(),
        pattern.fps
    );
    println!("  Timeline: {} frame(s)", pattern.timeline_len());
    println!();

    println!("Layers (bottom to top):");
    for layer in pattern.layers_by_z() {
        let baked = layer.frames().filter(|(_, f)| f.is_baked).count();
        let transparent = layer.frames().filter(|(_, f)| f.has_transparency()).count();
        println!(
            "  [{}] {} z={} blend={} opacity={:.2}{}{}",
            layer.id,
            layer.name,
            layer.z_index,
            layer.blend_mode,
            layer.opacity,
            if layer.visible { "" } else { " hidden" },
            if layer.locked { " locked" } else { "" },
        );
        println!(
            "      Frames: {} stored, {} baked, {} with transparency, span {}",
            layer.stored_frames(),
            baked,
            transparent,
            layer.frame_count()
        );
        if layer.start_frame.is_some() || layer.end_frame.is_some() {
            println!(
                "      Window: {}..={}",
                layer.start_frame.map_or("0".to_string(), |s| s.to_string()),
                layer.end_frame.map_or("end".to_string(), |e| e.to_string())
            );
        }
        for (index, action) in layer.actions().iter().enumerate() {
            println!(
                "      Action {index}: {} (priority {}){}",
                action.label(),
                action.priority(),
                if action.finalized { " finalized" } else { "" }
            );
        }
    }

    Ok(())
}
