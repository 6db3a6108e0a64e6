//! Validate a pattern file.

use std::path::PathBuf;

use glowgrid_automation::evaluate_pipeline_detailed;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating pattern at: {}", path.display());

    let pattern = super::load_pattern(&path)?;
    println!("  Name: {}", pattern.name);
    println!("  Matrix: {}x{}", pattern.width(), pattern.height());
    println!("  Layers: {}", pattern.layers().len());

    let mut issues = pattern.validate();

    // Dry-run every action once against its layer's first frame so bad
    // parameters show up before a render silently skips them.
    for layer in pattern.layers() {
        let Some((_, frame)) = layer.frames().next() else {
            continue;
        };
        for action in layer.actions() {
            let probe = evaluate_pipeline_detailed(
                &frame.pixels,
                std::slice::from_ref(action),
                action.start_frame,
            );
            for skipped in probe.skipped {
                issues.push(format!("Layer {} {}: {}", layer.id, action.label(), skipped.error));
            }
        }
    }

    if issues.is_empty() {
        println!("\nPattern is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!("\n{} issue(s) found.", issues.len());
    }

    Ok(())
}
