//! Attach an automation action to a layer.

use std::path::PathBuf;

use anyhow::Context;
use glowgrid_automation::{evaluate_pipeline_detailed, parse_action_kind};
use glowgrid_pattern_model::Action;

pub struct AddActionArgs {
    pub path: PathBuf,
    pub kind: String,
    pub layer: Option<u32>,
    pub start: u32,
    pub end: Option<u32>,
    pub params: Vec<String>,
    pub name: Option<String>,
}

pub fn run(args: AddActionArgs) -> anyhow::Result<()> {
    let mut pattern = super::load_pattern(&args.path)?;
    let layer = super::resolve_layer(&pattern, args.layer)?;

    let kind = parse_action_kind(&args.kind)?;
    let mut action = Action::with_window(kind, args.start, args.end)?;
    for assignment in &args.params {
        action
            .params
            .insert_assignment(assignment)
            .with_context(|| format!("Bad parameter for {kind}"))?;
    }
    if let Some(name) = args.name {
        action = action.named(name);
    }

    // Surface parameter problems now; a render would only log and skip them.
    if let Some((_, frame)) = pattern.layer(layer).and_then(|l| l.frames().next()) {
        let probe = evaluate_pipeline_detailed(
            &frame.pixels,
            std::slice::from_ref(&action),
            action.start_frame,
        );
        if let Some(skipped) = probe.skipped.first() {
            anyhow::bail!("Invalid {kind} action: {}", skipped.error);
        }
    }

    let label = action.label();
    let index = pattern.add_action(layer, action)?;
    pattern.touch();
    super::save_pattern(&pattern, &args.path)?;

    println!("Added action {index} to layer {layer}: {label}");
    Ok(())
}
