pub mod add_action;
pub mod bake;
pub mod info;
pub mod new;
pub mod render;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use glowgrid_pattern_model::{LayerId, Pattern};

pub(crate) fn load_pattern(path: &Path) -> anyhow::Result<Pattern> {
    Pattern::load(path).with_context(|| format!("Failed to load pattern {}", path.display()))
}

pub(crate) fn save_pattern(pattern: &Pattern, path: &Path) -> anyhow::Result<()> {
    pattern
        .save(path)
        .with_context(|| format!("Failed to save pattern {}", path.display()))
}

/// The requested layer, or the bottom layer when none is given.
pub(crate) fn resolve_layer(pattern: &Pattern, layer: Option<u32>) -> anyhow::Result<LayerId> {
    match layer {
        Some(raw) => {
            let id = LayerId(raw);
            pattern
                .layer(id)
                .map(|l| l.id)
                .ok_or_else(|| anyhow::anyhow!("Pattern has no layer {id}"))
        }
        None => pattern
            .layers_by_z()
            .first()
            .map(|l| l.id)
            .ok_or_else(|| anyhow::anyhow!("Pattern has no layers")),
    }
}
