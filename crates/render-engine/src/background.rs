//! Async entry points.

use glowgrid_common::error::{GlowgridError, GlowgridResult};
use glowgrid_pattern_model::{EditContext, EditError, IsolationViolation, Pattern};

use crate::generator::{bake_source, commit_bake, generate_frames, BakeOutcome, BakeRequest, GenerationError};
use crate::live::RenderError;

impl From<GenerationError> for GlowgridError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Cancelled { .. } => GlowgridError::cancelled(err.to_string()),
            GenerationError::Edit(e) => GlowgridError::edit(e.to_string()),
            other => GlowgridError::generation(other.to_string()),
        }
    }
}

impl From<RenderError> for GlowgridError {
    fn from(err: RenderError) -> Self {
        GlowgridError::render(err.to_string())
    }
}

/// Bake the active layer's automation off the async runtime.
///
/// Frame generation runs on a blocking worker against a copy of the source
/// frame and actions; the pattern is only touched once every frame exists.
pub async fn bake_in_background(
    pattern: &mut Pattern,
    ctx: EditContext,
    request: BakeRequest,
) -> GlowgridResult<BakeOutcome> {
    ctx.validate().map_err(GenerationError::from)?;
    if pattern.gate().is_rendering() {
        return Err(GenerationError::from(EditError::from(IsolationViolation::RenderInProgress)).into());
    }
    let source = bake_source(pattern, &ctx)?;

    tracing::info!(
        pattern = %pattern.name,
        layer = %ctx.active_layer_id,
        frames = request.frame_count,
        "Starting background bake"
    );

    let BakeRequest {
        frame_count,
        finalize_actions,
        options,
    } = request;
    let start = source.start;
    let frames = tokio::task::spawn_blocking(move || {
        generate_frames(&source.frame, &source.actions, start, frame_count, &options)
    })
    .await
    .map_err(|e| GlowgridError::generation(format!("generation worker failed: {e}")))??;

    Ok(commit_bake(pattern, ctx, frames, finalize_actions)?)
}
