//! Baked-mode frame generation.
//!
//! Drives the shared pipeline evaluator across a run of absolute frame
//! indices and materialises the results as baked frames. [`bake_layer`] is
//! the end-to-end operation: read the active frame, generate, append through
//! the edit isolation guard, then finalize the layer's actions.

use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glowgrid_automation::{evaluate_alpha, evaluate_pipeline};
use glowgrid_common::config::AutomationConfig;
use glowgrid_pattern_model::{
    get_frame_for_read, Action, EditContext, EditError, Frame, IsolationViolation, LayerId,
    ModelError, Pattern,
};
use serde::{Deserialize, Serialize};

/// Errors that stop a generation run. Nothing partial is ever returned or
/// stored when one of these occurs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("generation aborted: {reason}")]
    Aborted { reason: String },

    #[error("source frame is baked output; re-automating it requires force")]
    BakedSource,

    #[error("generation cancelled after {generated} of {total} frames")]
    Cancelled { generated: u32, total: u32 },

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl GenerationError {
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }
}

/// Cooperative cancellation flag, checked between frames.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress report for a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationProgress {
    /// Frames generated so far.
    pub frames_generated: u32,

    /// Total frames requested.
    pub total_frames: u32,

    /// Current progress [0.0, 1.0].
    pub progress: f64,
}

/// Progress callback for frame generation.
pub type ProgressCallback = Arc<dyn Fn(GenerationProgress) + Send + Sync>;

#[derive(Clone, Default)]
pub struct GenerationOptions {
    /// Allow a baked frame as the source.
    pub force: bool,

    pub cancel: Option<CancellationToken>,

    pub progress: Option<ProgressCallback>,
}

impl fmt::Debug for GenerationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationOptions")
            .field("force", &self.force)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl GenerationOptions {
    pub fn from_config(config: &AutomationConfig) -> Self {
        Self {
            force: config.allow_rebake,
            ..Self::default()
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, callback: impl Fn(GenerationProgress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn report(&self, frames_generated: u32, total_frames: u32) {
        if let Some(cb) = &self.progress {
            let progress = if total_frames == 0 {
                1.0
            } else {
                frames_generated as f64 / total_frames as f64
            };
            cb(GenerationProgress {
                frames_generated,
                total_frames,
                progress,
            });
        }
    }
}

/// Generate `frame_count` baked frames for absolute indices
/// `starting_frame_index..starting_frame_index + frame_count`.
///
/// Each output frame is `evaluate_pipeline(source, actions, index)` with the
/// source's duration. A source alpha channel is carried along, moved by the
/// same geometric actions as the colours. `frame_count` only bounds the run; it never changes
/// the step an action sees at a given index.
pub fn generate_frames(
    source_frame: &Frame,
    actions: &[Action],
    starting_frame_index: u32,
    frame_count: u32,
    options: &GenerationOptions,
) -> Result<Vec<Frame>, GenerationError> {
    if source_frame.is_baked && !options.force {
        return Err(GenerationError::BakedSource);
    }
    source_frame
        .pixels
        .validate()
        .and_then(|()| source_frame.validate_alpha())
        .map_err(|e| GenerationError::aborted(format!("source pixels are corrupt: {e}")))?;
    let end = starting_frame_index.checked_add(frame_count).ok_or_else(|| {
        GenerationError::aborted(format!(
            "{frame_count} frames from index {starting_frame_index} overflow the frame index range"
        ))
    })?;

    tracing::info!(
        start = starting_frame_index,
        count = frame_count,
        actions = actions.len(),
        "Generating frames"
    );

    let mut frames = Vec::with_capacity(frame_count as usize);
    options.report(0, frame_count);
    for frame_index in starting_frame_index..end {
        if options.is_cancelled() {
            tracing::info!(
                generated = frames.len(),
                total = frame_count,
                "Generation cancelled"
            );
            return Err(GenerationError::Cancelled {
                generated: frames.len() as u32,
                total: frame_count,
            });
        }

        let pixels = evaluate_pipeline(&source_frame.pixels, actions, frame_index);
        frames.push(Frame {
            alpha: evaluate_alpha(source_frame, actions, frame_index),
            ..Frame::baked(pixels, source_frame.duration_ms)
        });
        tracing::debug!(frame = frame_index, "generated frame");
        options.report(frames.len() as u32, frame_count);
    }

    tracing::info!(generated = frames.len(), "Generation complete");
    Ok(frames)
}

/// A bake of the active layer's automation into real frames.
#[derive(Debug, Clone)]
pub struct BakeRequest {
    pub frame_count: u32,

    /// Mark the layer's actions as finalized afterwards, so live rendering
    /// does not apply them a second time over the baked frames.
    pub finalize_actions: bool,

    pub options: GenerationOptions,
}

impl BakeRequest {
    pub fn new(frame_count: u32) -> Self {
        Self {
            frame_count,
            finalize_actions: true,
            options: GenerationOptions::default(),
        }
    }

    pub fn from_config(frame_count: u32, config: &AutomationConfig) -> Self {
        Self {
            frame_count,
            finalize_actions: config.finalize_after_bake,
            options: GenerationOptions::from_config(config),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeOutcome {
    pub layer: LayerId,

    /// Absolute indices of the appended frames.
    pub frames: Range<u32>,

    /// Number of actions that were finalized.
    pub finalized: usize,
}

/// Inputs to a generation run, captured from the active layer.
pub(crate) struct BakeSource {
    pub(crate) frame: Frame,
    pub(crate) actions: Vec<Action>,
    pub(crate) start: u32,
}

/// Read the active frame and actions without mutating anything.
pub(crate) fn bake_source(pattern: &Pattern, ctx: &EditContext) -> Result<BakeSource, GenerationError> {
    let layer = pattern
        .layer(ctx.active_layer_id)
        .ok_or(EditError::LayerNotFound(ctx.active_layer_id))?;
    if layer.locked {
        return Err(EditError::from(IsolationViolation::LayerLocked(layer.id)).into());
    }
    let frame = get_frame_for_read(layer, ctx.active_frame_index)?;
    Ok(BakeSource {
        frame: frame.clone(),
        actions: layer.actions().to_vec(),
        start: layer.frame_count(),
    })
}

/// Append generated frames to the active layer and optionally finalize its
/// actions. Both happen under one edit guard, so no render can observe the
/// frames without the finalized actions.
pub(crate) fn commit_bake(
    pattern: &mut Pattern,
    ctx: EditContext,
    frames: Vec<Frame>,
    finalize_actions: bool,
) -> Result<BakeOutcome, GenerationError> {
    let layer = ctx.active_layer_id;
    let (range, finalized) = {
        let mut editor = pattern.editor(ctx)?;
        let range = editor.append_baked_frames(layer, frames)?;
        let finalized = if finalize_actions {
            editor.finalize_actions(layer)?
        } else {
            0
        };
        (range, finalized)
    };
    pattern.touch();

    tracing::info!(
        layer = %layer,
        start = range.start,
        end = range.end,
        finalized,
        "Baked automation into frames"
    );
    Ok(BakeOutcome {
        layer,
        frames: range,
        finalized,
    })
}

/// Bake the active layer's actions into `request.frame_count` new frames
/// appended after its last frame. All-or-nothing: on any error the pattern
/// is unchanged.
pub fn bake_layer(
    pattern: &mut Pattern,
    ctx: EditContext,
    request: &BakeRequest,
) -> Result<BakeOutcome, GenerationError> {
    ctx.validate()?;
    if pattern.gate().is_rendering() {
        return Err(EditError::from(IsolationViolation::RenderInProgress).into());
    }
    let source = bake_source(pattern, &ctx)?;
    let frames = generate_frames(
        &source.frame,
        &source.actions,
        source.start,
        request.frame_count,
        &request.options,
    )?;
    commit_bake(pattern, ctx, frames, request.finalize_actions)
}
