//! Priority-ordered evaluation of a layer's actions for one frame.
//!
//! Both the frame generator and the live renderer go through
//! [`evaluate_pipeline`]; local steps are only ever computed by
//! [`Action::local_step`].

use glowgrid_pattern_model::{Action, ActionKind, Frame, PixelBuffer, Rgb};

use crate::error::TransformError;
use crate::transforms::transform_fn;

/// One entry of the execution plan for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAction<'a> {
    /// Position in the layer's action list.
    pub index: usize,
    pub action: &'a Action,
    /// Frames since the action's `start_frame`.
    pub step: u32,
}

/// An action that was active but failed to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAction {
    pub index: usize,
    pub kind: ActionKind,
    pub error: TransformError,
}

/// Result of a pipeline run with bookkeeping for callers that surface
/// warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub pixels: PixelBuffer,
    /// Indices of the actions that ran, in execution order.
    pub applied: Vec<usize>,
    pub skipped: Vec<SkippedAction>,
}

/// Active actions at `frame_index`, in execution order: ascending priority,
/// ties in list order.
pub fn schedule(actions: &[Action], frame_index: u32) -> Vec<ScheduledAction<'_>> {
    let mut plan: Vec<ScheduledAction<'_>> = actions
        .iter()
        .enumerate()
        .filter_map(|(index, action)| {
            action
                .local_step(frame_index)
                .map(|step| ScheduledAction { index, action, step })
        })
        .collect();
    plan.sort_by_key(|s| s.action.priority());
    plan
}

/// Run every active action over `base` and report what happened.
///
/// A failing action is skipped with a warning; the remaining actions still
/// run on the pixels produced so far.
pub fn evaluate_pipeline_detailed(base: &PixelBuffer, actions: &[Action], frame_index: u32) -> Evaluation {
    let plan = schedule(actions, frame_index);
    let mut pixels = base.clone();
    let mut applied = Vec::with_capacity(plan.len());
    let mut skipped = Vec::new();

    for scheduled in plan {
        let action = scheduled.action;
        match transform_fn(action.kind)(&pixels, &action.params, scheduled.step) {
            Ok(next) => {
                pixels = next;
                applied.push(scheduled.index);
            }
            Err(error) => {
                tracing::warn!(
                    frame = frame_index,
                    action = scheduled.index,
                    kind = %action.kind,
                    error = %error,
                    "skipping action"
                );
                skipped.push(SkippedAction {
                    index: scheduled.index,
                    kind: action.kind,
                    error,
                });
            }
        }
    }

    tracing::trace!(
        frame = frame_index,
        applied = applied.len(),
        skipped = skipped.len(),
        "evaluated pipeline"
    );
    Evaluation {
        pixels,
        applied,
        skipped,
    }
}

/// Pixels of `base` after every action active at `frame_index`.
pub fn evaluate_pipeline(base: &PixelBuffer, actions: &[Action], frame_index: u32) -> PixelBuffer {
    evaluate_pipeline_detailed(base, actions, frame_index).pixels
}

/// The alpha channel of `frame` as it stands after the actions active at
/// `frame_index`, or `None` when the frame is fully opaque.
///
/// Only pixel-moving actions touch alpha, in the same order and with the same
/// steps as [`evaluate_pipeline`]. Transparency rides through the transforms
/// as a grey level, so cells shifted in from outside the matrix come out
/// opaque, like the black that enters the colour channels.
pub fn evaluate_alpha(frame: &Frame, actions: &[Action], frame_index: u32) -> Option<Vec<u8>> {
    if frame.alpha.is_none() {
        return None;
    }
    let (w, h) = frame.pixels.dimensions();
    let mut mask = PixelBuffer::from_fn(w, h, |x, y| {
        let t = u8::MAX - frame.alpha_at((y * w + x) as usize);
        Rgb::new(t, t, t)
    });

    for scheduled in schedule(actions, frame_index) {
        let action = scheduled.action;
        if !action.kind.moves_pixels() {
            continue;
        }
        match transform_fn(action.kind)(&mask, &action.params, scheduled.step) {
            Ok(next) => mask = next,
            Err(error) => {
                tracing::trace!(action = scheduled.index, error = %error, "alpha skips action");
            }
        }
    }
    Some(mask.pixels().iter().map(|c| u8::MAX - c.r).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowgrid_pattern_model::Rgb;

    fn dot(w: u32, h: u32, x: u32, y: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        buf.set(x, y, Rgb::RED);
        buf
    }

    #[test]
    fn test_schedule_orders_by_priority_then_insertion() {
        let actions = vec![
            Action::new(ActionKind::Invert, 0),
            Action::new(ActionKind::Flip, 0),
            Action::new(ActionKind::Scroll, 0),
            Action::new(ActionKind::Mirror, 0),
            Action::new(ActionKind::Rotate, 4),
        ];
        let order: Vec<usize> = schedule(&actions, 2).iter().map(|s| s.index).collect();
        assert_eq!(order, vec![2, 1, 3, 0]);

        let steps: Vec<u32> = schedule(&actions, 6).iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![6, 2, 6, 6, 6]);
    }

    #[test]
    fn test_no_actions_returns_copy_of_base() {
        let base = dot(3, 3, 1, 1);
        assert_eq!(evaluate_pipeline(&base, &[], 42), base);
    }

    #[test]
    fn test_window_bounds_steps() {
        let base = dot(8, 1, 0, 0);
        let actions = vec![Action::with_window(ActionKind::Scroll, 5, Some(10)).unwrap()];
        assert_eq!(evaluate_pipeline(&base, &actions, 3), base);
        assert_eq!(evaluate_pipeline(&base, &actions, 5), base);
        assert_eq!(evaluate_pipeline(&base, &actions, 10), dot(8, 1, 5, 0));
        assert_eq!(evaluate_pipeline(&base, &actions, 11), base);
    }

    #[test]
    fn test_invalid_action_is_skipped() {
        let base = dot(4, 1, 0, 0);
        let actions = vec![
            Action::new(ActionKind::Scroll, 0).with_param("direction", "sideways"),
            Action::new(ActionKind::Invert, 0),
        ];
        let eval = evaluate_pipeline_detailed(&base, &actions, 1);
        assert_eq!(eval.applied, vec![1]);
        assert_eq!(eval.skipped.len(), 1);
        assert_eq!(eval.skipped[0].index, 0);
        assert_eq!(eval.skipped[0].kind, ActionKind::Scroll);
        assert_eq!(eval.pixels.get(0, 0), Some(Rgb::new(0, 255, 255)));
    }

    #[test]
    fn test_finalized_actions_do_not_run() {
        let base = dot(4, 1, 0, 0);
        let mut action = Action::new(ActionKind::Invert, 0);
        action.finalized = true;
        assert_eq!(evaluate_pipeline(&base, &[action], 3), base);
    }

    #[test]
    fn test_geometry_runs_before_colour_regardless_of_order() {
        let base = dot(4, 4, 0, 0);
        let wipe_first = vec![
            Action::new(ActionKind::Wipe, 0).with_param("colour", serde_json::json!([0, 0, 255])),
            Action::new(ActionKind::Scroll, 0),
        ];
        let scroll_first: Vec<Action> = wipe_first.iter().rev().cloned().collect();
        assert_eq!(
            evaluate_pipeline(&base, &wipe_first, 1),
            evaluate_pipeline(&base, &scroll_first, 1)
        );
        // Scroll moved the dot to x=1 before the wipe covered column 0.
        let out = evaluate_pipeline(&base, &wipe_first, 1);
        assert_eq!(out.get(0, 0), Some(Rgb::BLUE));
        assert_eq!(out.get(1, 0), Some(Rgb::RED));
    }

    #[test]
    fn test_alpha_follows_geometry_only() {
        let mut frame = Frame::new(dot(4, 1, 0, 0), 100);
        frame.alpha = Some(vec![0, 255, 255, 128]);
        let actions = vec![
            Action::new(ActionKind::Invert, 0),
            Action::new(ActionKind::Scroll, 0),
        ];
        assert_eq!(
            evaluate_alpha(&frame, &actions, 1),
            Some(vec![255, 0, 255, 255])
        );
        assert_eq!(
            evaluate_alpha(&frame, &[Action::new(ActionKind::Invert, 0)], 1),
            frame.alpha
        );
        assert_eq!(evaluate_alpha(&Frame::new(dot(4, 1, 0, 0), 100), &actions, 1), None);
    }
}
