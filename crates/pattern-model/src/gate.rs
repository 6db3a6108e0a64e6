//! Render/edit mutual exclusion.
//!
//! A [`ModeGate`] is shared (via `Arc`) between a pattern and anything that
//! renders it. Renders may overlap each other; an edit excludes every render
//! and every other edit. Both sides are plain atomics, so entering or leaving
//! a mode never blocks: a conflicting request is rejected immediately.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::IsolationViolation;

#[derive(Debug, Default)]
pub struct ModeGate {
    renders: AtomicUsize,
    editing: AtomicBool,
}

impl ModeGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_rendering(&self) -> bool {
        self.renders.load(Ordering::SeqCst) > 0
    }

    pub fn is_editing(&self) -> bool {
        self.editing.load(Ordering::SeqCst)
    }

    /// Number of renders currently holding the gate.
    pub fn active_renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Enter render mode. Fails with [`IsolationViolation::EditInProgress`]
    /// while an edit holds the gate.
    pub fn enter_render(&self) -> Result<RenderModeGuard<'_>, IsolationViolation> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        if self.editing.load(Ordering::SeqCst) {
            self.renders.fetch_sub(1, Ordering::SeqCst);
            return Err(IsolationViolation::EditInProgress);
        }
        Ok(RenderModeGuard { gate: self })
    }

    /// Enter edit mode on a shared gate. The guard owns a handle to the gate
    /// so it can live alongside a mutable borrow of the pattern.
    pub fn enter_edit(self: &Arc<Self>) -> Result<EditModeGuard, IsolationViolation> {
        if self
            .editing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(IsolationViolation::EditInProgress);
        }
        if self.renders.load(Ordering::SeqCst) > 0 {
            self.editing.store(false, Ordering::SeqCst);
            return Err(IsolationViolation::RenderInProgress);
        }
        Ok(EditModeGuard {
            gate: Arc::clone(self),
        })
    }
}

/// Held for the duration of a render; leaving scope exits render mode on
/// every path, including early returns and unwinding.
#[derive(Debug)]
#[must_use = "render mode ends as soon as the guard is dropped"]
pub struct RenderModeGuard<'a> {
    gate: &'a ModeGate,
}

impl Drop for RenderModeGuard<'_> {
    fn drop(&mut self) {
        self.gate.renders.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
#[must_use = "edit mode ends as soon as the guard is dropped"]
pub struct EditModeGuard {
    gate: Arc<ModeGate>,
}

impl EditModeGuard {
    pub fn gate(&self) -> &ModeGate {
        &self.gate
    }
}

impl Drop for EditModeGuard {
    fn drop(&mut self) {
        self.gate.editing.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_overlap() {
        let gate = ModeGate::new();
        let a = gate.enter_render().unwrap();
        let b = gate.enter_render().unwrap();
        assert_eq!(gate.active_renders(), 2);
        drop(a);
        assert!(gate.is_rendering());
        drop(b);
        assert!(!gate.is_rendering());
    }

    #[test]
    fn test_edit_rejected_during_render() {
        let gate = ModeGate::new();
        let render = gate.enter_render().unwrap();
        assert_eq!(
            gate.enter_edit().unwrap_err(),
            IsolationViolation::RenderInProgress
        );
        assert!(!gate.is_editing());
        drop(render);
        assert!(gate.enter_edit().is_ok());
    }

    #[test]
    fn test_render_rejected_during_edit() {
        let gate = ModeGate::new();
        let edit = gate.enter_edit().unwrap();
        assert_eq!(
            gate.enter_render().unwrap_err(),
            IsolationViolation::EditInProgress
        );
        assert_eq!(
            gate.enter_edit().unwrap_err(),
            IsolationViolation::EditInProgress
        );
        drop(edit);
        assert!(gate.enter_render().is_ok());
        assert_eq!(gate.active_renders(), 0);
    }

    #[test]
    fn test_render_guard_released_on_panic() {
        let gate = ModeGate::new();
        let shared = Arc::clone(&gate);
        let result = std::thread::spawn(move || {
            let _guard = shared.enter_render().unwrap();
            panic!("render failed");
        })
        .join();
        assert!(result.is_err());
        assert!(!gate.is_rendering());
    }
}
