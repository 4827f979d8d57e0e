//! Target handles: the seam between the interpreter and whatever renders.
//!
//! The interpreter never draws. It pushes [`TargetUpdate`]s into handles
//! registered per element id; a renderer implements [`TargetHandle`] and
//! does whatever "animate x to 120 over 0.3s" means for its output.

use std::sync::{Arc, Mutex};

use hashbrown::HashMap;

use crate::resolve::ResolvedKeyframe;
use crate::schema::{EasingDef, ResolvedSpring, ResolvedState};

/// One animation command addressed to a single target.
#[derive(Clone, Debug, PartialEq)]
pub enum TargetUpdate {
    /// Timed tween toward `to`. `from` of `None` means "from wherever the
    /// target currently is".
    Tween {
        from: Option<ResolvedState>,
        to: ResolvedState,
        duration_s: f64,
        easing: Option<EasingDef>,
    },
    /// Physics-driven move toward `to`.
    Spring {
        from: Option<ResolvedState>,
        to: ResolvedState,
        spring: ResolvedSpring,
    },
    /// Multi-stop run; frames are sorted by time fraction.
    Keyframes {
        frames: Vec<ResolvedKeyframe>,
        duration_s: f64,
        easing: Option<EasingDef>,
    },
    /// Immediate snap with no interpolation.
    Set(ResolvedState),
}

/// Renderer-side endpoint for one element.
pub trait TargetHandle: Send {
    /// Begin an animation at virtual time `at_s`.
    fn start(&mut self, at_s: f64, update: TargetUpdate);

    /// Snap to a state at virtual time `at_s` (used by stop/reset).
    fn set(&mut self, at_s: f64, state: &ResolvedState) {
        self.start(at_s, TargetUpdate::Set(state.clone()));
    }
}

/// Element id to handle map. Registration is explicit; the interpreter
/// skips (and reports) targets with no registered handle.
#[derive(Default)]
pub struct HandleRegistry {
    handles: HashMap<String, Box<dyn TargetHandle>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, handle: Box<dyn TargetHandle>) {
        self.handles.insert(id.into(), handle);
    }

    pub fn unregister(&mut self, id: &str) -> Option<Box<dyn TargetHandle>> {
        self.handles.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handles.contains_key(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Box<dyn TargetHandle>> {
        self.handles.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Registered ids in sorted order (stable traversal for reset paths).
    pub fn sorted_ids(&self) -> Vec<&String> {
        let mut ids: Vec<&String> = self.handles.keys().collect();
        ids.sort();
        ids
    }
}

/// One call observed by a [`RecordingHandle`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub target: String,
    pub at_s: f64,
    pub update: TargetUpdate,
}

/// Shared log of recorded calls, cloneable across handles.
pub type RecordingLog = Arc<Mutex<Vec<RecordedCall>>>;

/// Handle that appends every call to a shared log. Used by tests and by
/// dry-run tooling that wants a trace instead of a render.
pub struct RecordingHandle {
    target: String,
    log: RecordingLog,
}

impl RecordingHandle {
    pub fn new(target: impl Into<String>, log: RecordingLog) -> Self {
        Self {
            target: target.into(),
            log,
        }
    }
}

impl TargetHandle for RecordingHandle {
    fn start(&mut self, at_s: f64, update: TargetUpdate) {
        self.log.lock().expect("recording log poisoned").push(RecordedCall {
            target: self.target.clone(),
            at_s,
            update,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_registers_and_sorts() {
        let log: RecordingLog = RecordingLog::default();
        let mut registry = HandleRegistry::new();
        registry.register("b", Box::new(RecordingHandle::new("b", log.clone())));
        registry.register("a", Box::new(RecordingHandle::new("a", log.clone())));
        assert!(registry.contains("a"));
        assert!(!registry.contains("c"));
        assert_eq!(registry.sorted_ids(), vec!["a", "b"]);
    }

    #[test]
    fn default_set_routes_through_start() {
        let log: RecordingLog = RecordingLog::default();
        let mut handle = RecordingHandle::new("card", log.clone());
        let state = ResolvedState::default();
        handle.set(1.5, &state);
        let calls = log.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].at_s, 1.5);
        assert!(matches!(calls[0].update, TargetUpdate::Set(_)));
    }
}
