use rustc_hash::FxHashMap;

use super::clip::Animation;

/// Handle to a state registered with an
/// [`AnimationController`](super::AnimationController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Transition {
    pub target: StateId,
    pub duration: f32,
}

/// One animation playing on one layer, plus the edges leaving it.
#[derive(Debug, Clone)]
pub struct AnimationState {
    animation: Animation,
    layer: usize,
    /// Target animation name -> edge.
    transitions: FxHashMap<String, Transition>,
    next: Option<Transition>,
}

impl AnimationState {
    #[must_use]
    pub fn new(animation: Animation, layer: usize) -> Self {
        Self {
            animation,
            layer,
            transitions: FxHashMap::default(),
            next: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.animation.name()
    }

    #[inline]
    #[must_use]
    pub fn layer(&self) -> usize {
        self.layer
    }

    #[inline]
    #[must_use]
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    #[inline]
    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    /// Declares an edge to the state playing `name`, blended over
    /// `duration` seconds.
    pub fn add_transition(&mut self, name: impl Into<String>, target: StateId, duration: f32) {
        self.transitions.insert(
            name.into(),
            Transition {
                target,
                duration: duration.max(0.0),
            },
        );
    }

    #[must_use]
    pub fn has_transition(&self, name: &str) -> bool {
        self.transitions.contains_key(name)
    }

    /// Requests a transition to the state playing `name`.
    ///
    /// Returns `false` and leaves [`next_state`](Self::next_state) untouched
    /// when no such edge exists.
    pub fn transition(&mut self, name: &str) -> bool {
        match self.transitions.get(name) {
            Some(edge) => {
                self.next = Some(*edge);
                true
            }
            None => false,
        }
    }

    /// State being blended towards, if a transition is in progress.
    #[inline]
    #[must_use]
    pub fn next_state(&self) -> Option<StateId> {
        self.next.map(|edge| edge.target)
    }

    pub(crate) fn pending(&self) -> Option<Transition> {
        self.next
    }

    /// Restarts the animation when the state becomes active.
    pub fn enter(&mut self) {
        self.animation.reset();
    }

    /// Drops the pending transition when the state stops being current.
    pub fn exit(&mut self) {
        self.next = None;
    }
}
