//! Shared pipeline dirty flag.
//!
//! Each [`RenderPipeline`](crate::pipeline::RenderPipeline) owns one flag and
//! hands clones to every scene it creates. Scene mutations raise the flag;
//! the pipeline lowers it after rebuilding its command queue.

use std::cell::Cell;
use std::rc::Rc;

/// How much of the pipeline must be regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DirtyLevel {
    #[default]
    Clean,
    /// Entity or light data changed: re-linearise the command queue.
    Rebuild,
    /// Pass topology changed (e.g. a shadow caster appeared): expand passes again.
    Build,
}

/// Cheaply cloneable handle to a pipeline's dirty state.
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag(Rc<Cell<DirtyLevel>>);

impl DirtyFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag to at least `level`.
    pub fn mark(&self, level: DirtyLevel) {
        if level > self.0.get() {
            self.0.set(level);
        }
    }

    #[inline]
    #[must_use]
    pub fn level(&self) -> DirtyLevel {
        self.0.get()
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.0.get() != DirtyLevel::Clean
    }

    pub fn clear(&self) {
        self.0.set(DirtyLevel::Clean);
    }
}
