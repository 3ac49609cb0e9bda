//! Synthesized Render Target Pool
//!
//! Pass expansion allocates shadow maps, occlusion inputs and post-processing
//! stages on every [`build`](super::RenderPipeline::build). Targets handed out
//! by one build are returned to the pool when the next build starts and are
//! reused for compatible requests, so rebuilding an unchanged topology
//! allocates nothing.
//!
//! ```text
//! build N:    acquire() ──► active ─┐
//! build N+1:  reset() ◄─────────────┘ ──► free ──► acquire() (reuse)
//! ```
//!
//! Reuse follows allocation order: the k-th request for a key in one build
//! receives the target the k-th request for that key received in the
//! previous build. Hybrid targets are keyed by the pair they combine and
//! therefore stay stable along with their inputs.

use rustc_hash::FxHashMap;

use crate::errors::Result;
use crate::resources::{RenderTargetId, RenderTargetManager};

/// What a pooled target was created as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// Window sized, colour and depth.
    Window,
    Sized { width: u32, height: u32 },
    Hybrid { colour: RenderTargetId, depth: RenderTargetId },
}

#[derive(Debug, Default)]
pub struct TargetPool {
    /// Targets handed out since the last reset, in allocation order.
    active: Vec<(TargetKey, RenderTargetId)>,
    /// Reusable targets; each bucket is popped from the back.
    free: FxHashMap<TargetKey, Vec<RenderTargetId>>,
}

impl TargetPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a target for `key`, reusing a free one when possible.
    pub fn acquire(&mut self, manager: &mut dyn RenderTargetManager, key: TargetKey) -> Result<RenderTargetId> {
        let reused = self.free.get_mut(&key).and_then(Vec::pop);
        let target = match reused {
            Some(target) => target,
            None => match key {
                TargetKey::Window => manager.create(),
                TargetKey::Sized { width, height } => manager.create_sized(width, height),
                TargetKey::Hybrid { colour, depth } => manager.create_hybrid(colour, depth)?,
            },
        };
        self.active.push((key, target));
        Ok(target)
    }

    /// Returns every active target to the free lists.
    pub fn reset(&mut self) {
        // Reversed so that popping yields the previous allocation order
        for (key, target) in self.active.drain(..).rev() {
            self.free.entry(key).or_default().push(target);
        }
    }

    /// Number of targets handed out since the last reset.
    #[inline]
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Total number of targets the pool owns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len() + self.free.values().map(Vec::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessRenderTargetManager;

    #[test]
    fn reset_recycles_in_allocation_order() {
        let mut manager = HeadlessRenderTargetManager::new(4, 4);
        let mut pool = TargetPool::new();

        let a = pool.acquire(&mut manager, TargetKey::Window).unwrap();
        let b = pool.acquire(&mut manager, TargetKey::Window).unwrap();
        let shadow = pool.acquire(&mut manager, TargetKey::Sized { width: 8, height: 8 }).unwrap();
        pool.reset();

        assert_eq!(pool.acquire(&mut manager, TargetKey::Window).unwrap(), a);
        assert_eq!(pool.acquire(&mut manager, TargetKey::Window).unwrap(), b);
        assert_eq!(
            pool.acquire(&mut manager, TargetKey::Sized { width: 8, height: 8 }).unwrap(),
            shadow
        );
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn incompatible_requests_allocate() {
        let mut manager = HeadlessRenderTargetManager::new(4, 4);
        let mut pool = TargetPool::new();
        pool.acquire(&mut manager, TargetKey::Sized { width: 8, height: 8 }).unwrap();
        pool.reset();

        pool.acquire(&mut manager, TargetKey::Sized { width: 16, height: 16 }).unwrap();
        assert_eq!(manager.len(), 2);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.active_len(), 1);
    }

    #[test]
    fn hybrids_are_reused_for_the_same_pair() {
        let mut manager = HeadlessRenderTargetManager::new(4, 4);
        let mut pool = TargetPool::new();
        let colour = pool.acquire(&mut manager, TargetKey::Window).unwrap();
        let depth = pool.acquire(&mut manager, TargetKey::Window).unwrap();
        let hybrid = pool.acquire(&mut manager, TargetKey::Hybrid { colour, depth }).unwrap();
        pool.reset();

        let colour = pool.acquire(&mut manager, TargetKey::Window).unwrap();
        let depth = pool.acquire(&mut manager, TargetKey::Window).unwrap();
        assert_eq!(pool.acquire(&mut manager, TargetKey::Hybrid { colour, depth }).unwrap(), hybrid);
        assert_eq!(manager.len(), 3);
    }
}
