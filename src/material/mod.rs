//! Material keys and the material cache.
//!
//! A material is whatever a backend compiles from a render graph for one
//! light type and one combination of output flags. Backends keep their
//! compiled programs in a [`MaterialCache`] so that structurally identical
//! graphs share one program.

mod cache;

pub use cache::MaterialCache;

use bitflags::bitflags;

use crate::graph::RenderGraph;
use crate::scene::LightType;

bitflags! {
    /// Outputs and blending state a material is compiled for.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFlags: u32 {
        const RENDER_TO_COLOUR   = 1 << 0;
        const RENDER_TO_NORMAL   = 1 << 1;
        const RENDER_TO_POSITION = 1 << 2;
        const HAS_TRANSPARENCY   = 1 << 3;
    }
}

impl MaterialFlags {
    /// Flags for a pass writing the given outputs.
    #[must_use]
    pub fn for_outputs(colour: bool, normal: bool, position: bool) -> Self {
        let mut flags = Self::empty();
        flags.set(Self::RENDER_TO_COLOUR, colour);
        flags.set(Self::RENDER_TO_NORMAL, normal);
        flags.set(Self::RENDER_TO_POSITION, position);
        flags
    }
}

/// Cache key: graph structure, light type and output flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    pub graph_hash: u64,
    pub light: LightType,
    pub flags: MaterialFlags,
}

impl MaterialKey {
    #[must_use]
    pub fn new(graph: &RenderGraph, light: LightType, flags: MaterialFlags) -> Self {
        Self {
            graph_hash: graph.structural_hash(),
            light,
            flags,
        }
    }
}
