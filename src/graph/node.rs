//! Render graph node kinds.
//!
//! Nodes form a closed sum type. Every consumer (type inference, structural
//! hashing, evaluation, printing) matches exhaustively, so adding a kind is a
//! compile error everywhere it needs handling.

use glam::Vec2;
use smallvec::SmallVec;

use super::graph::NodeId;
use super::value::Value;
use crate::resources::TextureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Min,
    Max,
    Pow,
    /// Scalar dot product of two equally sized vectors.
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Abs,
    Exp,
    Sqrt,
    /// Clamp to `0..=1`.
    Saturate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
}

impl CompareOp {
    #[must_use]
    pub fn test(self, lhs: f32, rhs: f32) -> bool {
        match self {
            Self::Less => lhs < rhs,
            Self::LessEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterEqual => lhs >= rhs,
            Self::Equal => lhs == rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeOp {
    /// `base + overlay`
    Add,
    /// `base * overlay`
    Multiply,
    /// Porter-Duff "over" using the overlay's alpha.
    AlphaOver,
}

/// Per-vertex / per-pixel inputs available to every graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Mesh texture coordinates.
    Uv,
    /// Normalised screen coordinates of the pixel being shaded.
    ScreenUv,
    /// World-space position.
    Position,
    /// World-space normal.
    Normal,
}

/// One node of a [`RenderGraph`](super::RenderGraph).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A constant.
    Value(Value),
    Attribute(Attribute),
    /// Samples `texture` at `uv`, or at the screen position when `uv` is `None`.
    Texture {
        texture: TextureId,
        uv: Option<NodeId>,
    },
    Arithmetic {
        op: ArithmeticOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        input: NodeId,
    },
    /// `if lhs <op> rhs { if_true } else { if_false }` on scalar operands.
    Conditional {
        op: CompareOp,
        lhs: NodeId,
        rhs: NodeId,
        if_true: NodeId,
        if_false: NodeId,
    },
    /// Swizzle: component indices `0..4` of `input`.
    ComponentSelect {
        input: NodeId,
        components: SmallVec<[u8; 4]>,
    },
    /// Concatenates the components of its inputs into one vector.
    Combine { inputs: SmallVec<[NodeId; 4]> },
    /// Symmetric weighted taps of `texture` along `direction` (in texels),
    /// centre weight first.
    Blur {
        texture: TextureId,
        direction: Vec2,
        weights: SmallVec<[f32; 8]>,
    },
    Composite {
        op: CompositeOp,
        base: NodeId,
        overlay: NodeId,
    },
    /// Environment cube map sampled along the view direction.
    SkyBox { texture: TextureId },
    /// Reference to a named variable.
    Variable(String),
    /// Root of a geometry pass.
    Render {
        colour: NodeId,
        normal: Option<NodeId>,
        position: Option<NodeId>,
    },
    /// Root of a full-screen post-processing pass.
    PostProcessing { colour: NodeId },
}

impl Node {
    /// Stable discriminant used by structural hashing.
    #[must_use]
    pub const fn kind_tag(&self) -> u8 {
        match self {
            Self::Value(_) => 1,
            Self::Attribute(_) => 2,
            Self::Texture { .. } => 3,
            Self::Arithmetic { .. } => 4,
            Self::Unary { .. } => 5,
            Self::Conditional { .. } => 6,
            Self::ComponentSelect { .. } => 7,
            Self::Combine { .. } => 8,
            Self::Blur { .. } => 9,
            Self::Composite { .. } => 10,
            Self::SkyBox { .. } => 11,
            Self::Variable(_) => 12,
            Self::Render { .. } => 13,
            Self::PostProcessing { .. } => 14,
        }
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Attribute(_) => "attribute",
            Self::Texture { .. } => "texture",
            Self::Arithmetic { .. } => "arithmetic",
            Self::Unary { .. } => "unary",
            Self::Conditional { .. } => "conditional",
            Self::ComponentSelect { .. } => "component_select",
            Self::Combine { .. } => "combine",
            Self::Blur { .. } => "blur",
            Self::Composite { .. } => "composite",
            Self::SkyBox { .. } => "sky_box",
            Self::Variable(_) => "variable",
            Self::Render { .. } => "render",
            Self::PostProcessing { .. } => "post_processing",
        }
    }

    /// Direct inputs in a fixed order. Variable definitions are not included.
    #[must_use]
    pub fn children(&self) -> SmallVec<[NodeId; 5]> {
        let mut out = SmallVec::new();
        match self {
            Self::Value(_)
            | Self::Attribute(_)
            | Self::Blur { .. }
            | Self::SkyBox { .. }
            | Self::Variable(_) => {}
            Self::Texture { uv, .. } => out.extend(*uv),
            Self::Arithmetic { lhs, rhs, .. } => out.extend([*lhs, *rhs]),
            Self::Unary { input, .. } | Self::ComponentSelect { input, .. } => out.push(*input),
            Self::Conditional {
                lhs,
                rhs,
                if_true,
                if_false,
                ..
            } => out.extend([*lhs, *rhs, *if_true, *if_false]),
            Self::Combine { inputs } => out.extend(inputs.iter().copied()),
            Self::Composite { base, overlay, .. } => out.extend([*base, *overlay]),
            Self::Render {
                colour,
                normal,
                position,
            } => {
                out.push(*colour);
                out.extend(*normal);
                out.extend(*position);
            }
            Self::PostProcessing { colour } => out.push(*colour),
        }
        out
    }

    /// Texture referenced directly by this node.
    #[must_use]
    pub fn texture(&self) -> Option<TextureId> {
        match self {
            Self::Texture { texture, .. } | Self::Blur { texture, .. } | Self::SkyBox { texture } => {
                Some(*texture)
            }
            _ => None,
        }
    }

    /// Whether this node can serve as a graph root.
    #[must_use]
    pub const fn is_root_kind(&self) -> bool {
        matches!(self, Self::Render { .. } | Self::PostProcessing { .. })
    }
}
