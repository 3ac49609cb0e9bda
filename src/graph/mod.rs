//! Render graphs.
//!
//! A render graph is a small expression DAG owned by one entity (or one
//! synthesized full-screen pass). Its root node decides which outputs the
//! pass writes: [`Node::Render`] for geometry, [`Node::PostProcessing`] for
//! screen-space passes.
//!
//! Graphs are compared structurally: [`RenderGraph::structural_hash`] is the
//! key under which compiled materials are cached.

mod describe;
pub mod eval;
#[allow(clippy::module_inception)]
mod graph;
mod hash;
mod node;
mod value;

pub use eval::{EvalContext, Evaluator, TextureSource};
pub use graph::{GraphId, NodeId, RenderGraph};
pub use node::{ArithmeticOp, Attribute, CompareOp, CompositeOp, Node, UnaryOp};
pub use value::{Value, ValueType};
