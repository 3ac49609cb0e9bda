//! CPU evaluation of render graphs.
//!
//! The evaluator mirrors what a shader generated from the graph computes for
//! one pixel. It is used by the software renderer in tests and for
//! previewing post-processing chains without a GPU.

use glam::{Vec2, Vec3, Vec4};

use super::graph::{NodeId, RenderGraph};
use super::node::{ArithmeticOp, Attribute, CompositeOp, Node, UnaryOp};
use super::value::Value;
use crate::errors::{Result, StrataError};
use crate::resources::TextureId;

/// Access to texture contents during evaluation.
pub trait TextureSource {
    /// Samples `texture` at normalised coordinates `uv`.
    fn sample(&self, texture: TextureId, uv: Vec2) -> Vec4;

    /// Size of one texel in normalised coordinates.
    fn texel_size(&self, texture: TextureId) -> Vec2;
}

/// Per-pixel inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalContext {
    pub uv: Vec2,
    pub screen_uv: Vec2,
    pub position: Vec3,
    pub normal: Vec3,
}

impl EvalContext {
    /// Context for a full-screen pixel, where mesh and screen coordinates agree.
    #[must_use]
    pub fn screen(uv: Vec2) -> Self {
        Self {
            uv,
            screen_uv: uv,
            ..Self::default()
        }
    }
}

pub struct Evaluator<'a, S: TextureSource + ?Sized> {
    graph: &'a RenderGraph,
    textures: &'a S,
    depth: usize,
}

/// Bounds recursion through variables that reference themselves.
const MAX_DEPTH: usize = 256;

impl<'a, S: TextureSource + ?Sized> Evaluator<'a, S> {
    pub fn new(graph: &'a RenderGraph, textures: &'a S) -> Self {
        Self {
            graph,
            textures,
            depth: 0,
        }
    }

    /// Evaluates the colour output of the root.
    pub fn evaluate_root(&mut self, ctx: &EvalContext) -> Result<Vec4> {
        let root = self
            .graph
            .render_node()
            .ok_or_else(|| StrataError::precondition("render graph has no root node"))?;
        Ok(self.evaluate(root, ctx)?.to_vec4())
    }

    pub fn evaluate(&mut self, id: NodeId, ctx: &EvalContext) -> Result<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(StrataError::precondition(
                "render graph evaluation exceeded the maximum depth",
            ));
        }
        self.depth += 1;
        let value = self.evaluate_node(id, ctx);
        self.depth -= 1;
        value
    }

    fn evaluate_node(&mut self, id: NodeId, ctx: &EvalContext) -> Result<Value> {
        let graph = self.graph;
        Ok(match graph.node_or_err(id)? {
            Node::Value(value) => *value,
            Node::Attribute(attribute) => match attribute {
                Attribute::Uv => ctx.uv.into(),
                Attribute::ScreenUv => ctx.screen_uv.into(),
                Attribute::Position => ctx.position.into(),
                Attribute::Normal => ctx.normal.into(),
            },
            Node::Texture { texture, uv } => {
                let uv = match uv {
                    Some(uv) => match self.evaluate(*uv, ctx)? {
                        Value::Vec2(uv) => uv,
                        other => {
                            return Err(StrataError::TypeMismatch(format!(
                                "texture coordinates must be Vec2, got {:?}",
                                other.value_type()
                            )));
                        }
                    },
                    None => ctx.screen_uv,
                };
                self.textures.sample(*texture, uv).into()
            }
            Node::Arithmetic { op, lhs, rhs } => {
                let a = self.evaluate(*lhs, ctx)?;
                let b = self.evaluate(*rhs, ctx)?;
                arithmetic(*op, &a, &b)?
            }
            Node::Unary { op, input } => {
                let value = self.evaluate(*input, ctx)?;
                match op {
                    UnaryOp::Negate => value.map(|x| -x),
                    UnaryOp::Abs => value.map(f32::abs),
                    UnaryOp::Exp => value.map(f32::exp),
                    UnaryOp::Sqrt => value.map(f32::sqrt),
                    UnaryOp::Saturate => value.map(|x| x.clamp(0.0, 1.0)),
                }
            }
            Node::Conditional {
                op,
                lhs,
                rhs,
                if_true,
                if_false,
            } => {
                let a = self.scalar(*lhs, ctx)?;
                let b = self.scalar(*rhs, ctx)?;
                let branch = if op.test(a, b) { if_true } else { if_false };
                self.evaluate(*branch, ctx)?
            }
            Node::ComponentSelect { input, components } => {
                let value = self.evaluate(*input, ctx)?;
                let width = value.value_type().width();
                let source = value.components();
                let mut out = Vec::with_capacity(components.len());
                for &c in components {
                    let c = usize::from(c);
                    if c >= width {
                        return Err(StrataError::TypeMismatch(format!(
                            "component {c} selected from a {width}-wide value"
                        )));
                    }
                    out.push(source[c]);
                }
                Value::from_components(&out)?
            }
            Node::Combine { inputs } => {
                let mut out = Vec::with_capacity(4);
                for input in inputs {
                    let value = self.evaluate(*input, ctx)?;
                    out.extend_from_slice(&value.components()[..value.value_type().width()]);
                }
                Value::from_components(&out)?
            }
            Node::Blur {
                texture,
                direction,
                weights,
            } => {
                let step = *direction * self.textures.texel_size(*texture);
                let mut sum = Vec4::ZERO;
                let taps = weights.len() as i32;
                for i in (1 - taps)..taps {
                    let weight = weights[i.unsigned_abs() as usize];
                    let uv = ctx.screen_uv + step * i as f32;
                    sum += weight * self.textures.sample(*texture, uv);
                }
                sum.into()
            }
            Node::Composite { op, base, overlay } => {
                let base = self.evaluate(*base, ctx)?;
                let overlay = self.evaluate(*overlay, ctx)?;
                match op {
                    CompositeOp::Add => base.zip_with(&overlay, |a, b| a + b)?,
                    CompositeOp::Multiply => base.zip_with(&overlay, |a, b| a * b)?,
                    CompositeOp::AlphaOver => {
                        let (b, o) = (base.to_vec4(), overlay.to_vec4());
                        let alpha = o.w;
                        let rgb = o.truncate() * alpha + b.truncate() * (1.0 - alpha);
                        rgb.extend(alpha + b.w * (1.0 - alpha)).into()
                    }
                }
            }
            Node::SkyBox { texture } => self.textures.sample(*texture, ctx.uv).into(),
            Node::Variable(name) => {
                let definition = graph
                    .variable_definition(name)
                    .ok_or_else(|| StrataError::UnknownVariable(name.clone()))?;
                self.evaluate(definition, ctx)?
            }
            Node::Render { colour, .. } | Node::PostProcessing { colour } => {
                self.evaluate(*colour, ctx)?
            }
        })
    }

    fn scalar(&mut self, id: NodeId, ctx: &EvalContext) -> Result<f32> {
        let value = self.evaluate(id, ctx)?;
        value.as_float().ok_or_else(|| {
            StrataError::TypeMismatch(format!(
                "conditional operands must be Float, got {:?}",
                value.value_type()
            ))
        })
    }
}

fn arithmetic(op: ArithmeticOp, a: &Value, b: &Value) -> Result<Value> {
    match op {
        ArithmeticOp::Add => a.zip_with(b, |x, y| x + y),
        ArithmeticOp::Subtract => a.zip_with(b, |x, y| x - y),
        ArithmeticOp::Multiply => a.zip_with(b, |x, y| x * y),
        ArithmeticOp::Divide => a.zip_with(b, |x, y| x / y),
        ArithmeticOp::Min => a.zip_with(b, f32::min),
        ArithmeticOp::Max => a.zip_with(b, f32::max),
        ArithmeticOp::Pow => a.zip_with(b, f32::powf),
        ArithmeticOp::Dot => {
            if a.value_type() != b.value_type() {
                return Err(StrataError::TypeMismatch(format!(
                    "dot product of {:?} and {:?}",
                    a.value_type(),
                    b.value_type()
                )));
            }
            let width = a.value_type().width();
            let (x, y) = (a.components(), b.components());
            Ok(Value::Float((0..width).map(|i| x[i] * y[i]).sum()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat(Vec4);

    impl TextureSource for Flat {
        fn sample(&self, _: TextureId, _: Vec2) -> Vec4 {
            self.0
        }

        fn texel_size(&self, _: TextureId) -> Vec2 {
            Vec2::splat(1.0 / 64.0)
        }
    }

    #[test]
    fn blur_of_flat_texture_preserves_colour() {
        let mut graph = RenderGraph::new();
        let blur = graph.blur(TextureId(0), Vec2::X, &[0.5, 0.25]);
        graph.post_processing(blur);

        let source = Flat(Vec4::new(0.2, 0.4, 0.6, 1.0));
        let out = Evaluator::new(&graph, &source)
            .evaluate_root(&EvalContext::screen(Vec2::splat(0.5)))
            .unwrap();
        assert!((out - source.0).abs().max_element() < 1e-6);
    }

    #[test]
    fn conditional_only_evaluates_chosen_branch() {
        let mut graph = RenderGraph::new();
        let one = graph.value(1.0);
        let two = graph.value(2.0);
        let good = graph.value(Vec4::ONE);
        // Selecting component 3 from a scalar fails if evaluated
        let bad = graph.select(one, &[3]);
        let cond = graph.conditional(crate::graph::CompareOp::Less, one, two, good, bad);
        graph.render(cond);

        let out = Evaluator::new(&graph, &Flat(Vec4::ZERO))
            .evaluate_root(&EvalContext::default())
            .unwrap();
        assert_eq!(out, Vec4::ONE);
    }
}
