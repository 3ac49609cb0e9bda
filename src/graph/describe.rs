//! Human-readable rendering of a graph as nested expressions.

use std::fmt::Write;

use super::graph::{NodeId, RenderGraph};
use super::node::{ArithmeticOp, Attribute, CompositeOp, Node, UnaryOp};
use super::value::Value;

impl RenderGraph {
    /// Formats the graph reachable from the root, one expression per output.
    ///
    /// ```text
    /// render(colour: mul(texture(#3), vec4(1, 1, 1, 1)))
    /// ```
    #[must_use]
    pub fn describe(&self) -> String {
        let Some(root) = self.render_node() else {
            return "<empty>".to_string();
        };
        let mut out = String::new();
        self.write_node(&mut out, root);
        let variables = self.referenced_variables();
        if !variables.is_empty() {
            out.push_str("\nwhere");
            for name in variables {
                let _ = write!(out, "\n  {name} = ");
                match self.variable_definition(name) {
                    Some(definition) => self.write_node(&mut out, definition),
                    None => out.push('?'),
                }
            }
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        let Some(node) = self.node(id) else {
            out.push('?');
            return;
        };
        match node {
            Node::Value(value) => write_value(out, value),
            Node::Attribute(attribute) => out.push_str(match attribute {
                Attribute::Uv => "uv",
                Attribute::ScreenUv => "screen_uv",
                Attribute::Position => "position",
                Attribute::Normal => "normal",
            }),
            Node::Texture { texture, uv } => {
                let _ = write!(out, "texture(#{}", texture.0);
                if let Some(uv) = uv {
                    out.push_str(", ");
                    self.write_node(out, *uv);
                }
                out.push(')');
            }
            Node::Arithmetic { op, lhs, rhs } => {
                self.write_call(out, arithmetic_name(*op), &[*lhs, *rhs]);
            }
            Node::Unary { op, input } => self.write_call(out, unary_name(*op), &[*input]),
            Node::Conditional {
                op,
                lhs,
                rhs,
                if_true,
                if_false,
            } => {
                let _ = write!(out, "if({op:?}, ");
                self.write_list(out, &[*lhs, *rhs, *if_true, *if_false]);
                out.push(')');
            }
            Node::ComponentSelect { input, components } => {
                self.write_node(out, *input);
                out.push('.');
                for &c in components {
                    out.push(['x', 'y', 'z', 'w'].get(usize::from(c)).copied().unwrap_or('?'));
                }
            }
            Node::Combine { inputs } => self.write_call(out, "combine", inputs),
            Node::Blur {
                texture,
                direction,
                weights,
            } => {
                let _ = write!(
                    out,
                    "blur(#{}, [{}, {}], {} taps)",
                    texture.0,
                    direction.x,
                    direction.y,
                    (weights.len() * 2).saturating_sub(1)
                );
            }
            Node::Composite { op, base, overlay } => {
                let name = match op {
                    CompositeOp::Add => "composite_add",
                    CompositeOp::Multiply => "composite_mul",
                    CompositeOp::AlphaOver => "composite_over",
                };
                self.write_call(out, name, &[*base, *overlay]);
            }
            Node::SkyBox { texture } => {
                let _ = write!(out, "sky_box(#{})", texture.0);
            }
            Node::Variable(name) => {
                let _ = write!(out, "${name}");
            }
            Node::Render {
                colour,
                normal,
                position,
            } => {
                out.push_str("render(colour: ");
                self.write_node(out, *colour);
                if let Some(normal) = normal {
                    out.push_str(", normal: ");
                    self.write_node(out, *normal);
                }
                if let Some(position) = position {
                    out.push_str(", position: ");
                    self.write_node(out, *position);
                }
                out.push(')');
            }
            Node::PostProcessing { colour } => self.write_call(out, "post_processing", &[*colour]),
        }
    }

    fn write_call(&self, out: &mut String, name: &str, args: &[NodeId]) {
        out.push_str(name);
        out.push('(');
        self.write_list(out, args);
        out.push(')');
    }

    fn write_list(&self, out: &mut String, args: &[NodeId]) {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_node(out, *arg);
        }
    }
}

fn arithmetic_name(op: ArithmeticOp) -> &'static str {
    match op {
        ArithmeticOp::Add => "add",
        ArithmeticOp::Subtract => "sub",
        ArithmeticOp::Multiply => "mul",
        ArithmeticOp::Divide => "div",
        ArithmeticOp::Min => "min",
        ArithmeticOp::Max => "max",
        ArithmeticOp::Pow => "pow",
        ArithmeticOp::Dot => "dot",
    }
}

fn unary_name(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Negate => "neg",
        UnaryOp::Abs => "abs",
        UnaryOp::Exp => "exp",
        UnaryOp::Sqrt => "sqrt",
        UnaryOp::Saturate => "saturate",
    }
}

fn write_value(out: &mut String, value: &Value) {
    let width = value.value_type().width();
    let components = &value.components()[..width];
    if width == 1 {
        let _ = write!(out, "{}", components[0]);
        return;
    }
    let _ = write!(out, "vec{width}(");
    for (i, c) in components.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{c}");
    }
    out.push(')');
}
