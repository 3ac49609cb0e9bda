//! Render graph arena.
//!
//! A [`RenderGraph`] owns its nodes in a slot map and addresses them by
//! [`NodeId`]. Nodes reference each other only through ids, so the graph can
//! be walked, hashed and compared without pointer identity.

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use super::node::{ArithmeticOp, Attribute, CompareOp, CompositeOp, Node, UnaryOp};
use super::value::{Value, ValueType};
use crate::errors::{Result, StrataError};
use crate::resources::TextureId;

new_key_type! {
    /// Handle to a node inside one [`RenderGraph`].
    pub struct NodeId;
    /// Handle to a [`RenderGraph`] owned by a pipeline.
    pub struct GraphId;
}

/// A DAG describing how an entity's outputs are computed.
#[derive(Debug, Clone, Default)]
pub struct RenderGraph {
    nodes: SlotMap<NodeId, Node>,
    root: Option<NodeId>,
    variables: FxHashMap<String, NodeId>,
}

impl RenderGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a node to the arena.
    pub fn create(&mut self, node: Node) -> NodeId {
        self.nodes.insert(node)
    }

    /// Adds `node` and makes it the graph's root, replacing any previous root.
    ///
    /// The previous root stays in the arena but is no longer reachable.
    pub fn set_render_node(&mut self, node: Node) -> NodeId {
        let id = self.create(node);
        self.root = Some(id);
        id
    }

    /// Root of the graph, if one has been set.
    #[inline]
    #[must_use]
    pub fn render_node(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_or_err(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(StrataError::UnknownNode)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- Shorthands -----------------------------------------------------------

    pub fn value(&mut self, value: impl Into<Value>) -> NodeId {
        self.create(Node::Value(value.into()))
    }

    pub fn attribute(&mut self, attribute: Attribute) -> NodeId {
        self.create(Node::Attribute(attribute))
    }

    /// Samples `texture` at the screen position.
    pub fn texture(&mut self, texture: TextureId) -> NodeId {
        self.create(Node::Texture { texture, uv: None })
    }

    pub fn texture_at(&mut self, texture: TextureId, uv: NodeId) -> NodeId {
        self.create(Node::Texture {
            texture,
            uv: Some(uv),
        })
    }

    pub fn arithmetic(&mut self, op: ArithmeticOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.create(Node::Arithmetic { op, lhs, rhs })
    }

    pub fn add(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.arithmetic(ArithmeticOp::Add, lhs, rhs)
    }

    pub fn subtract(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.arithmetic(ArithmeticOp::Subtract, lhs, rhs)
    }

    pub fn multiply(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.arithmetic(ArithmeticOp::Multiply, lhs, rhs)
    }

    pub fn divide(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.arithmetic(ArithmeticOp::Divide, lhs, rhs)
    }

    pub fn unary(&mut self, op: UnaryOp, input: NodeId) -> NodeId {
        self.create(Node::Unary { op, input })
    }

    pub fn conditional(
        &mut self,
        op: CompareOp,
        lhs: NodeId,
        rhs: NodeId,
        if_true: NodeId,
        if_false: NodeId,
    ) -> NodeId {
        self.create(Node::Conditional {
            op,
            lhs,
            rhs,
            if_true,
            if_false,
        })
    }

    pub fn select(&mut self, input: NodeId, components: &[u8]) -> NodeId {
        self.create(Node::ComponentSelect {
            input,
            components: SmallVec::from_slice(components),
        })
    }

    pub fn combine(&mut self, inputs: &[NodeId]) -> NodeId {
        self.create(Node::Combine {
            inputs: SmallVec::from_slice(inputs),
        })
    }

    pub fn blur(&mut self, texture: TextureId, direction: Vec2, weights: &[f32]) -> NodeId {
        self.create(Node::Blur {
            texture,
            direction,
            weights: SmallVec::from_slice(weights),
        })
    }

    pub fn composite(&mut self, op: CompositeOp, base: NodeId, overlay: NodeId) -> NodeId {
        self.create(Node::Composite { op, base, overlay })
    }

    pub fn sky_box(&mut self, texture: TextureId) -> NodeId {
        self.create(Node::SkyBox { texture })
    }

    /// Sets a [`Node::Render`] root with only a colour output.
    pub fn render(&mut self, colour: NodeId) -> NodeId {
        self.set_render_node(Node::Render {
            colour,
            normal: None,
            position: None,
        })
    }

    /// Sets a [`Node::PostProcessing`] root.
    pub fn post_processing(&mut self, colour: NodeId) -> NodeId {
        self.set_render_node(Node::PostProcessing { colour })
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Registers `name` as an alias for the expression at `definition` and
    /// returns a reference node to it.
    ///
    /// A variable is available to both the vertex and fragment stages but is
    /// only emitted when something reachable from the root references it.
    pub fn create_variable(&mut self, name: impl Into<String>, definition: NodeId) -> NodeId {
        let name = name.into();
        self.variables.insert(name.clone(), definition);
        self.create(Node::Variable(name))
    }

    /// Creates another reference node to an existing variable.
    pub fn variable(&mut self, name: &str) -> Result<NodeId> {
        if !self.variables.contains_key(name) {
            return Err(StrataError::UnknownVariable(name.to_string()));
        }
        Ok(self.create(Node::Variable(name.to_string())))
    }

    /// Definition node of `name`.
    #[must_use]
    pub fn variable_definition(&self, name: &str) -> Option<NodeId> {
        self.variables.get(name).copied()
    }

    /// Names of variables reachable from the root, sorted.
    #[must_use]
    pub fn referenced_variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.visit(|_, node| {
            if let Node::Variable(name) = node {
                names.push(name.as_str());
            }
        });
        names.sort_unstable();
        names.dedup();
        names
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Post-order walk over every node reachable from the root, each node
    /// once. Variable references are followed into their definitions, which
    /// are visited before the reference.
    pub fn visit<'a>(&'a self, mut f: impl FnMut(NodeId, &'a Node)) {
        let Some(root) = self.root else {
            return;
        };
        let mut visited = FxHashSet::default();
        // (node, children pushed)
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if expanded {
                f(id, node);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            let mut inputs = node.children();
            if let Node::Variable(name) = node {
                inputs.extend(self.variables.get(name).copied());
            }
            for child in inputs.into_iter().rev() {
                if !visited.contains(&child) {
                    stack.push((child, false));
                }
            }
        }
    }

    /// Every texture sampled by nodes reachable from the root, sorted.
    #[must_use]
    pub fn textures(&self) -> Vec<TextureId> {
        let mut textures = Vec::new();
        self.visit(|_, node| textures.extend(node.texture()));
        textures.sort_unstable();
        textures.dedup();
        textures
    }

    /// Whether any reachable node blends with what is already in the target.
    #[must_use]
    pub fn has_transparency(&self) -> bool {
        let mut transparent = false;
        self.visit(|_, node| {
            transparent |= matches!(
                node,
                Node::Composite {
                    op: CompositeOp::AlphaOver,
                    ..
                }
            );
        });
        transparent
    }

    // ========================================================================
    // Type inference
    // ========================================================================

    /// Output type of the expression rooted at `id`.
    pub fn value_type(&self, id: NodeId) -> Result<ValueType> {
        self.value_type_guarded(id, &mut Vec::new())
    }

    fn value_type_guarded(&self, id: NodeId, variables: &mut Vec<String>) -> Result<ValueType> {
        let node = self.node_or_err(id)?;
        Ok(match node {
            Node::Value(value) => value.value_type(),
            Node::Attribute(Attribute::Uv | Attribute::ScreenUv) => ValueType::Vec2,
            Node::Attribute(Attribute::Position | Attribute::Normal) => ValueType::Vec3,
            Node::Texture { uv, .. } => {
                if let Some(uv) = uv {
                    let ty = self.value_type_guarded(*uv, variables)?;
                    if ty != ValueType::Vec2 {
                        return Err(StrataError::TypeMismatch(format!(
                            "texture coordinates must be Vec2, got {ty:?}"
                        )));
                    }
                }
                ValueType::Vec4
            }
            Node::Arithmetic { op, lhs, rhs } => {
                let a = self.value_type_guarded(*lhs, variables)?;
                let b = self.value_type_guarded(*rhs, variables)?;
                if *op == ArithmeticOp::Dot {
                    if a != b {
                        return Err(StrataError::TypeMismatch(format!(
                            "dot product of {a:?} and {b:?}"
                        )));
                    }
                    ValueType::Float
                } else {
                    a.broadcast(b)?
                }
            }
            Node::Unary { input, .. } => self.value_type_guarded(*input, variables)?,
            Node::Conditional {
                lhs,
                rhs,
                if_true,
                if_false,
                ..
            } => {
                for operand in [lhs, rhs] {
                    let ty = self.value_type_guarded(*operand, variables)?;
                    if ty != ValueType::Float {
                        return Err(StrataError::TypeMismatch(format!(
                            "conditional operands must be Float, got {ty:?}"
                        )));
                    }
                }
                let a = self.value_type_guarded(*if_true, variables)?;
                let b = self.value_type_guarded(*if_false, variables)?;
                a.broadcast(b)?
            }
            Node::ComponentSelect { input, components } => {
                let width = self.value_type_guarded(*input, variables)?.width();
                if let Some(&bad) = components.iter().find(|&&c| usize::from(c) >= width) {
                    return Err(StrataError::TypeMismatch(format!(
                        "component {bad} selected from a {width}-wide value"
                    )));
                }
                ValueType::from_width(components.len()).ok_or_else(|| {
                    StrataError::TypeMismatch(format!("cannot select {} components", components.len()))
                })?
            }
            Node::Combine { inputs } => {
                let mut width = 0;
                for input in inputs {
                    width += self.value_type_guarded(*input, variables)?.width();
                }
                ValueType::from_width(width).ok_or_else(|| {
                    StrataError::TypeMismatch(format!("combined width {width} exceeds 4"))
                })?
            }
            Node::Blur { .. } | Node::SkyBox { .. } => ValueType::Vec4,
            Node::Composite { op, base, overlay } => {
                let a = self.value_type_guarded(*base, variables)?;
                let b = self.value_type_guarded(*overlay, variables)?;
                if *op == CompositeOp::AlphaOver && b != ValueType::Vec4 {
                    return Err(StrataError::TypeMismatch(
                        "alpha-over requires a Vec4 overlay".to_string(),
                    ));
                }
                a.broadcast(b)?
            }
            Node::Variable(name) => {
                if variables.iter().any(|v| v == name) {
                    return Err(StrataError::TypeMismatch(format!(
                        "variable '{name}' is defined in terms of itself"
                    )));
                }
                let definition = self
                    .variable_definition(name)
                    .ok_or_else(|| StrataError::UnknownVariable(name.clone()))?;
                variables.push(name.clone());
                let ty = self.value_type_guarded(definition, variables);
                variables.pop();
                ty?
            }
            Node::Render {
                colour,
                normal,
                position,
            } => {
                for output in normal.iter().chain(position.iter()) {
                    self.value_type_guarded(*output, variables)?;
                }
                self.value_type_guarded(*colour, variables)?
            }
            Node::PostProcessing { colour } => self.value_type_guarded(*colour, variables)?,
        })
    }

    /// Type-checks everything reachable from the root.
    pub fn validate(&self) -> Result<ValueType> {
        let root = self
            .root
            .ok_or_else(|| StrataError::precondition("render graph has no root node"))?;
        self.value_type(root)
    }
}
