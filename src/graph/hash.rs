//! Structural hashing of render graphs.
//!
//! Two graphs hash equal when their reachable structure is equal: node
//! kinds, payloads and child order. Node ids, unreachable nodes and the
//! order in which nodes were created play no part, so a graph rebuilt from
//! scratch for every entity still shares one material.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use super::graph::{NodeId, RenderGraph};
use super::node::Node;
use super::value::Value;

/// Hash of a graph with no root.
const EMPTY_GRAPH: u64 = 0x5354_5241_5441_0000;
/// Hash contributed by a variable reached again while hashing its own definition.
const RECURSIVE_VARIABLE: u64 = 0x5354_5241_5441_0001;
/// Hash contributed by a dangling node id.
const MISSING_NODE: u64 = 0x5354_5241_5441_0002;

struct StructuralHasher<'a> {
    graph: &'a RenderGraph,
    memo: FxHashMap<NodeId, u64>,
    open_variables: Vec<&'a str>,
}

impl<'a> StructuralHasher<'a> {
    fn node(&mut self, id: NodeId) -> u64 {
        if let Some(&hash) = self.memo.get(&id) {
            return hash;
        }
        let graph = self.graph;
        let Some(node) = graph.node(id) else {
            return MISSING_NODE;
        };

        let mut state = Xxh3::new();
        state.update(&[node.kind_tag()]);
        match node {
            Node::Value(value) => write_value(&mut state, value),
            Node::Attribute(attribute) => attribute.hash(&mut state),
            Node::Texture { texture, uv } => {
                texture.hash(&mut state);
                state.update(&[u8::from(uv.is_some())]);
                if let Some(uv) = uv {
                    self.child(&mut state, *uv);
                }
            }
            Node::Arithmetic { op, lhs, rhs } => {
                op.hash(&mut state);
                self.child(&mut state, *lhs);
                self.child(&mut state, *rhs);
            }
            Node::Unary { op, input } => {
                op.hash(&mut state);
                self.child(&mut state, *input);
            }
            Node::Conditional {
                op,
                lhs,
                rhs,
                if_true,
                if_false,
            } => {
                op.hash(&mut state);
                for child in [lhs, rhs, if_true, if_false] {
                    self.child(&mut state, *child);
                }
            }
            Node::ComponentSelect { input, components } => {
                state.update(&[components.len() as u8]);
                state.update(components);
                self.child(&mut state, *input);
            }
            Node::Combine { inputs } => {
                state.update(&(inputs.len() as u32).to_le_bytes());
                for input in inputs {
                    self.child(&mut state, *input);
                }
            }
            Node::Blur {
                texture,
                direction,
                weights,
            } => {
                texture.hash(&mut state);
                write_f32(&mut state, direction.x);
                write_f32(&mut state, direction.y);
                state.update(&(weights.len() as u32).to_le_bytes());
                for weight in weights {
                    write_f32(&mut state, *weight);
                }
            }
            Node::Composite { op, base, overlay } => {
                op.hash(&mut state);
                self.child(&mut state, *base);
                self.child(&mut state, *overlay);
            }
            Node::SkyBox { texture } => texture.hash(&mut state),
            Node::Variable(name) => {
                state.update(name.as_bytes());
                state.update(&[0xff]);
                if self.open_variables.contains(&name.as_str()) {
                    state.update(&RECURSIVE_VARIABLE.to_le_bytes());
                } else if let Some(definition) = graph.variable_definition(name) {
                    self.open_variables.push(name);
                    self.child(&mut state, definition);
                    self.open_variables.pop();
                } else {
                    state.update(&MISSING_NODE.to_le_bytes());
                }
            }
            Node::Render {
                colour,
                normal,
                position,
            } => {
                state.update(&[u8::from(normal.is_some()), u8::from(position.is_some())]);
                self.child(&mut state, *colour);
                for output in normal.iter().chain(position.iter()) {
                    self.child(&mut state, *output);
                }
            }
            Node::PostProcessing { colour } => self.child(&mut state, *colour),
        }

        let hash = state.digest();
        // Hashes inside an open variable depend on which variables are open
        if self.open_variables.is_empty() {
            self.memo.insert(id, hash);
        }
        hash
    }

    fn child(&mut self, state: &mut Xxh3, id: NodeId) {
        let hash = self.node(id);
        state.update(&hash.to_le_bytes());
    }
}

fn write_f32(state: &mut Xxh3, x: f32) {
    // -0.0 and 0.0 describe the same constant
    let x = if x == 0.0 { 0.0 } else { x };
    state.update(&x.to_bits().to_le_bytes());
}

fn write_value(state: &mut Xxh3, value: &Value) {
    let width = value.value_type().width();
    state.update(&[width as u8]);
    for c in &value.components()[..width] {
        write_f32(state, *c);
    }
}

impl RenderGraph {
    /// Hash of the structure reachable from the root.
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        let Some(root) = self.render_node() else {
            return EMPTY_GRAPH;
        };
        StructuralHasher {
            graph: self,
            memo: FxHashMap::default(),
            open_variables: Vec::new(),
        }
        .node(root)
    }

    /// Structural hash of the sub-expression at `id`.
    #[must_use]
    pub fn node_hash(&self, id: NodeId) -> u64 {
        StructuralHasher {
            graph: self,
            memo: FxHashMap::default(),
            open_variables: Vec::new(),
        }
        .node(id)
    }

    /// Whether two graphs are structurally identical.
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.structural_hash() == other.structural_hash()
    }
}

impl Hash for RenderGraph {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}
