//! Compiled network graph: the executable form of a genome.
//!
//! [`Network::compile`] expands a sparse edge map into an arena of [`Node`]s
//! addressed by integer id, with adjacency stored as flat index lists.
//! The arena is transient: every compile discards the previous graph and
//! rebuilds from the genome's enabled genes, so mutation operators never
//! have to patch a live graph.
//!
//! Evaluation is a lazy, memoized sweep from the output nodes. Each node
//! fires at most once per prediction: an unfired node sums
//! `weight × upstream output` over its incoming edges, applies its
//! activation and caches the result; a fired node returns its cache. The
//! traversal uses an explicit worklist stack rather than call-stack
//! recursion, so deep evolved topologies cannot overflow the stack.

use std::collections::{BTreeMap, HashMap};

use crate::activation::Activation;
use crate::gene::{Gene, Innovation, NodeId};

/// The role of a node in the compiled graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Receives an external value; never reads upstream. The bias node is an
    /// input permanently pinned to 1.0.
    Input,
    /// Internal node added through edge-split mutation.
    Hidden,
    /// Read out by `predict` in ascending id order.
    Output,
}

/// One evaluation vertex in the compiled arena.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    activation: Activation,
    /// (arena index of source, weight), in ascending gene innovation order.
    incoming: Vec<(usize, f64)>,
    /// (arena index of destination, gene innovation), ascending innovation.
    outgoing: Vec<(usize, Innovation)>,
    fired: bool,
    output: f64,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind, activation: Activation) -> Self {
        Self {
            id,
            kind,
            activation,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            // Inputs are permanently fired; their output is external state.
            fired: matches!(kind, NodeKind::Input),
            output: 0.0,
        }
    }

    /// The node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's role.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The activation applied to this node's input sum.
    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Number of incoming edges.
    #[must_use]
    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }

    /// Number of outgoing edges.
    #[must_use]
    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    /// The cached output value, meaningful once the node has fired.
    #[must_use]
    pub fn output(&self) -> f64 {
        self.output
    }
}

/// An executable graph compiled from a genome's enabled edges.
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    input_size: usize,
    output_size: usize,
}

impl Network {
    /// Compile an edge map into an executable graph.
    ///
    /// Input nodes `0..input_size` and the bias at id `input_size` come
    /// first, then output nodes, so the arena index of every non-hidden node
    /// equals its id. Hidden endpoints of enabled genes are materialized
    /// lazily in ascending innovation order, taking their activation from
    /// `node_activations` (default linear). Disabled genes are skipped
    /// entirely.
    #[must_use]
    pub fn compile(
        input_size: usize,
        output_size: usize,
        edges: &BTreeMap<Innovation, Gene>,
        node_activations: &HashMap<NodeId, Activation>,
    ) -> Self {
        let base = input_size + 1 + output_size;
        let mut network = Self {
            nodes: Vec::with_capacity(base),
            index: HashMap::with_capacity(base),
            input_size,
            output_size,
        };

        let recorded = |id: NodeId| node_activations.get(&id).copied().unwrap_or_default();

        for id in 0..=input_size {
            network.push_node(Node::new(id, NodeKind::Input, recorded(id)));
        }
        // Bias: an input pinned to 1.0, untouched by reset.
        network.nodes[input_size].output = 1.0;
        for slot in 0..output_size {
            let id = input_size + 1 + slot;
            network.push_node(Node::new(id, NodeKind::Output, recorded(id)));
        }

        for gene in edges.values().filter(|g| g.enabled) {
            network.ensure_hidden(gene.output, recorded(gene.output));
            network.ensure_hidden(gene.input, recorded(gene.input));
        }

        for gene in edges.values().filter(|g| g.enabled) {
            let src = network.index[&gene.input];
            let dst = network.index[&gene.output];
            network.nodes[dst].incoming.push((src, gene.weight));
            network.nodes[src].outgoing.push((dst, gene.innovation));
        }

        network
    }

    fn push_node(&mut self, node: Node) {
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
    }

    fn ensure_hidden(&mut self, id: NodeId, activation: Activation) {
        if !self.index.contains_key(&id) {
            self.push_node(Node::new(id, NodeKind::Hidden, activation));
        }
    }

    /// Number of compiled nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The compiled nodes, inputs and bias first, then outputs, then hidden
    /// nodes in materialization order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Arena index of a node id, if compiled.
    #[must_use]
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// The compiled node with the given id, if any.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index(id).map(|idx| &self.nodes[idx])
    }

    /// Whether adding `src -> dst` would close a cycle among the enabled
    /// edges, i.e. whether `src` is already reachable from `dst`.
    ///
    /// A self-loop counts as a cycle. Ids missing from the arena cannot be
    /// judged and return `false`.
    #[must_use]
    pub fn would_create_cycle(&self, src: NodeId, dst: NodeId) -> bool {
        let (Some(src_idx), Some(dst_idx)) = (self.node_index(src), self.node_index(dst)) else {
            return false;
        };
        if src_idx == dst_idx {
            return true;
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut queue = vec![dst_idx];
        visited[dst_idx] = true;
        while let Some(current) = queue.pop() {
            for &(next, _) in &self.nodes[current].outgoing {
                if next == src_idx {
                    return true;
                }
                if !visited[next] {
                    visited[next] = true;
                    queue.push(next);
                }
            }
        }
        false
    }

    /// Clear every non-input node back to unfired with a zero cache.
    ///
    /// Input nodes keep their permanent fired flag and current values, so
    /// the bias stays at 1.0 across predictions.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            if node.kind != NodeKind::Input {
                node.fired = false;
                node.output = 0.0;
            }
        }
    }

    /// Assign an input node's external value.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name an input node; only inputs may have
    /// their output set directly.
    pub fn set_input(&mut self, id: NodeId, value: f64) {
        match self.node_index(id) {
            Some(idx) if self.nodes[idx].kind == NodeKind::Input => {
                self.nodes[idx].output = value;
            }
            _ => panic!("tried to set output for non-input node {id}"),
        }
    }

    /// Evaluate the node with the given id, firing any unfired upstream
    /// nodes first.
    ///
    /// Memoized: a node that already fired this prediction returns its cache
    /// untouched, so each activation runs at most once per call. Assumes a
    /// feed-forward graph.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a compiled node.
    pub fn evaluate(&mut self, id: NodeId) -> f64 {
        let Some(start) = self.node_index(id) else {
            panic!("evaluated uncompiled node {id}");
        };

        let mut stack = vec![start];
        while let Some(&current) = stack.last() {
            if self.nodes[current].fired {
                stack.pop();
                continue;
            }

            let mut ready = true;
            for k in 0..self.nodes[current].incoming.len() {
                let (src, _) = self.nodes[current].incoming[k];
                if !self.nodes[src].fired {
                    ready = false;
                    stack.push(src);
                }
            }
            if ready {
                let sum: f64 = self.nodes[current]
                    .incoming
                    .iter()
                    .map(|&(src, weight)| self.nodes[src].output * weight)
                    .sum();
                let node = &mut self.nodes[current];
                node.output = node.activation.apply(sum);
                node.fired = true;
                stack.pop();
            }
        }

        self.nodes[start].output
    }

    /// Number of input nodes, excluding the bias.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of output nodes.
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.output_size
    }
}
