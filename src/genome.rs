//! Genome: the durable genetic encoding and its mutation operators.
//!
//! A [`Genome`] is a sparse edge map plus an optional per-node activation
//! assignment. Structural mutations grow the edge map against a shared
//! [`InnovationRegistry`]; [`Genome::compile`] then rebuilds the executable
//! [`Network`] from scratch and [`Genome::predict`] evaluates it. The driving
//! application repeats mutate → compile to grow topology, then predicts
//! across a coordinate grid.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::gene::{Gene, Innovation, NodeId};
use crate::innovation::InnovationRegistry;
use crate::network::{Network, NodeKind};

/// Attempts `generate_link` makes before giving up.
///
/// Bounded retry instead of an error: on a densely connected graph a valid
/// candidate pair may not exist, and the operator must degrade to a no-op
/// rather than livelock.
const LINK_ATTEMPTS: usize = 100;

/// Tunable mutation rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Per-edge probability that `mutate_weights` perturbs the weight.
    pub perturb_chance: f64,
    /// Scale applied to the standard-normal weight perturbation.
    pub perturb_magnitude: f64,
    /// Expected number of node reassignments per `mutate_activation` call,
    /// consumed as repeated Bernoulli trials.
    pub activation_mutation_rate: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            perturb_chance: 0.8,
            perturb_magnitude: 0.05,
            activation_mutation_rate: 2.5,
        }
    }
}

/// Error returned by [`Genome::predict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    /// The input vector length does not match the genome's input size. No
    /// node state was touched.
    InvalidInput {
        /// The genome's input size.
        expected: usize,
        /// The supplied vector length.
        got: usize,
    },
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::InvalidInput { expected, got } => {
                write!(f, "input vector has length {got}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for PredictError {}

/// Flat, serializable snapshot of a genome's genetic material.
///
/// Carries exactly the durable state: the full edge map (disabled edges
/// included, all fields), the node-activation map, and the input/output
/// sizes — enough to reconstruct an identical compiled network. The shared
/// [`InnovationRegistry`] is deliberately not part of the snapshot; a
/// reloaded genome resumes minting numbers from the live registry's counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeSnapshot {
    /// Every gene keyed by innovation number.
    pub edges: BTreeMap<Innovation, Gene>,
    /// Recorded per-node activations; absent ids default to linear.
    pub node_activations: HashMap<NodeId, Activation>,
    /// Number of input nodes, excluding the bias.
    pub input_size: usize,
    /// Number of output nodes.
    pub output_size: usize,
}

/// The genetic encoding of one candidate network.
#[derive(Debug, Clone)]
pub struct Genome {
    edges: BTreeMap<Innovation, Gene>,
    node_activations: HashMap<NodeId, Activation>,
    input_size: usize,
    output_size: usize,
    /// Mutation rates; not part of the snapshot.
    pub config: MutationConfig,
    network: Network,
}

impl Genome {
    /// Create a genome with no edges and a compiled base network
    /// (inputs, bias, outputs).
    #[must_use]
    pub fn new(input_size: usize, output_size: usize) -> Self {
        let edges = BTreeMap::new();
        let node_activations = HashMap::new();
        let network = Network::compile(input_size, output_size, &edges, &node_activations);
        Self {
            edges,
            node_activations,
            input_size,
            output_size,
            config: MutationConfig::default(),
            network,
        }
    }

    /// Create a genome with every input — bias included — connected to every
    /// output.
    ///
    /// Edges get standard-normal weights and linear activation; every input
    /// and output slot is assigned linear activation. Innovation numbers are
    /// minted through the registry, so a fresh registry yields the sequence
    /// `0..(input_size + 1) * output_size` and a second genome seeded against
    /// the same registry reuses the same numbers.
    pub fn fully_connected<R: Rng>(
        input_size: usize,
        output_size: usize,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Self {
        let mut genome = Self::new(input_size, output_size);
        for input in 0..=input_size {
            for slot in 0..output_size {
                let output = input_size + 1 + slot;
                let innovation = registry.register(input, output);
                let gene = Gene::with_random_weight(
                    input,
                    output,
                    innovation,
                    Activation::Linear,
                    rng,
                );
                genome.edges.insert(innovation, gene);
            }
        }
        for id in 0..=input_size + output_size {
            genome.node_activations.insert(id, Activation::Linear);
        }
        genome.compile();
        genome
    }

    /// Rebuild the compiled network from the current edge map.
    ///
    /// Idempotent: compiling twice with no intervening mutation produces
    /// structurally identical graphs.
    pub fn compile(&mut self) {
        self.network = Network::compile(
            self.input_size,
            self.output_size,
            &self.edges,
            &self.node_activations,
        );
    }

    /// Evaluate the compiled network over an input vector, returning outputs
    /// in ascending output-node-id order.
    ///
    /// # Errors
    ///
    /// [`PredictError::InvalidInput`] if `state.len() != input_size`; no node
    /// state is mutated in that case.
    pub fn predict(&mut self, state: &[f64]) -> Result<Vec<f64>, PredictError> {
        if state.len() != self.input_size {
            return Err(PredictError::InvalidInput {
                expected: self.input_size,
                got: state.len(),
            });
        }

        self.network.reset();
        for (id, &value) in state.iter().enumerate() {
            self.network.set_input(id, value);
        }

        let mut outputs = Vec::with_capacity(self.output_size);
        for slot in 0..self.output_size {
            outputs.push(self.network.evaluate(self.input_size + 1 + slot));
        }
        Ok(outputs)
    }

    /// Try to add one new random edge to the genome.
    ///
    /// Draws source and destination uniformly from the compiled node set
    /// until it finds a pair where the source is not an output, the
    /// destination is not an input, neither direction exists in the
    /// registry's history, and the edge would not close a cycle. Gives up
    /// silently after 100 failed draws — a normal outcome on dense graphs,
    /// not an error. The successful gene gets a standard-normal weight and a
    /// random activation.
    ///
    /// Returns the new gene's innovation number, or `None` if no edge was
    /// added.
    pub fn generate_link<R: Rng>(
        &mut self,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Option<Innovation> {
        let nodes = self.network.nodes();
        if nodes.is_empty() {
            return None;
        }

        for _ in 0..LINK_ATTEMPTS {
            let src = &nodes[rng.random_range(0..nodes.len())];
            let dst = &nodes[rng.random_range(0..nodes.len())];
            if src.kind() == NodeKind::Output || dst.kind() == NodeKind::Input {
                continue;
            }
            let (input, output) = (src.id(), dst.id());
            if registry.contains(input, output) || registry.contains(output, input) {
                continue;
            }
            if self.network.would_create_cycle(input, output) {
                continue;
            }

            let innovation = registry.register(input, output);
            let gene = Gene::with_random_weight(
                input,
                output,
                innovation,
                Activation::random(rng),
                rng,
            );
            self.edges.insert(innovation, gene);
            return Some(innovation);
        }
        None
    }

    /// Split one random edge with a new hidden node.
    ///
    /// The new node id equals the compiled network size. The split edge `E`
    /// is replaced by `E.input -> new` (weight 1, linear) and
    /// `E.output <- new` (inheriting `E`'s weight and activation), with
    /// innovation numbers resolved through the registry — historical numbers
    /// are reused, genuinely new ones minted. `E` is disabled but kept in the
    /// edge map as history. No-op if the genome has no edges, or if either
    /// replacement edge already structurally exists in this genome.
    ///
    /// Returns the new node's id, or `None` if nothing changed.
    pub fn generate_node<R: Rng>(
        &mut self,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Option<NodeId> {
        if self.edges.is_empty() {
            return None;
        }

        let pick = rng.random_range(0..self.edges.len());
        let (split_innovation, input, output, weight, activation) = {
            let (&innovation, gene) = self.edges.iter().nth(pick)?;
            (innovation, gene.input, gene.output, gene.weight, gene.activation)
        };

        let new_node = self.network.len();
        if self.check_existence(input, new_node) || self.check_existence(new_node, output) {
            return None;
        }

        let first = registry.register(input, new_node);
        let second = registry.register(new_node, output);
        self.edges
            .insert(first, Gene::new(input, new_node, 1.0, first, Activation::Linear));
        self.edges
            .insert(second, Gene::new(new_node, output, weight, second, activation));
        if let Some(split) = self.edges.get_mut(&split_innovation) {
            split.enabled = false;
        }
        Some(new_node)
    }

    /// Perturb edge weights in place.
    ///
    /// Each edge independently has `perturb_chance` probability of receiving
    /// a zero-mean Gaussian nudge scaled by `perturb_magnitude`. Purely
    /// numeric; no structural effect.
    pub fn mutate_weights<R: Rng>(&mut self, rng: &mut R) {
        let chance = self.config.perturb_chance;
        let magnitude = self.config.perturb_magnitude;
        for gene in self.edges.values_mut() {
            if rng.random::<f64>() < chance {
                let delta: f64 = rng.sample(StandardNormal);
                gene.perturb_weight(delta * magnitude);
            }
        }
    }

    /// Reassign random node activations.
    ///
    /// Consumes `activation_mutation_rate` as repeated Bernoulli trials:
    /// each round rolls against `min(remaining, 1)` and subtracts 1 from the
    /// remaining rate; each success records a fresh random activation for one
    /// randomly chosen compiled node. Takes effect at the next compile.
    /// No-op on an empty edge map.
    pub fn mutate_activation<R: Rng>(&mut self, rng: &mut R) {
        if self.edges.is_empty() {
            return;
        }

        let mut remaining = self.config.activation_mutation_rate;
        while remaining > 0.0 {
            if rng.random::<f64>() < remaining.min(1.0) {
                let nodes = self.network.nodes();
                let id = nodes[rng.random_range(0..nodes.len())].id();
                self.node_activations.insert(id, Activation::random(rng));
            }
            remaining -= 1.0;
        }
    }

    /// Whether this genome already holds a gene with the given endpoints,
    /// enabled or disabled.
    #[must_use]
    pub fn check_existence(&self, input: NodeId, output: NodeId) -> bool {
        self.edges.values().any(|gene| gene.connects(input, output))
    }

    /// The full edge map, keyed by innovation number.
    #[must_use]
    pub fn edges(&self) -> &BTreeMap<Innovation, Gene> {
        &self.edges
    }

    /// Recorded per-node activation assignments.
    #[must_use]
    pub fn node_activations(&self) -> &HashMap<NodeId, Activation> {
        &self.node_activations
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

    /// Number of enabled edges.
    #[must_use]
    pub fn num_enabled_edges(&self) -> usize {
        self.edges.values().filter(|g| g.enabled).count()
    }

    /// The current compiled network.
    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Capture the durable genetic material.
    #[must_use]
    pub fn snapshot(&self) -> GenomeSnapshot {
        GenomeSnapshot {
            edges: self.edges.clone(),
            node_activations: self.node_activations.clone(),
            input_size: self.input_size,
            output_size: self.output_size,
        }
    }

    /// Reconstruct a genome — compiled and ready to predict — from a
    /// snapshot, with default mutation rates.
    #[must_use]
    pub fn from_snapshot(snapshot: GenomeSnapshot) -> Self {
        let mut genome = Self {
            edges: snapshot.edges,
            node_activations: snapshot.node_activations,
            input_size: snapshot.input_size,
            output_size: snapshot.output_size,
            config: MutationConfig::default(),
            network: Network::compile(0, 0, &BTreeMap::new(), &HashMap::new()),
        };
        genome.compile();
        genome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn fully_connected_seeds_bias_row_sequentially() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let genome = Genome::fully_connected(2, 1, &mut registry, &mut rng);

        // 2 inputs + bias, each to the single output.
        assert_eq!(genome.edges().len(), 3);
        let innovations: Vec<Innovation> = genome.edges().keys().copied().collect();
        assert_eq!(innovations, vec![0, 1, 2]);
        assert!(genome.check_existence(2, 3), "bias edge missing");
        assert_eq!(registry.counter(), 3);

        for gene in genome.edges().values() {
            assert!(gene.enabled);
            assert_eq!(gene.activation, Activation::Linear);
        }
    }

    #[test]
    fn seeding_against_shared_registry_reuses_numbers() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let first = Genome::fully_connected(2, 1, &mut registry, &mut rng);
        let second = Genome::fully_connected(2, 1, &mut registry, &mut rng);

        let keys_a: Vec<Innovation> = first.edges().keys().copied().collect();
        let keys_b: Vec<Innovation> = second.edges().keys().copied().collect();
        assert_eq!(keys_a, keys_b);
        assert_eq!(registry.counter(), 3);
    }

    #[test]
    fn predict_validates_input_length() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = Genome::fully_connected(2, 1, &mut registry, &mut rng);

        let err = genome.predict(&[1.0]).unwrap_err();
        assert_eq!(
            err,
            PredictError::InvalidInput {
                expected: 2,
                got: 1
            }
        );
        // A well-formed call still works afterwards.
        assert!(genome.predict(&[1.0, -1.0]).is_ok());
    }

    #[test]
    fn zero_inputs_leave_only_the_bias_edge() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = Genome::fully_connected(2, 1, &mut registry, &mut rng);

        let bias_weight = genome
            .edges()
            .values()
            .find(|g| g.input == 2)
            .map(|g| g.weight)
            .unwrap();
        let outputs = genome.predict(&[0.0, 0.0]).unwrap();
        assert!((outputs[0] - bias_weight).abs() < 1e-12);
    }

    #[test]
    fn generate_link_respects_structure() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = Genome::fully_connected(3, 2, &mut registry, &mut rng);

        for _ in 0..50 {
            if genome.generate_node(&mut registry, &mut rng).is_some() {
                genome.compile();
            }
            genome.generate_link(&mut registry, &mut rng);
            genome.compile();
        }

        let mut seen = std::collections::HashSet::new();
        for gene in genome.edges().values() {
            assert!(
                seen.insert((gene.input, gene.output)),
                "duplicate edge {} -> {}",
                gene.input,
                gene.output
            );
            let src = genome.network().node(gene.input).unwrap();
            let dst = genome.network().node(gene.output).unwrap();
            assert_ne!(src.kind(), NodeKind::Output);
            assert_ne!(dst.kind(), NodeKind::Input);
        }
        // No pair may exist in both directions.
        for &(a, b) in &seen {
            assert!(!seen.contains(&(b, a)) || a == b);
        }
    }

    #[test]
    fn generate_link_caps_out_on_saturated_network() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        // 1 input + bias + 1 output, fully connected: every legal pair exists.
        let mut genome = Genome::fully_connected(1, 1, &mut registry, &mut rng);

        let before = genome.edges().len();
        for _ in 0..20 {
            assert_eq!(genome.generate_link(&mut registry, &mut rng), None);
        }
        assert_eq!(genome.edges().len(), before);
    }

    #[test]
    fn generate_node_splits_one_edge() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = Genome::fully_connected(2, 1, &mut registry, &mut rng);

        let enabled_before = genome.num_enabled_edges();
        let total_before = genome.edges().len();

        let new_node = genome.generate_node(&mut registry, &mut rng).unwrap();
        genome.compile();

        assert_eq!(genome.edges().len(), total_before + 2);
        assert_eq!(genome.num_enabled_edges(), enabled_before + 1);

        let inbound: Vec<&Gene> = genome
            .edges()
            .values()
            .filter(|g| g.output == new_node)
            .collect();
        let outbound: Vec<&Gene> = genome
            .edges()
            .values()
            .filter(|g| g.input == new_node)
            .collect();
        assert_eq!(inbound.len(), 1);
        assert_eq!(outbound.len(), 1);
        assert!((inbound[0].weight - 1.0).abs() < 1e-12);
        assert_eq!(inbound[0].activation, Activation::Linear);

        // The split edge is retained, disabled, and structurally matches the
        // two replacements end to end.
        let split = genome
            .edges()
            .values()
            .find(|g| !g.enabled)
            .expect("split edge kept as history");
        assert_eq!(split.input, inbound[0].input);
        assert_eq!(split.output, outbound[0].output);
        assert!((outbound[0].weight - split.weight).abs() < 1e-12);
        assert_eq!(outbound[0].activation, split.activation);

        let node = genome.network().node(new_node).unwrap();
        assert!(node.in_degree() >= 1);
        assert!(node.out_degree() >= 1);
    }

    #[test]
    fn generate_node_on_empty_genome_is_noop() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = Genome::new(2, 1);

        assert_eq!(genome.generate_node(&mut registry, &mut rng), None);
        assert!(genome.edges().is_empty());
        assert_eq!(registry.counter(), 0);
    }

    #[test]
    fn mutate_weights_only_touches_weights() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = Genome::fully_connected(2, 1, &mut registry, &mut rng);
        genome.config.perturb_chance = 1.0;

        let before: Vec<Gene> = genome.edges().values().cloned().collect();
        genome.mutate_weights(&mut rng);
        let after: Vec<Gene> = genome.edges().values().cloned().collect();

        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.input, b.input);
            assert_eq!(a.output, b.output);
            assert_eq!(a.innovation, b.innovation);
            assert_eq!(a.enabled, b.enabled);
            assert_eq!(a.activation, b.activation);
            assert!(
                (a.weight - b.weight).abs() > 1e-15,
                "every edge should be perturbed at chance 1.0"
            );
        }
    }

    #[test]
    fn mutate_activation_records_into_the_map() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = Genome::fully_connected(2, 1, &mut registry, &mut rng);
        genome.config.activation_mutation_rate = 8.0;

        genome.mutate_activation(&mut rng);
        let non_linear = genome
            .node_activations()
            .values()
            .filter(|&&a| a != Activation::Linear)
            .count();
        assert!(non_linear > 0, "expected some reassignment at rate 8");
    }

    #[test]
    fn mutate_activation_on_empty_genome_is_noop() {
        let mut rng = test_rng();
        let mut genome = Genome::new(2, 1);
        genome.mutate_activation(&mut rng);
        assert!(genome.node_activations().is_empty());
    }

    #[test]
    fn snapshot_restores_identical_predictions() {
        let mut registry = InnovationRegistry::new();
        let mut rng = test_rng();
        let mut genome = Genome::fully_connected(3, 2, &mut registry, &mut rng);
        for _ in 0..10 {
            genome.generate_node(&mut registry, &mut rng);
            genome.compile();
            genome.generate_link(&mut registry, &mut rng);
            genome.mutate_weights(&mut rng);
            genome.mutate_activation(&mut rng);
            genome.compile();
        }

        let state = [0.3, -0.7, 0.1];
        let expected: Vec<u64> = genome
            .predict(&state)
            .unwrap()
            .iter()
            .map(|v| v.to_bits())
            .collect();

        let mut restored = Genome::from_snapshot(genome.snapshot());
        let outputs: Vec<u64> = restored
            .predict(&state)
            .unwrap()
            .iter()
            .map(|v| v.to_bits())
            .collect();
        assert_eq!(expected, outputs);
    }
}
