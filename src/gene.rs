//! Gene types for network genomes.
//!
//! A [`Gene`] is one directed, weighted edge between two node ids, tagged
//! with the innovation number it was minted under. Genes are created once by
//! a seeding or mutation operator; afterwards only weight, activation and
//! enabled state may change, never the endpoints.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;

/// Integer identifier of an evaluation vertex.
///
/// Ids `[0, input_size - 1]` are inputs, id `input_size` is the bias input,
/// ids `[input_size + 1, input_size + output_size]` are outputs, and anything
/// beyond is a hidden node numbered by insertion order.
pub type NodeId = usize;

/// Historical marking shared by every structurally identical edge.
pub type Innovation = usize;

/// A directed, weighted connection between two nodes.
///
/// Disabled genes are skipped by the compiler but kept in the genome as
/// historical record, so a split edge can never be rediscovered as "new".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Source node id.
    pub input: NodeId,
    /// Destination node id.
    pub output: NodeId,
    /// Connection weight.
    pub weight: f64,
    /// Innovation number, unique per structurally distinct `(input, output)`
    /// pair across a registry's lifetime.
    pub innovation: Innovation,
    /// Whether the compiler expresses this gene.
    pub enabled: bool,
    /// Activation carried by the gene; inherited by the downstream replacement
    /// edge when this gene is split.
    pub activation: Activation,
}

impl Gene {
    /// Create an enabled gene with an explicit weight.
    #[must_use]
    pub fn new(
        input: NodeId,
        output: NodeId,
        weight: f64,
        innovation: Innovation,
        activation: Activation,
    ) -> Self {
        Self {
            input,
            output,
            weight,
            innovation,
            enabled: true,
            activation,
        }
    }

    /// Create an enabled gene with a standard-normal random weight.
    pub fn with_random_weight<R: Rng>(
        input: NodeId,
        output: NodeId,
        innovation: Innovation,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let weight: f64 = rng.sample(StandardNormal);
        Self::new(input, output, weight, innovation, activation)
    }

    /// Multiply an upstream output by this gene's weight.
    #[inline]
    #[must_use]
    pub fn invoke(&self, x: f64) -> f64 {
        x * self.weight
    }

    /// Shift the weight by `delta`.
    pub fn perturb_weight(&mut self, delta: f64) {
        self.weight += delta;
    }

    /// Whether this gene connects the same ordered node pair.
    #[inline]
    #[must_use]
    pub fn connects(&self, input: NodeId, output: NodeId) -> bool {
        self.input == input && self.output == output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn invoke_scales_by_weight() {
        let gene = Gene::new(0, 3, 0.5, 7, Activation::Linear);
        assert!((gene.invoke(4.0) - 2.0).abs() < 1e-12);
        assert!(gene.enabled);
        assert_eq!(gene.innovation, 7);
    }

    #[test]
    fn perturb_accumulates() {
        let mut gene = Gene::new(1, 2, 1.0, 0, Activation::Sine);
        gene.perturb_weight(0.25);
        gene.perturb_weight(-0.5);
        assert!((gene.weight - 0.75).abs() < 1e-12);
        assert_eq!(gene.activation, Activation::Sine);
    }

    #[test]
    fn connects_is_directional() {
        let gene = Gene::new(0, 3, 1.0, 0, Activation::Linear);
        assert!(gene.connects(0, 3));
        assert!(!gene.connects(3, 0));
    }

    #[test]
    fn random_weight_varies() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let a = Gene::with_random_weight(0, 2, 0, Activation::Linear, &mut rng);
        let b = Gene::with_random_weight(1, 2, 1, Activation::Linear, &mut rng);
        assert!(a.weight.is_finite() && b.weight.is_finite());
        assert!((a.weight - b.weight).abs() > 1e-12);
    }
}
