//! # pattern-neat
//!
//! A NEAT-style neuroevolution engine for procedural pattern synthesis.
//! Genomes encode sparse feed-forward networks as edge lists with historical
//! innovation markings; structural mutation grows topology incrementally,
//! and a compile/predict pair turns the encoding into per-tile output values
//! for image generation.
//!
//! ## Features
//!
//! - **Historical innovation tracking**: an explicit [`InnovationRegistry`]
//!   (counter + structural history) shared by every genome in a run, so
//!   rediscovered edges reuse their original innovation numbers
//! - **Structure-preserving mutation**: link and node-split operators that
//!   never duplicate an edge and reject cycle-closing candidates, with a
//!   bounded-retry link policy that degrades to a no-op on dense graphs
//! - **Memoized evaluation**: each compile rebuilds an integer-id node arena;
//!   prediction is a lazy, iterative sweep firing every node at most once
//! - **Pattern catalog**: 19 scalar activations — periodic, radial and
//!   folding functions suited to coordinate-driven image synthesis
//!
//! ## Quick start
//!
//! ```rust
//! use pattern_neat::{Genome, InnovationRegistry};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut registry = InnovationRegistry::new();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//!
//! // Two coordinate inputs (plus implicit bias), one channel out.
//! let mut genome = Genome::fully_connected(2, 1, &mut registry, &mut rng);
//!
//! // Grow topology, then evaluate.
//! genome.generate_node(&mut registry, &mut rng);
//! genome.compile();
//! let output = genome.predict(&[0.5, -0.5]).unwrap();
//! println!("output: {output:?}");
//! ```
//!
//! ## Architecture
//!
//! The genome's edge map is the durable state; the compiled [`Network`] is a
//! transient arena discarded and rebuilt by every [`Genome::compile`]. The
//! registry is passed `&mut` into structural mutations rather than living in
//! process-wide statics, which keeps parallel runs explicit: one registry per
//! run, one writer at a time. A genome snapshot (edge map, node activations,
//! sizes) round-trips through serde and reconstructs an identical network;
//! registry state is persisted separately, if at all.

pub mod activation;
pub mod gene;
pub mod genome;
pub mod innovation;
pub mod network;
pub mod pattern;

pub use activation::Activation;
pub use gene::{Gene, Innovation, NodeId};
pub use genome::{Genome, GenomeSnapshot, MutationConfig, PredictError};
pub use innovation::InnovationRegistry;
pub use network::{Network, Node, NodeKind};
pub use pattern::{features, grow, render_tiles, PatternGrid, FEATURE_COUNT};
