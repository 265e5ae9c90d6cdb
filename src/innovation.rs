//! Historical-marking registry for structural mutations.
//!
//! Classic NEAT tags every structurally distinct edge with a globally unique
//! innovation number so independently evolved genomes stay alignable. The
//! registry here is that shared state made explicit: a monotonic counter plus
//! a map from `(source, destination)` to the number minted the first time the
//! pair appeared anywhere in the run. Callers pass it `&mut` into every
//! structural mutation instead of relying on process-wide statics, which also
//! makes persisting it an explicit, optional concern.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::gene::{Innovation, NodeId};

/// Shared innovation state for one evolutionary run.
///
/// The counter and history grow monotonically and never reset. Two genomes
/// mutated against the same registry that rediscover the same structural edge
/// receive the same innovation number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InnovationRegistry {
    counter: Innovation,
    // Serialized as a sequence of (input, output, innovation) triples so the
    // registry survives formats that require string map keys.
    #[serde(
        serialize_with = "serialize_history",
        deserialize_with = "deserialize_history"
    )]
    history: HashMap<(NodeId, NodeId), Innovation>,
}

fn serialize_history<S>(
    history: &HashMap<(NodeId, NodeId), Innovation>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut entries: Vec<(NodeId, NodeId, Innovation)> = history
        .iter()
        .map(|(&(input, output), &innovation)| (input, output, innovation))
        .collect();
    entries.sort_unstable();
    entries.serialize(serializer)
}

fn deserialize_history<'de, D>(
    deserializer: D,
) -> Result<HashMap<(NodeId, NodeId), Innovation>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entries: Vec<(NodeId, NodeId, Innovation)> = Vec::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|(input, output, innovation)| ((input, output), innovation))
        .collect())
}

impl InnovationRegistry {
    /// Create an empty registry with the counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next number a genuinely new edge would be minted under.
    ///
    /// Doubles as the "would be newly minted now" sentinel returned by
    /// [`check`](Self::check) for unseen pairs.
    #[must_use]
    pub fn counter(&self) -> Innovation {
        self.counter
    }

    /// Number of structurally distinct edges recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no edge has ever been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The innovation number of a historical `(input, output)` edge, or the
    /// current counter if the pair has never been seen.
    #[must_use]
    pub fn check(&self, input: NodeId, output: NodeId) -> Innovation {
        self.history
            .get(&(input, output))
            .copied()
            .unwrap_or(self.counter)
    }

    /// Whether the `(input, output)` pair has been recorded before.
    #[must_use]
    pub fn contains(&self, input: NodeId, output: NodeId) -> bool {
        self.history.contains_key(&(input, output))
    }

    /// Resolve the innovation number for an `(input, output)` edge, minting
    /// and recording a fresh number if the pair is new.
    pub fn register(&mut self, input: NodeId, output: NodeId) -> Innovation {
        if let Some(&existing) = self.history.get(&(input, output)) {
            return existing;
        }
        let minted = self.counter;
        self.history.insert((input, output), minted);
        self.counter += 1;
        minted
    }
}
