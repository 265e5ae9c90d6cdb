//! Coordinate features and tile-grid pattern rendering.
//!
//! A pattern generator is a compiled genome queried once per tile of a
//! square grid. Each query's input vector packs the tile's spatial features:
//! x and y in `[-1, 1]`, distance from the origin, a normalized angle, and a
//! grid-position counter. The genome treats these as opaque numbers — only
//! the vector length is validated.

use rand::Rng;

use crate::genome::{Genome, PredictError};
use crate::innovation::InnovationRegistry;

/// Number of coordinate features fed to a pattern genome.
pub const FEATURE_COUNT: usize = 5;

/// Integer levels produced by [`PatternGrid::normalized`].
const COLOR_LEVELS: f64 = 254.0;

/// Assemble the feature vector for one tile of a `tiles × tiles` grid.
///
/// `counter` is the running tile index in render order; it maps to `[-1, 1]`
/// over the whole grid. The angle is `asin(y / dist) / π · 2`, taken as 0 at
/// the exact origin.
#[must_use]
pub fn features(col: usize, row: usize, tiles: usize, counter: usize) -> [f64; FEATURE_COUNT] {
    let x = 2.0 * col as f64 / tiles as f64 - 1.0;
    let y = 2.0 * row as f64 / tiles as f64 - 1.0;
    let dist = x.hypot(y);
    let theta = if dist == 0.0 {
        0.0
    } else {
        (y / dist).asin() / std::f64::consts::PI * 2.0
    };
    let position = 2.0 * counter as f64 / (tiles * tiles) as f64 - 1.0;
    [x, y, dist, theta, position]
}

/// Raw per-tile, per-channel outputs of one rendering pass.
#[derive(Debug, Clone)]
pub struct PatternGrid {
    tiles: usize,
    channels: usize,
    /// Flat values, laid out `(col * tiles + row) * channels + channel`.
    values: Vec<f64>,
    min: Vec<f64>,
    max: Vec<f64>,
}

impl PatternGrid {
    /// Grid side length in tiles.
    #[must_use]
    pub fn tiles(&self) -> usize {
        self.tiles
    }

    /// Output channels per tile.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Raw output for one tile and channel.
    #[must_use]
    pub fn value(&self, col: usize, row: usize, channel: usize) -> f64 {
        self.values[(col * self.tiles + row) * self.channels + channel]
    }

    /// The recorded minimum of a channel across the grid.
    #[must_use]
    pub fn channel_min(&self, channel: usize) -> f64 {
        self.min[channel]
    }

    /// The recorded maximum of a channel across the grid.
    #[must_use]
    pub fn channel_max(&self, channel: usize) -> f64 {
        self.max[channel]
    }

    /// Scale every channel to integer levels `0..=254` by per-channel
    /// min/max normalization, preserving the raw layout.
    ///
    /// A channel that is constant across the grid collapses to 0.
    #[must_use]
    pub fn normalized(&self) -> Vec<u8> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let channel = i % self.channels.max(1);
                let range = self.max[channel] - self.min[channel];
                if range > 0.0 {
                    (COLOR_LEVELS * (value - self.min[channel]) / range) as u8
                } else {
                    0
                }
            })
            .collect()
    }
}

/// Render a `tiles × tiles` grid by predicting once per tile.
///
/// The genome's input size must equal [`FEATURE_COUNT`]; its output size
/// sets the channel count. Tiles are visited column-major, matching the
/// counter feature's render order.
///
/// # Errors
///
/// [`PredictError::InvalidInput`] if the genome does not take
/// [`FEATURE_COUNT`] inputs.
pub fn render_tiles(genome: &mut Genome, tiles: usize) -> Result<PatternGrid, PredictError> {
    let channels = genome.output_size();
    let mut grid = PatternGrid {
        tiles,
        channels,
        values: Vec::with_capacity(tiles * tiles * channels),
        min: vec![f64::INFINITY; channels],
        max: vec![f64::NEG_INFINITY; channels],
    };

    let mut counter = 0;
    for col in 0..tiles {
        for row in 0..tiles {
            let state = features(col, row, tiles, counter);
            let outputs = genome.predict(&state)?;
            for (channel, &value) in outputs.iter().enumerate() {
                if value < grid.min[channel] {
                    grid.min[channel] = value;
                }
                if value > grid.max[channel] {
                    grid.max[channel] = value;
                }
                grid.values.push(value);
            }
            counter += 1;
        }
    }
    Ok(grid)
}

/// Grow a genome's topology by `complexity` mutation rounds.
///
/// Each round flips a fair coin between adding a link and splitting an edge,
/// perturbs weights, reassigns activations, and recompiles — the standard
/// driving loop for producing a pattern generator of the desired complexity.
pub fn grow<R: Rng>(
    genome: &mut Genome,
    registry: &mut InnovationRegistry,
    complexity: usize,
    rng: &mut R,
) {
    for _ in 0..complexity {
        if rng.random::<f64>() >= 0.5 {
            genome.generate_link(registry, rng);
        } else {
            genome.generate_node(registry, rng);
        }
        genome.mutate_weights(rng);
        genome.mutate_activation(rng);
        genome.compile();
    }
}
