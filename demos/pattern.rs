//! Pattern generation demo.
//!
//! Grows a random pattern genome and prints one channel of the rendered
//! tile grid as characters.
//!
//! Run with: `cargo run --example pattern`

use pattern_neat::{grow, render_tiles, Genome, InnovationRegistry, FEATURE_COUNT};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const TILES: usize = 48;
const COMPLEXITY: usize = 100;
const CHANNELS: usize = 3;
const SHADES: &[u8] = b" .:-=+*#%@";

fn main() {
    println!("pattern-neat demo");
    println!("=================\n");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    let mut registry = InnovationRegistry::new();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut genome = Genome::fully_connected(FEATURE_COUNT, CHANNELS, &mut registry, &mut rng);

    println!("Seed: {seed}");
    println!("Complexity: {COMPLEXITY} mutation rounds");
    println!("Grid: {TILES}x{TILES} tiles, {CHANNELS} channels\n");

    for round in 0..COMPLEXITY {
        grow(&mut genome, &mut registry, 1, &mut rng);
        if round % 20 == 0 || round == COMPLEXITY - 1 {
            println!(
                "Round {:3}: nodes={}, edges={} ({} enabled), innovations={}",
                round,
                genome.network().len(),
                genome.edges().len(),
                genome.num_enabled_edges(),
                registry.counter()
            );
        }
    }

    let grid = render_tiles(&mut genome, TILES).expect("genome takes the feature vector");
    let levels = grid.normalized();

    println!("\nChannel 0:");
    for row in 0..TILES {
        let mut line = String::with_capacity(TILES);
        for col in 0..TILES {
            let level = levels[(col * TILES + row) * CHANNELS];
            let shade = SHADES[level as usize * (SHADES.len() - 1) / 254];
            line.push(shade as char);
        }
        println!("{line}");
    }

    println!("\nChannel ranges:");
    for channel in 0..CHANNELS {
        println!(
            "  channel {channel}: [{:.4}, {:.4}]",
            grid.channel_min(channel),
            grid.channel_max(channel)
        );
    }
}
