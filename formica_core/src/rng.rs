//! Deterministic random streams.
//!
//! Every consumer of randomness gets its own `ChaCha8Rng` derived from the
//! world seed, so adding an ant never shifts another ant's noise sequence
//! and parallel updates stay reproducible.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Golden ratio multiplier used to spread seeds.
const SEED_SPREAD: u64 = 0x9e3779b97f4a7c15;

/// Second odd multiplier, mixed in for per-ant streams.
const ANT_SPREAD: u64 = 0x517cc1b727220a95;

/// Salt separating the spawn stream from the ant streams.
const SPAWN_SALT: u64 = 0x3c6ef372fe94f82b;

/// Noise stream for ant `ant_id` in a world seeded with `world_seed`.
pub fn ant_rng(world_seed: u64, ant_id: u32) -> ChaCha8Rng {
    let seed = world_seed
        .wrapping_mul(SEED_SPREAD)
        .wrapping_add(u64::from(ant_id).wrapping_mul(ANT_SPREAD));
    ChaCha8Rng::seed_from_u64(seed)
}

/// Stream used for random placement of new ants.
pub fn spawn_rng(world_seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(world_seed.wrapping_mul(SPAWN_SALT))
}
