//! Random playouts
//!
//! A playout draws uniformly random free lines on a shadow board until the
//! outcome is decided, the board is full, or the board's move count reaches a
//! cap. Sampling is O(1) thanks to the board's dense free list.

use dots_core::{Board, Player};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// RANDOM SOURCE
// ============================================================================

/// Seeded generator of uniform integers
#[derive(Clone, Debug)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform integer in `0..n`. `n` must be non-zero.
    pub fn below(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}

// ============================================================================
// PLAYOUT
// ============================================================================

/// Play random moves on `shadow` and report who won.
///
/// Returns the decided winner, `None` for a finished tie, or the raw score
/// leader if `shadow.moves_played()` reaches `move_cap` first.
pub fn playout(shadow: &mut Board, rng: &mut RandomSource, move_cap: usize) -> Option<Player> {
    loop {
        if let Some(winner) = shadow.winner() {
            return Some(winner);
        }
        if shadow.game_over() {
            return None;
        }
        if shadow.moves_played() >= move_cap {
            return shadow.estimate();
        }

        let vertex = shadow.free_vertex(rng.below(shadow.free_vertices()));
        shadow.apply_move(vertex);
    }
}

// ============================================================================
// TESTS
// ============================================================================
