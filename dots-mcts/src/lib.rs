//! Dots-and-Boxes MCTS - UCT search over a fixed node arena
//!
//! This crate provides the move-selection engine:
//! - Tree policy (UCB1) with lazy, maturity-gated expansion
//! - Random playouts with early cutoff on decided games
//! - Backpropagation of win/loss/tie outcomes
//! - Bump-allocated node arena with graceful exhaustion

pub mod tree;
pub mod rollout;
pub mod search;

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use rollout::{playout, RandomSource};
pub use search::{MoveStatistics, SearchError, SearchReport, Uct};
pub use tree::{ChildRange, Expansion, Node, NodeArena, NodeId};

/// How the root's children are ranked once the iteration budget is spent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalSelection {
    /// Same UCB1 comparison used while descending the tree
    #[default]
    Ucb,
    /// Child with the highest visit count
    MostVisits,
}

/// UCT engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UctConfig {
    /// Arena capacity in nodes
    pub max_nodes: usize,
    /// Visits a leaf needs before it is expanded
    pub maturity: u32,
    /// Search iterations per decision
    pub iterations: u32,
    /// Seed for the playout random source
    pub seed: u64,
    /// Board move count at which a playout stops and falls back to the score
    /// estimate
    pub playout_move_cap: usize,
    pub final_selection: FinalSelection,
}

impl Default for UctConfig {
    fn default() -> Self {
        Self {
            max_nodes: 4_000_000,
            maturity: 20,
            iterations: 200_000,
            seed: 1_386_962_552,
            playout_move_cap: 60,
            final_selection: FinalSelection::Ucb,
        }
    }
}

impl UctConfig {
    /// Small, fast configuration for tests and quick games
    pub fn quick(iterations: u32) -> Self {
        Self {
            max_nodes: 200_000,
            iterations,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_maturity(mut self, maturity: u32) -> Self {
        self.maturity = maturity;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_final_selection(mut self, final_selection: FinalSelection) -> Self {
        self.final_selection = final_selection;
        self
    }

    /// Load from a JSON file. Missing fields take their default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
