//! Engine flags shared by every command

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use dots_mcts::{FinalSelection, UctConfig};

#[derive(Args, Clone, Debug, Default)]
pub struct EngineArgs {
    /// Engine configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Search iterations per move
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Visits before a leaf is expanded
    #[arg(long)]
    pub maturity: Option<u32>,

    /// Node arena capacity
    #[arg(long)]
    pub max_nodes: Option<usize>,

    /// Pick the most visited root move instead of the best UCB1 score
    #[arg(long)]
    pub most_visits: bool,
}

impl EngineArgs {
    /// Start from the config file (or defaults) and apply flag overrides.
    pub fn resolve(&self, seed: Option<u64>) -> Result<UctConfig> {
        let mut config = match &self.config {
            Some(path) => UctConfig::load(path)?,
            None => UctConfig::default(),
        };

        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(maturity) = self.maturity {
            config.maturity = maturity;
        }
        if let Some(max_nodes) = self.max_nodes {
            config.max_nodes = max_nodes;
        }
        if let Some(seed) = seed {
            config.seed = seed;
        }
        if self.most_visits {
            config.final_selection = FinalSelection::MostVisits;
        }

        tracing::debug!("Engine config: {:?}", config);
        Ok(config)
    }
}
