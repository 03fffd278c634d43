//! Self-play command - engine vs engine games
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: seeding and formatting utilities

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use dots_core::{Board, Player};
use dots_mcts::{Uct, UctConfig};

use crate::engine_args::EngineArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SelfPlayArgs {
    /// Dot rows
    #[arg(long, default_value = "3")]
    pub rows: usize,

    /// Dot columns
    #[arg(long, default_value = "3")]
    pub cols: usize,

    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    winner: Option<Player>,
    score_a: u32,
    score_b: u32,
    moves: usize,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    a_wins: usize,
    b_wins: usize,
    ties: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run self-play command
///
/// 1. Resolve the engine configuration
/// 2. Play the games
/// 3. Report results
pub fn run(args: SelfPlayArgs, seed: Option<u64>) -> Result<()> {
    // Fail on bad dimensions before any engine allocates its arena
    Board::new(args.rows, args.cols)?;
    let config = args.engine.resolve(seed)?;

    tracing::info!(
        "Starting self-play: {} games on {}x{} ({} iterations, seed {})",
        args.games,
        args.rows,
        args.cols,
        config.iterations,
        config.seed
    );

    let results = play_match(&args, &config)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_match(args: &SelfPlayArgs, config: &UctConfig) -> Result<MatchResults> {
    let progress = if args.games > 1 && std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        let pb = ProgressBar::new(args.games as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut games = Vec::with_capacity(args.games);
    for index in 0..args.games {
        let record = play_single_game(args.rows, args.cols, config, index)?;

        tracing::info!(
            "Game {}: {:?} ({}-{}, {} moves)",
            record.game_number,
            record.winner,
            record.score_a,
            record.score_b,
            record.moves
        );

        games.push(record);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    Ok(compute_match_statistics(games))
}

fn report_results(results: &MatchResults, args: &SelfPlayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game between two identically configured engines.
fn play_single_game(
    dot_rows: usize,
    dot_cols: usize,
    config: &UctConfig,
    index: usize,
) -> Result<GameRecord> {
    let (seed_a, seed_b) = game_seeds(config.seed, index);
    let mut engine_a = Uct::new(config.clone().with_seed(seed_a));
    let mut engine_b = Uct::new(config.clone().with_seed(seed_b));

    let mut board = Board::new(dot_rows, dot_cols)?;
    while !board.game_over() {
        let engine = match board.current_player() {
            Player::A => &mut engine_a,
            Player::B => &mut engine_b,
        };
        engine.rewind();
        let vertex = engine.choose_move(&board)?;
        board.apply_move(vertex);
    }

    Ok(GameRecord {
        game_number: index + 1,
        winner: board.estimate(),
        score_a: board.score(Player::A),
        score_b: board.score(Player::B),
        moves: board.moves_played(),
    })
}

fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let a_wins = games
        .iter()
        .filter(|g| g.winner == Some(Player::A))
        .count();
    let b_wins = games
        .iter()
        .filter(|g| g.winner == Some(Player::B))
        .count();
    let ties = games.iter().filter(|g| g.winner.is_none()).count();

    let total_moves: usize = games.iter().map(|g| g.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    MatchResults {
        games,
        a_wins,
        b_wins,
        ties,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Seeds for player A and player B in game `index`
fn game_seeds(base: u64, index: usize) -> (u64, u64) {
    let a = base.wrapping_add(2 * index as u64);
    (a, a.wrapping_add(1))
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        winner: Option<Player>,
        score_a: u32,
        score_b: u32,
        moves: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        a_wins: usize,
        b_wins: usize,
        ties: usize,
        avg_moves: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        a_wins: results.a_wins,
        b_wins: results.b_wins,
        ties: results.ties,
        avg_moves: results.avg_moves,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                winner: g.winner,
                score_a: g.score_a,
                score_b: g.score_b,
                moves: g.moves,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Self-Play Results ===");
    println!("Total games: {}", total);
    println!(
        "A wins:      {} ({:.1}%)",
        results.a_wins,
        percent(results.a_wins, total)
    );
    println!(
        "B wins:      {} ({:.1}%)",
        results.b_wins,
        percent(results.b_wins, total)
    );
    println!(
        "Ties:        {} ({:.1}%)",
        results.ties,
        percent(results.ties, total)
    );
    println!("Avg moves:   {:.1}", results.avg_moves);

    println!("\nGame details:");
    for game in &results.games {
        let outcome = match game.winner {
            Some(Player::A) => "A wins",
            Some(Player::B) => "B wins",
            None => "tie",
        };
        println!(
            "  Game {}: {} {}-{} in {} moves",
            game.game_number, outcome, game.score_a, game.score_b, game.moves
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
