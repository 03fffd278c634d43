//! Play command - interactive game on stdin/stdout
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_game() - the turn loop
//! - Level 3: read_human_move(), engine_move()

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::{Args, ValueEnum};

use dots_core::{Board, Player, Vertex};
use dots_mcts::Uct;

use crate::engine_args::EngineArgs;
use crate::input::{format_edge, parse_edge};
use crate::render::{draw, player_letter, score_line};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

/// Which side the engine plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AiSide {
    A,
    B,
    /// Two humans
    None,
    /// Engine against itself
    Both,
}

impl AiSide {
    fn controls(self, player: Player) -> bool {
        match self {
            AiSide::A => player == Player::A,
            AiSide::B => player == Player::B,
            AiSide::None => false,
            AiSide::Both => true,
        }
    }
}

#[derive(Args)]
pub struct PlayArgs {
    /// Dot rows
    #[arg(long, default_value = "3")]
    pub rows: usize,

    /// Dot columns
    #[arg(long, default_value = "3")]
    pub cols: usize,

    /// Side played by the engine
    #[arg(long, value_enum, default_value = "b")]
    pub ai: AiSide,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// How an interactive game ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEnd {
    Finished(Option<Player>),
    /// Input closed before the game was over
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let mut board = Board::new(args.rows, args.cols)?;

    let mut uct = if args.ai == AiSide::None {
        None
    } else {
        Some(Uct::new(args.engine.resolve(seed)?))
    };

    tracing::info!(
        "Starting {}x{} game, engine plays {:?}",
        args.rows,
        args.cols,
        args.ai
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let end = play_game(
        &mut board,
        args.ai,
        uct.as_mut(),
        &mut stdin.lock(),
        &mut stdout.lock(),
    )?;

    tracing::debug!("Game ended: {:?}", end);
    Ok(())
}

// ============================================================================
// LEVEL 2 - TURN LOOP
// ============================================================================

/// Alternate human input and engine moves until the board is full or the
/// input closes.
pub fn play_game<R: BufRead, W: Write>(
    board: &mut Board,
    ai: AiSide,
    mut uct: Option<&mut Uct>,
    input: &mut R,
    output: &mut W,
) -> Result<GameEnd> {
    while !board.game_over() {
        write!(output, "{}", draw(board))?;
        let player = board.current_player();
        write!(output, "Player {} move: ", player_letter(player))?;
        output.flush()?;

        let vertex = match (ai.controls(player), uct.as_deref_mut()) {
            (true, Some(uct)) => {
                let vertex = engine_move(board, uct)?;
                let (p1, p2) = board.vertex_to_edge(vertex);
                writeln!(output, "{}", format_edge(p1, p2))?;
                vertex
            }
            _ => match read_human_move(board, input, output)? {
                Some(vertex) => vertex,
                None => {
                    writeln!(output, "Exiting.")?;
                    return Ok(GameEnd::Quit);
                }
            },
        };

        let captured = board.apply_move(vertex);
        if captured > 0 {
            tracing::debug!("Player {:?} captured {} box(es)", player, captured);
        }
    }

    write!(output, "{}", draw(board))?;
    let winner = board.estimate();
    match winner {
        Some(player) => writeln!(output, "Player {} wins!", player_letter(player))?,
        None => writeln!(output, "Tie!")?,
    }
    writeln!(output, "Final {}", score_line(board))?;

    Ok(GameEnd::Finished(winner))
}

// ============================================================================
// LEVEL 3 - MOVES
// ============================================================================

/// Read lines until one names an undrawn line. `None` on end of input.
fn read_human_move<R: BufRead, W: Write>(
    board: &Board,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Vertex>> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let (p1, p2) = match parse_edge(&line) {
            Ok(points) => points,
            Err(e) => {
                writeln!(output, "{}", e)?;
                continue;
            }
        };

        match board.edge_to_vertex(p1, p2) {
            None => writeln!(output, "Invalid line segment.")?,
            Some(vertex) if !board.is_valid_move(vertex) => {
                writeln!(output, "Line already drawn.")?
            }
            Some(vertex) => return Ok(Some(vertex)),
        }
    }
}

fn engine_move(board: &Board, uct: &mut Uct) -> Result<Vertex> {
    uct.rewind();
    let report = uct.run(board)?;
    tracing::info!(
        "Engine chose vertex {} after {} iterations ({:.0} playouts/sec)",
        report.vertex,
        report.iterations,
        report.playouts_per_second()
    );
    Ok(report.vertex)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dots_mcts::UctConfig;
    use std::io::Cursor;

    fn all_lines_as_input(board: &Board) -> String {
        board
            .grid()
            .lines()
            .map(|v| {
                let (p1, p2) = board.vertex_to_edge(v);
                format_edge(p1, p2) + "\n"
            })
            .collect()
    }

    fn play(
        board: &mut Board,
        ai: AiSide,
        uct: Option<&mut Uct>,
        text: &str,
    ) -> (GameEnd, String) {
        let mut input = Cursor::new(text.as_bytes().to_vec());
        let mut output = Vec::new();
        let end = play_game(board, ai, uct, &mut input, &mut output).unwrap();
        (end, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_ai_side_controls() {
        assert!(AiSide::A.controls(Player::A));
        assert!(!AiSide::A.controls(Player::B));
        assert!(AiSide::Both.controls(Player::B));
        assert!(!AiSide::None.controls(Player::A));
    }

    #[test]
    fn test_two_humans_finish_game() {
        let mut board = Board::new(3, 3).unwrap();
        let text = all_lines_as_input(&board);

        let (end, output) = play(&mut board, AiSide::None, None, &text);

        assert!(board.game_over());
        assert_eq!(end, GameEnd::Finished(board.estimate()));
        assert!(output.contains("Final Score: A "));
        assert!(output.contains("wins!") || output.contains("Tie!"));
    }

    #[test]
    fn test_bad_input_reprompts() {
        let mut board = Board::new(3, 3).unwrap();
        let text = "hello\n?0a1\na0b1\na0a1\na1a0\n";

        let (end, output) = play(&mut board, AiSide::None, None, text);

        assert_eq!(end, GameEnd::Quit);
        assert!(output.contains("Invalid input."));
        assert!(output.contains("Invalid row."));
        assert!(output.contains("Invalid line segment."));
        assert!(output.contains("Line already drawn."));
        assert!(output.ends_with("Exiting.\n"));
        assert_eq!(board.moves_played(), 1);
    }

    #[test]
    fn test_huge_column_reprompts() {
        let mut board = Board::new(3, 3).unwrap();
        let text = "a18446744073709551615a18446744073709551615\nb18446744073709551614b18446744073709551615\n";

        let (end, output) = play(&mut board, AiSide::None, None, text);

        assert_eq!(end, GameEnd::Quit);
        assert_eq!(output.matches("Invalid line segment.").count(), 2);
        assert_eq!(board.moves_played(), 0);
    }

    #[test]
    fn test_eof_quits_immediately() {
        let mut board = Board::new(3, 3).unwrap();
        let (end, output) = play(&mut board, AiSide::None, None, "");
        assert_eq!(end, GameEnd::Quit);
        assert!(output.starts_with("  0 1 2"));
        assert_eq!(board.moves_played(), 0);
    }

    #[test]
    fn test_engine_plays_both_sides() {
        let mut board = Board::new(3, 3).unwrap();
        let mut uct = Uct::new(UctConfig::quick(200).with_maturity(5));

        let (end, _) = play(&mut board, AiSide::Both, Some(&mut uct), "");

        assert!(board.game_over());
        assert_eq!(board.score(Player::A) + board.score(Player::B), 4);
        assert_eq!(end, GameEnd::Finished(board.estimate()));
    }

    #[test]
    fn test_engine_answers_human() {
        let mut board = Board::new(3, 3).unwrap();
        let mut uct = Uct::new(UctConfig::quick(100));

        // Human A draws one line, the engine replies, then input ends
        let (end, output) = play(&mut board, AiSide::B, Some(&mut uct), "a0a1\n");

        assert_eq!(end, GameEnd::Quit);
        assert!(output.contains("Player B move: "));
        assert!(board.moves_played() >= 2);
    }
}
