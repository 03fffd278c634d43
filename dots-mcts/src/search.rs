//! UCT search loop
//!
//! Implements one decision of the UCT algorithm:
//! 1. Selection - Descend by UCB1, replaying moves on a shadow board
//! 2. Expansion - Expand a leaf once it has matured
//! 3. Simulation - Random playout from an immature leaf
//! 4. Backpropagation - Credit the outcome along the path
//!
//! ## Architecture
//! - Level 1: run() - one decision
//! - Level 2: run_to_playout() - one iteration
//! - Level 3: statistics collection

use std::time::{Duration, Instant};

use dots_core::{Board, Vertex};

use crate::rollout::{playout, RandomSource};
use crate::tree::{Expansion, Node, NodeArena, NodeId};
use crate::{FinalSelection, UctConfig};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("node arena exhausted: root needs {needed} nodes, {available} available")]
    ArenaExhausted { needed: usize, available: usize },

    #[error("no legal moves on the board")]
    NoLegalMoves,
}

// ============================================================================
// SEARCH REPORT
// ============================================================================

/// Statistics for a single move at the root
#[derive(Clone, Debug, PartialEq)]
pub struct MoveStatistics {
    pub vertex: Vertex,
    pub visits: f64,
    pub score: f64,
}

/// Result of one decision
#[derive(Clone, Debug)]
pub struct SearchReport {
    /// The chosen line
    pub vertex: Vertex,
    pub iterations: u32,
    /// Arena nodes in use when the search finished
    pub nodes_used: usize,
    /// Leaves left unexpanded for lack of arena space, each counted once
    pub failed_expansions: u64,
    pub elapsed: Duration,
    /// One entry per root child, in free-list order
    pub moves: Vec<MoveStatistics>,
}

impl SearchReport {
    /// Root moves sorted by visits, most visited first
    pub fn moves_by_visits(&self) -> Vec<(Vertex, f64)> {
        let mut moves: Vec<_> = self.moves.iter().map(|m| (m.vertex, m.visits)).collect();
        moves.sort_by(|a, b| b.1.total_cmp(&a.1));
        moves
    }

    pub fn playouts_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            f64::from(self.iterations) / secs
        } else {
            0.0
        }
    }
}

// ============================================================================
// UCT ENGINE
// ============================================================================

/// UCT move selector
///
/// Owns its node arena and random source. The arena is not cleared between
/// calls to [`Uct::run`]; call [`Uct::rewind`] to reuse it for another
/// decision.
pub struct Uct {
    config: UctConfig,
    arena: NodeArena,
    rng: RandomSource,
    path: Vec<NodeId>,
    failed_expansions: u64,
}

impl Uct {
    pub fn new(config: UctConfig) -> Self {
        let arena = NodeArena::with_capacity(config.max_nodes);
        let rng = RandomSource::new(config.seed);
        Self {
            config,
            arena,
            rng,
            path: Vec::new(),
            failed_expansions: 0,
        }
    }

    pub fn config(&self) -> &UctConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn nodes_used(&self) -> usize {
        self.arena.len()
    }

    /// Release every node so the arena can serve another decision.
    pub fn rewind(&mut self) {
        self.arena.rewind();
    }

    /// Pick a move for the current player of `board`.
    pub fn choose_move(&mut self, board: &Board) -> Result<Vertex, SearchError> {
        self.run(board).map(|report| report.vertex)
    }

    // ========================================================================
    // Level 1: One Decision
    // ========================================================================

    /// Search from `board` and report the chosen move.
    ///
    /// `board` is never modified; every iteration works on a shadow copy.
    pub fn run(&mut self, board: &Board) -> Result<SearchReport, SearchError> {
        if board.free_vertices() == 0 {
            return Err(SearchError::NoLegalMoves);
        }

        let needed = board.free_vertices() + 1;
        let available = self.arena.remaining();
        let exhausted = || SearchError::ArenaExhausted { needed, available };

        let root = self.arena.alloc(Node::root()).ok_or_else(exhausted)?;
        if !matches!(self.arena.expand(root, board), Expansion::Expanded(_)) {
            tracing::warn!(needed, available, "arena too small to expand the root");
            return Err(exhausted());
        }

        tracing::debug!(
            "Searching {} moves for {:?} ({} iterations, maturity {})",
            board.free_vertices(),
            board.current_player(),
            self.config.iterations,
            self.config.maturity
        );

        self.failed_expansions = 0;
        let start = Instant::now();
        let mut shadow = board.clone();
        for _ in 0..self.config.iterations {
            shadow.clone_from(board);
            self.run_to_playout(root, &mut shadow);
        }
        let elapsed = start.elapsed();

        let chosen = match self.config.final_selection {
            FinalSelection::Ucb => self.arena.best_child(root),
            FinalSelection::MostVisits => self.arena.most_visited_child(root),
        }
        .ok_or(SearchError::NoLegalMoves)?;

        let report = SearchReport {
            vertex: self.arena.get(chosen).vertex,
            iterations: self.config.iterations,
            nodes_used: self.arena.len(),
            failed_expansions: self.failed_expansions,
            elapsed,
            moves: collect_move_statistics(&self.arena, root),
        };

        for m in &report.moves {
            tracing::trace!("vertex={} score={} visits={}", m.vertex, m.score, m.visits);
        }
        tracing::debug!(
            "Chose vertex {} ({:.0} playouts/sec, {} nodes, {} failed expansions)",
            report.vertex,
            report.playouts_per_second(),
            report.nodes_used,
            report.failed_expansions
        );

        Ok(report)
    }

    // ========================================================================
    // Level 2: One Iteration
    // ========================================================================

    /// Descend from `root`, expand or simulate at the leaf, and credit the
    /// outcome to every node on the way.
    fn run_to_playout(&mut self, root: NodeId, shadow: &mut Board) {
        self.path.clear();
        self.path.push(root);

        let mut node = root;
        let winner = loop {
            if let Some(child) = self.arena.best_child(node) {
                node = child;
                self.path.push(child);
                shadow.apply_move(self.arena.get(child).vertex);
                if let Some(winner) = shadow.winner() {
                    break Some(winner);
                }
                continue;
            }

            if self.arena.get(node).visits < f64::from(self.config.maturity) {
                break playout(shadow, &mut self.rng, self.config.playout_move_cap);
            }
            if self.arena.get(node).out_of_space {
                break shadow.winner();
            }

            match self.arena.expand(node, shadow) {
                Expansion::Expanded(_) => continue,
                Expansion::NoMoves => break shadow.winner(),
                Expansion::OutOfSpace => {
                    self.failed_expansions += 1;
                    break shadow.winner();
                }
            }
        };

        self.arena.backpropagate(&self.path, winner);
    }
}

// ============================================================================
// STATISTICS COLLECTION (Level 3)
// ============================================================================

fn collect_move_statistics(arena: &NodeArena, root: NodeId) -> Vec<MoveStatistics> {
    arena
        .children(root)
        .iter()
        .map(|child| MoveStatistics {
            vertex: child.vertex,
            visits: child.visits,
            score: child.score,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dots_core::Player;

    fn test_config() -> UctConfig {
        UctConfig::quick(2_000).with_seed(17).with_maturity(5)
    }

    /// 3x3 board with only `keep` left undrawn
    fn board_with_one_free(keep: Vertex) -> Board {
        let mut board = Board::new(3, 3).unwrap();
        let lines: Vec<Vertex> = board.free_list().to_vec();
        for line in lines.into_iter().filter(|&l| l != keep) {
            board.apply_move(line);
        }
        board
    }

    /// B owns boxes 8 and 16 and is to move with 1, 5 and 19 free. Line 19
    /// closes box 18 and wins outright; 1 or 5 hands A both remaining boxes
    /// and a tie.
    fn decisive_box_board() -> Board {
        let mut board = Board::new(3, 3).unwrap();
        for line in [3, 9, 15, 21, 23, 11, 7, 13, 17] {
            board.apply_move(line);
        }
        assert_eq!(board.current_player(), Player::B);
        assert_eq!(board.score(Player::B), 2);
        assert_eq!(board.winner(), None);
        board
    }

    fn root_child(uct: &Uct, vertex: Vertex) -> NodeId {
        let root = NodeId(0);
        uct.arena
            .get(root)
            .children
            .unwrap()
            .ids()
            .find(|&id| uct.arena.get(id).vertex == vertex)
            .unwrap()
    }

    #[test]
    fn test_returns_legal_move() {
        let board = Board::new(3, 4).unwrap();
        let mut uct = Uct::new(test_config());

        let vertex = uct.choose_move(&board).unwrap();
        assert!(board.is_valid_move(vertex));
    }

    #[test]
    fn test_board_untouched() {
        let mut board = Board::new(3, 3).unwrap();
        board.apply_move(1);
        board.apply_move(5);
        let free_before = board.free_list().to_vec();

        let mut uct = Uct::new(test_config());
        uct.run(&board).unwrap();

        assert_eq!(board.free_list(), free_before.as_slice());
        assert_eq!(board.moves_played(), 2);
    }

    #[test]
    fn test_single_move() {
        let board = board_with_one_free(13);
        let mut uct = Uct::new(UctConfig::quick(50).with_maturity(1));

        let report = uct.run(&board).unwrap();
        assert_eq!(report.vertex, 13);
        assert_eq!(report.moves.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let mut board = Board::new(3, 4).unwrap();
        board.apply_move(3);
        board.apply_move(9);

        let mut first = Uct::new(test_config());
        let mut second = Uct::new(test_config());

        let a = first.run(&board).unwrap();
        let b = second.run(&board).unwrap();
        assert_eq!(a.vertex, b.vertex);
        assert_eq!(a.moves, b.moves);
        assert_eq!(a.nodes_used, b.nodes_used);
    }

    #[test]
    fn test_arena_too_small() {
        let board = Board::new(3, 3).unwrap();
        // Root plus 12 children does not fit in 12 nodes
        let mut uct = Uct::new(UctConfig::quick(100).with_max_nodes(12));

        match uct.run(&board) {
            Err(SearchError::ArenaExhausted { needed, available }) => {
                assert_eq!(needed, 13);
                assert_eq!(available, 12);
            }
            other => panic!("expected arena exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_arena_exactly_fits_root() {
        let board = Board::new(3, 3).unwrap();
        let mut uct = Uct::new(UctConfig::quick(200).with_max_nodes(13).with_maturity(1));

        // No subtree ever fits, but the root decision still succeeds
        let report = uct.run(&board).unwrap();
        assert!(board.is_valid_move(report.vertex));
        assert_eq!(report.nodes_used, 13);
        assert!(report.failed_expansions > 0);
    }

    #[test]
    fn test_refused_leaf_counted_once() {
        let board = Board::new(3, 3).unwrap();
        let mut uct = Uct::new(UctConfig::quick(500).with_max_nodes(13).with_maturity(1));

        let report = uct.run(&board).unwrap();

        // Each visited root child tried to expand exactly once
        let visited = report.moves.iter().filter(|m| m.visits > 1.0).count();
        assert_eq!(report.failed_expansions, visited as u64);
        assert!(report.failed_expansions <= 12);
        for m in report.moves.iter().filter(|m| m.visits > 1.0) {
            assert!(uct.arena.get(root_child(&uct, m.vertex)).out_of_space);
        }
    }

    #[test]
    fn test_decided_child_never_expanded() {
        let board = decisive_box_board();
        let mut uct = Uct::new(UctConfig::quick(300).with_maturity(1));

        let report = uct.run(&board).unwrap();

        let decisive = root_child(&uct, 19);
        let node = uct.arena.get(decisive);
        assert!(node.visits > 1.0);
        assert!(node.children.is_none());
        assert!(!node.out_of_space);
        assert!(uct.arena.children(decisive).is_empty());
        // The undecided siblings matured immediately and grew subtrees
        assert!(report.nodes_used > 4);
    }

    #[test]
    fn test_no_legal_moves() {
        let mut board = Board::new(3, 3).unwrap();
        while !board.game_over() {
            board.apply_move(board.free_vertex(0));
        }
        let mut uct = Uct::new(test_config());
        assert!(matches!(uct.run(&board), Err(SearchError::NoLegalMoves)));
    }

    #[test]
    fn test_root_visits_match_iterations() {
        let board = Board::new(3, 3).unwrap();
        let mut uct = Uct::new(test_config());

        let report = uct.run(&board).unwrap();
        let child_visits: f64 = report.moves.iter().map(|m| m.visits - 1.0).sum();
        // Every iteration descends into exactly one root child
        assert_eq!(child_visits, f64::from(report.iterations));
    }

    #[test]
    fn test_arena_persists_until_rewind() {
        let board = Board::new(3, 3).unwrap();
        let mut uct = Uct::new(test_config());

        uct.run(&board).unwrap();
        let after_first = uct.nodes_used();
        uct.run(&board).unwrap();
        assert!(uct.nodes_used() > after_first);

        uct.rewind();
        assert_eq!(uct.nodes_used(), 0);
        uct.run(&board).unwrap();
        assert!(uct.nodes_used() > 0);
    }

    #[test]
    fn test_takes_decisive_box() {
        let board = decisive_box_board();

        let config = test_config().with_final_selection(FinalSelection::MostVisits);
        let mut uct = Uct::new(config);
        assert_eq!(uct.choose_move(&board).unwrap(), 19);
    }

    #[test]
    fn test_most_visits_selection() {
        let board = Board::new(3, 3).unwrap();
        let mut uct = Uct::new(test_config().with_final_selection(FinalSelection::MostVisits));

        let report = uct.run(&board).unwrap();
        let best = report.moves_by_visits()[0];
        assert_eq!(report.vertex, best.0);
    }

    #[test]
    fn test_moves_by_visits_sorted() {
        let report = SearchReport {
            vertex: 3,
            iterations: 10,
            nodes_used: 3,
            failed_expansions: 0,
            elapsed: Duration::from_millis(5),
            moves: vec![
                MoveStatistics { vertex: 1, visits: 2.0, score: 0.0 },
                MoveStatistics { vertex: 3, visits: 9.0, score: 4.0 },
            ],
        };
        assert_eq!(report.moves_by_visits(), vec![(3, 9.0), (1, 2.0)]);
        assert!(report.playouts_per_second() > 0.0);
    }
}
