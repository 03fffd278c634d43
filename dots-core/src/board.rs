//! Board state, move application and capture detection

use crate::grid::{Grid, Point, TileType, Vertex};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest supported dot count along either axis.
pub const MIN_DOTS: usize = 3;

/// Number of sides enclosing a box.
const BOX_SIDES: u32 = 4;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    A = 0,
    B = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A drawn line in dot space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub player: Player,
    pub p1: Point,
    pub p2: Point,
}

/// A captured box, identified by its upper-left dot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledBox {
    pub player: Player,
    pub corner: Point,
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("grid of {dot_rows}x{dot_cols} dots is too small, minimum is 3x3")]
    GridTooSmall { dot_rows: usize, dot_cols: usize },
}

// ============================================================================
// BOARD
// ============================================================================

/// Dots-and-Boxes position
///
/// Three tables share the vertex index space:
/// - `owner`: who drew a line, or who captured a box.
/// - `slot`: for an undrawn line, its index in `free`; for a box, how many of
///   its sides are drawn.
/// - `free`: every undrawn line, in no particular order.
#[derive(Debug)]
pub struct Board {
    grid: Grid,
    owner: Vec<Option<Player>>,
    slot: Vec<u32>,
    free: Vec<Vertex>,
    current: Player,
    scores: [u32; 2],
    capturable: u32,
    total_moves: usize,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create an empty board of `dot_rows x dot_cols` dots.
    pub fn new(dot_rows: usize, dot_cols: usize) -> Result<Self, BoardError> {
        if dot_rows < MIN_DOTS || dot_cols < MIN_DOTS {
            return Err(BoardError::GridTooSmall { dot_rows, dot_cols });
        }

        let grid = Grid::for_dots(dot_rows, dot_cols);
        let area = grid.area();

        let mut slot = vec![0; area];
        let mut free = Vec::with_capacity(area / 2);
        for line in grid.lines() {
            slot[line] = free.len() as u32;
            free.push(line);
        }

        let total_moves = dot_rows * (dot_cols - 1) + dot_cols * (dot_rows - 1);
        debug_assert_eq!(free.len(), total_moves);

        Ok(Self {
            grid,
            owner: vec![None; area],
            slot,
            free,
            current: Player::A,
            scores: [0; 2],
            capturable: ((dot_rows - 1) * (dot_cols - 1)) as u32,
            total_moves,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn dot_rows(&self) -> usize {
        self.grid.dot_rows()
    }

    pub fn dot_cols(&self) -> usize {
        self.grid.dot_cols()
    }

    pub fn vertex_of(&self, row: usize, col: usize) -> Option<Vertex> {
        self.grid.vertex_of(row, col)
    }

    pub fn tile(&self, vertex: Vertex) -> TileType {
        self.grid.tile(vertex)
    }

    /// Player to move
    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    /// Boxes not yet captured
    pub fn capturable_remaining(&self) -> u32 {
        self.capturable
    }

    pub fn total_boxes(&self) -> u32 {
        ((self.dot_rows() - 1) * (self.dot_cols() - 1)) as u32
    }

    /// Total line count, fixed at construction
    pub fn total_moves(&self) -> usize {
        self.total_moves
    }

    pub fn moves_played(&self) -> usize {
        self.total_moves - self.free.len()
    }

    /// Number of undrawn lines
    pub fn free_vertices(&self) -> usize {
        self.free.len()
    }

    /// The `i`-th undrawn line. Order is arbitrary but stable between moves.
    pub fn free_vertex(&self, i: usize) -> Vertex {
        self.free[i]
    }

    /// All undrawn lines
    pub fn free_list(&self) -> &[Vertex] {
        &self.free
    }

    /// Who drew a line, if anyone.
    pub fn line_at(&self, vertex: Vertex) -> Option<Player> {
        assert!(self.is_playable(vertex), "vertex {} is not a line", vertex);
        self.owner[vertex]
    }

    /// Who captured a box, if anyone. Always `None` for dots.
    pub fn box_at(&self, vertex: Vertex) -> Option<Player> {
        assert!(!self.is_playable(vertex), "vertex {} is a line", vertex);
        self.owner[vertex]
    }

    // ========================================================================
    // PREDICATES
    // ========================================================================

    pub fn is_playable(&self, vertex: Vertex) -> bool {
        Grid::is_line(vertex)
    }

    pub fn is_empty(&self, vertex: Vertex) -> bool {
        self.line_at(vertex).is_none()
    }

    /// In range, a line, and not yet drawn.
    pub fn is_valid_move(&self, vertex: Vertex) -> bool {
        self.grid.contains(vertex) && self.is_playable(vertex) && self.owner[vertex].is_none()
    }

    pub fn game_over(&self) -> bool {
        debug_assert!(!self.free.is_empty() || self.capturable == 0);
        self.free.is_empty()
    }

    /// A player whose lead can no longer be overturned, even if the game
    /// isn't over yet.
    pub fn winner(&self) -> Option<Player> {
        let a = self.score(Player::A);
        let b = self.score(Player::B);

        if a > b && a - b > self.capturable {
            return Some(Player::A);
        }
        if b > a && b - a > self.capturable {
            return Some(Player::B);
        }
        None
    }

    /// Whoever is ahead on raw score right now.
    pub fn estimate(&self) -> Option<Player> {
        let a = self.score(Player::A);
        let b = self.score(Player::B);

        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(Player::A),
            std::cmp::Ordering::Less => Some(Player::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    // ========================================================================
    // MOVE APPLICATION
    // ========================================================================

    /// Draw a line for the current player.
    ///
    /// Returns the number of boxes captured. Capturing keeps the turn,
    /// otherwise it passes to the opponent.
    ///
    /// # Panics
    /// If `vertex` is not a valid move.
    pub fn apply_move(&mut self, vertex: Vertex) -> u32 {
        assert!(self.is_valid_move(vertex), "invalid move at vertex {}", vertex);

        self.remove_free(vertex);
        self.owner[vertex] = Some(self.current);

        let mut captured = 0;
        for b in self.grid.adjacent_boxes(vertex).into_iter().flatten() {
            if self.add_side(b) {
                captured += 1;
            }
        }

        if captured == 0 {
            self.current = self.current.opponent();
        }
        captured
    }

    /// Swap the last free entry into the removed line's position.
    fn remove_free(&mut self, vertex: Vertex) {
        let index = self.slot[vertex] as usize;
        debug_assert_eq!(self.free[index], vertex);

        self.free.swap_remove(index);
        if let Some(&moved) = self.free.get(index) {
            self.slot[moved] = index as u32;
        }
    }

    /// Count one more drawn side on a box. Returns true if it was captured.
    fn add_side(&mut self, b: Vertex) -> bool {
        assert!(self.slot[b] < BOX_SIDES, "box {} already enclosed", b);

        self.slot[b] += 1;
        if self.slot[b] < BOX_SIDES {
            return false;
        }

        self.owner[b] = Some(self.current);
        self.scores[self.current.index()] += 1;

        assert!(self.capturable > 0, "capturable count underflow");
        self.capturable -= 1;
        true
    }

    // ========================================================================
    // DOT-SPACE SNAPSHOTS
    // ========================================================================

    pub fn edge_to_vertex(&self, p1: Point, p2: Point) -> Option<Vertex> {
        self.grid.edge_to_vertex(p1, p2)
    }

    pub fn vertex_to_edge(&self, vertex: Vertex) -> (Point, Point) {
        self.grid.vertex_to_edge(vertex)
    }

    /// Drawn lines, sorted by vertex.
    pub fn edges(&self) -> Vec<Edge> {
        self.grid
            .lines()
            .filter_map(|line| {
                let player = self.owner[line]?;
                let (p1, p2) = self.grid.vertex_to_edge(line);
                Some(Edge { player, p1, p2 })
            })
            .collect()
    }

    /// Captured boxes, sorted by vertex.
    pub fn filled_boxes(&self) -> Vec<FilledBox> {
        self.grid
            .boxes()
            .filter_map(|b| {
                let player = self.owner[b]?;
                Some(FilledBox {
                    player,
                    corner: self.grid.vertex_to_point(b),
                })
            })
            .collect()
    }
}

impl Clone for Board {
    fn clone(&self) -> Self {
        Self {
            grid: self.grid,
            owner: self.owner.clone(),
            slot: self.slot.clone(),
            free: self.free.clone(),
            current: self.current,
            scores: self.scores,
            capturable: self.capturable,
            total_moves: self.total_moves,
        }
    }

    /// Refresh a shadow copy without reallocating its tables.
    fn clone_from(&mut self, source: &Self) {
        self.grid = source.grid;
        self.owner.clone_from(&source.owner);
        self.slot.clone_from(&source.slot);
        self.free.clone_from(&source.free);
        self.current = source.current;
        self.scores = source.scores;
        self.capturable = source.capturable;
        self.total_moves = source.total_moves;
    }
}

// ============================================================================
// TESTS
// ============================================================================
