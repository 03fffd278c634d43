//! Checkerboard grid geometry
//!
//! A board of `N x M` dots is stored as a `(2N-1) x (2M-1)` grid, linearized
//! row-major:
//!
//! ```text
//!   .-.-.        |.|X|.|X|.|
//!   | | |        |X|O|X|O|X|
//!   .-.-.   =>   |.|X|.|X|.|
//!   | | |        |X|O|X|O|X|
//!   .-.-.        |.|X|.|X|.|
//! ```
//!
//! `X` cells are lines, `O` cells are boxes and `.` cells are dots. Because the
//! column count is always odd, a vertex is a line exactly when its linear index
//! is odd, and each box is surrounded by the four lines directly above, below,
//! left and right of it.

use serde::{Deserialize, Serialize};

/// Index into the linearized checkerboard grid.
pub type Vertex = usize;

/// A point in dot space. `x` is the dot column, `y` the dot row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Visual classification of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileType {
    /// A dot on the visual grid.
    Dot,
    /// Horizontal gap between two dots in the same dot row.
    HorizontalGap,
    /// Vertical gap between two dots in the same dot column.
    VerticalGap,
    /// Space surrounded by four gaps.
    Space,
}

/// Dimensions of the checkerboard and the arithmetic on its vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Grid for `dot_rows x dot_cols` dots.
    pub fn for_dots(dot_rows: usize, dot_cols: usize) -> Self {
        Self {
            rows: dot_rows * 2 - 1,
            cols: dot_cols * 2 - 1,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dot_rows(&self) -> usize {
        (self.rows + 1) / 2
    }

    pub fn dot_cols(&self) -> usize {
        (self.cols + 1) / 2
    }

    /// Total number of cells.
    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, vertex: Vertex) -> bool {
        vertex < self.area()
    }

    // ========================================================================
    // COORDINATES
    // ========================================================================

    /// Vertex at (`row`, `col`), or `None` outside the grid.
    pub fn vertex_of(&self, row: usize, col: usize) -> Option<Vertex> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row * self.cols + col)
    }

    pub fn row(&self, vertex: Vertex) -> usize {
        assert!(self.contains(vertex), "vertex {} out of range", vertex);
        vertex / self.cols
    }

    pub fn col(&self, vertex: Vertex) -> usize {
        assert!(self.contains(vertex), "vertex {} out of range", vertex);
        vertex % self.cols
    }

    /// Every other vertex starting from 1 is a line.
    pub fn is_line(vertex: Vertex) -> bool {
        vertex & 1 == 1
    }

    pub fn tile(&self, vertex: Vertex) -> TileType {
        let row = self.row(vertex);
        if Self::is_line(vertex) {
            if row % 2 == 1 {
                TileType::VerticalGap
            } else {
                TileType::HorizontalGap
            }
        } else if row % 2 == 0 {
            TileType::Dot
        } else {
            TileType::Space
        }
    }

    /// Iterate over all line vertices in ascending order.
    pub fn lines(&self) -> impl Iterator<Item = Vertex> {
        (1..self.area()).step_by(2)
    }

    /// Iterate over all box vertices in ascending order.
    pub fn boxes(&self) -> impl Iterator<Item = Vertex> + '_ {
        (0..self.area())
            .step_by(2)
            .filter(move |&v| self.tile(v) == TileType::Space)
    }

    // ========================================================================
    // ADJACENCY
    // ========================================================================

    /// The boxes bordered by a line: left/right for vertical lines, up/down
    /// for horizontal ones. Sides beyond the grid edge are `None`.
    pub fn adjacent_boxes(&self, line: Vertex) -> [Option<Vertex>; 2] {
        debug_assert!(Self::is_line(line));
        let row = self.row(line);
        let col = self.col(line);

        if row % 2 == 1 {
            [
                (col > 0).then(|| line - 1),
                (col + 1 < self.cols).then(|| line + 1),
            ]
        } else {
            [
                (row > 0).then(|| line - self.cols),
                (row + 1 < self.rows).then(|| line + self.cols),
            ]
        }
    }

    // ========================================================================
    // DOT-SPACE TRANSLATION
    // ========================================================================

    /// Upper-left dot of a cell.
    pub fn vertex_to_point(&self, vertex: Vertex) -> Point {
        Point::new(self.col(vertex) / 2, self.row(vertex) / 2)
    }

    /// The two dots joined by a line, upper/left endpoint first.
    pub fn vertex_to_edge(&self, line: Vertex) -> (Point, Point) {
        assert!(Self::is_line(line), "vertex {} is not a line", line);
        let p1 = self.vertex_to_point(line);

        // Even rows hold horizontal lines, odd rows vertical ones.
        let p2 = if self.row(line) % 2 == 0 {
            Point::new(p1.x + 1, p1.y)
        } else {
            Point::new(p1.x, p1.y + 1)
        };
        (p1, p2)
    }

    fn contains_point(&self, p: Point) -> bool {
        p.x < self.dot_cols() && p.y < self.dot_rows()
    }

    /// The line joining two adjacent dots, in either order.
    pub fn edge_to_vertex(&self, a: Point, b: Point) -> Option<Vertex> {
        let (p1, p2) = if a <= b { (a, b) } else { (b, a) };
        if !self.contains_point(p1) || !self.contains_point(p2) {
            return None;
        }

        if p1.x == p2.x && p1.y + 1 == p2.y {
            return self.vertex_of(p1.y * 2 + 1, p1.x * 2);
        }
        if p1.y == p2.y && p1.x + 1 == p2.x {
            return self.vertex_of(p1.y * 2, p1.x * 2 + 1);
        }
        None
    }
}
