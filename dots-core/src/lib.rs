//! Dots-and-Boxes core
//!
//! This crate provides the game logic:
//! - Checkerboard grid geometry and dot-space translation
//! - Board state with O(1) capture detection
//! - Free-line list for O(1) uniform move sampling
//! - Early winner detection for fast simulations

pub mod grid;
pub mod board;

// Re-exports for convenient access
pub use grid::{Grid, Point, TileType, Vertex};
pub use board::{Board, BoardError, Edge, FilledBox, Player, MIN_DOTS};
