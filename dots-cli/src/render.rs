//! Text rendering of a board

use std::fmt::Write;

use dots_core::{Board, Player, TileType};

use crate::input::row_label;

/// Draw the board: column numbers across the top, row letters on dot rows,
/// drawn lines as `-` and `|`, and the owner of each captured box.
pub fn draw(board: &Board) -> String {
    let mut out = String::from("  ");
    for col in 0..board.dot_cols() {
        let _ = write!(out, "{} ", col % 10);
    }
    out.push('\n');

    for row in 0..board.rows() {
        if row % 2 == 1 {
            out.push_str("  ");
        } else {
            out.push(row_label(row / 2));
            out.push(' ');
        }

        for col in 0..board.cols() {
            let Some(vertex) = board.vertex_of(row, col) else {
                continue;
            };
            let cell = match board.tile(vertex) {
                TileType::Dot => '.',
                TileType::HorizontalGap => drawn(board.line_at(vertex), '-'),
                TileType::VerticalGap => drawn(board.line_at(vertex), '|'),
                TileType::Space => board.box_at(vertex).map_or(' ', player_letter),
            };
            out.push(cell);
        }
        out.push('\n');
    }

    out.push_str(&score_line(board));
    out.push('\n');
    out
}

pub fn score_line(board: &Board) -> String {
    format!(
        "Score: A {} - B {}",
        board.score(Player::A),
        board.score(Player::B)
    )
}

pub fn player_letter(player: Player) -> char {
    match player {
        Player::A => 'A',
        Player::B => 'B',
    }
}

fn drawn(owner: Option<Player>, glyph: char) -> char {
    if owner.is_some() {
        glyph
    } else {
        ' '
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_empty_board() {
        let board = Board::new(3, 3).unwrap();
        let expected = "  0 1 2 \n\
                        A . . .\n\
                        \x20      \n\
                        B . . .\n\
                        \x20      \n\
                        C . . .\n\
                        Score: A 0 - B 0\n";
        assert_eq!(draw(&board), expected);
    }

    #[test]
    fn test_draw_lines_and_capture() {
        let mut board = Board::new(3, 3).unwrap();
        // A: top, B: left, A: right, B: bottom closes the upper-left box
        for vertex in [1, 5, 7, 11] {
            board.apply_move(vertex);
        }

        let text = draw(&board);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "A .-. .");
        assert_eq!(lines[2], "  |B|  ");
        assert_eq!(lines[3], "B .-. .");
        assert_eq!(lines[6], "Score: A 0 - B 1");
    }
}
