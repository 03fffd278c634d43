//! Parsing of typed moves
//!
//! A move names two dots as `<row letter><column>`, for example `a0a1` or
//! `B2 C2`. Rows are case-insensitive; whitespace is ignored.

use dots_core::Point;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Invalid input.")]
    Malformed,
    #[error("Invalid row.")]
    InvalidRow,
}

/// Parse two dot-space points from a line of user input.
pub fn parse_edge(text: &str) -> Result<(Point, Point), InputError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut rest = compact.as_str();

    let p1 = parse_point(&mut rest)?;
    let p2 = parse_point(&mut rest)?;
    if !rest.is_empty() {
        return Err(InputError::Malformed);
    }
    Ok((p1, p2))
}

fn parse_point(rest: &mut &str) -> Result<Point, InputError> {
    let mut chars = rest.chars();
    let row_char = chars.next().ok_or(InputError::Malformed)?;
    let y = row_index(row_char)?;

    let after_row = chars.as_str();
    let digits = after_row
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_row.len());
    if digits == 0 {
        return Err(InputError::Malformed);
    }

    let x = after_row[..digits]
        .parse()
        .map_err(|_| InputError::Malformed)?;
    *rest = &after_row[digits..];
    Ok(Point::new(x, y))
}

fn row_index(c: char) -> Result<usize, InputError> {
    match c {
        'a'..='z' => Ok(c as usize - 'a' as usize),
        'A'..='Z' => Ok(c as usize - 'A' as usize),
        _ if c.is_ascii_digit() => Err(InputError::Malformed),
        _ => Err(InputError::InvalidRow),
    }
}

/// Row label for a dot row, as shown by the renderer.
pub fn row_label(y: usize) -> char {
    (b'A' + (y % 26) as u8) as char
}

/// Format an edge the way it would be typed.
pub fn format_edge(p1: Point, p2: Point) -> String {
    format!("{}{}{}{}", row_label(p1.y), p1.x, row_label(p2.y), p2.x)
}
