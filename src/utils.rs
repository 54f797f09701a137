use crate::engine::{Board, Cell, GameError};

/// Parses an array of string slices into a `Board` object.
///
/// Each string slice in the input array represents a row on the board,
/// starting from row 0. The board width is taken from the first row; any
/// following row may be shorter (the rest of that row is filled with
/// `Cell::Empty`) but never longer.
///
/// Valid characters for cells are:
/// - '1' through '9': `Cell::Digit`
/// - '0': `Cell::Cleared`
/// - '.': `Cell::Empty`
///
/// Any other character will result in an error.
///
/// The returned board is exactly the grid described, with no normalization
/// applied, which makes this the right entry point for setting up
/// mid-game positions.
///
/// # Arguments
/// * `s`: A slice of string slices (`&[&str]`) representing the rows of the
///   board, starting from the top (row 0).
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(GameError::InvalidInput)` if:
///     - `s` is empty or its first row has no characters.
///     - Any row is longer than the first row.
///     - An unrecognized character is encountered.
///
/// # Examples
/// ```
/// use tenpair_solver::engine::Cell;
/// use tenpair_solver::utils::board_from_rows;
///
/// let board = board_from_rows(&[
///     "53.", // Row 0
///     "9",   // Row 1, padded with empties
/// ])
/// .unwrap();
/// assert_eq!(board.get_cell(0, 0), Cell::Digit(5));
/// assert_eq!(board.get_cell(0, 2), Cell::Empty);
/// assert_eq!(board.get_cell(1, 0), Cell::Digit(9));
/// assert_eq!(board.get_cell(1, 1), Cell::Empty);
///
/// assert!(board_from_rows(&["5x3"]).is_err());
/// ```
pub fn board_from_rows(s: &[&str]) -> Result<Board, GameError> {
    let width = match s.first() {
        Some(first) => first.chars().count(),
        None => {
            return Err(GameError::InvalidInput(
                "at least one row is required".to_string(),
            ))
        }
    };
    if width == 0 {
        return Err(GameError::InvalidInput("row 0 is empty".to_string()));
    }

    let mut rows = Vec::with_capacity(s.len());
    for (r, row_str) in s.iter().enumerate() {
        // The first row fixes the width for the whole grid.
        if row_str.chars().count() > width {
            return Err(GameError::InvalidInput(format!(
                "row {} is too long: expected at most {} characters, found {}",
                r,
                width,
                row_str.chars().count()
            )));
        }

        let mut row = Vec::with_capacity(width);
        for (c, ch) in row_str.chars().enumerate() {
            row.push(match ch {
                '.' => Cell::Empty,
                '0' => Cell::Cleared,
                '1'..='9' => Cell::Digit(ch as u8 - b'0'),
                _ => {
                    return Err(GameError::InvalidInput(format!(
                        "unrecognized character '{}' in row {} col {}",
                        ch, r, c
                    )))
                }
            });
        }
        rows.push(row);
    }
    Ok(Board::from_rows(rows, width))
}

/// Strips all whitespace out of puzzle text.
///
/// Puzzle files and pasted boards are usually laid out in rows; the digit
/// sequence fed to `GameState::from_digits` is the concatenation of those
/// rows with the layout removed.
///
/// # Examples
/// ```
/// use tenpair_solver::utils::digits_from_text;
///
/// assert_eq!(digits_from_text("531\n9 2\n"), "53192");
/// ```
pub fn digits_from_text(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_rows_valid() {
        let board_str = ["123456789", "987054321"];
        let board = board_from_rows(&board_str).unwrap();
        assert_eq!(board.width(), 9);
        assert_eq!(board.row_count(), 2);
        assert_eq!(board.get_cell(0, 0), Cell::Digit(1));
        assert_eq!(board.get_cell(1, 3), Cell::Cleared);
        assert_eq!(board.get_cell(1, 8), Cell::Digit(1));
    }

    #[test]
    fn test_board_from_rows_pads_short_rows() {
        let board = board_from_rows(&["519", "3"]).unwrap();
        assert_eq!(board.get_cell(1, 0), Cell::Digit(3));
        assert_eq!(board.get_cell(1, 1), Cell::Empty);
        assert_eq!(board.get_cell(1, 2), Cell::Empty);
    }

    #[test]
    fn test_board_from_rows_invalid_char() {
        let result = board_from_rows(&["53x19"]);
        match result {
            Err(GameError::InvalidInput(msg)) => {
                assert!(msg.contains("unrecognized character 'x'"), "message was: {}", msg);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_board_from_rows_with_spaces() {
        // Whitespace is not transparent here; strip it first.
        let result = board_from_rows(&["5 3"]);
        match result {
            Err(GameError::InvalidInput(msg)) => {
                assert!(msg.contains("unrecognized character ' '"), "message was: {}", msg);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_board_from_rows_row_too_long() {
        let result = board_from_rows(&["531", "9124"]);
        match result {
            Err(GameError::InvalidInput(msg)) => {
                assert!(msg.contains("row 1 is too long"), "message was: {}", msg);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_board_from_rows_empty_input() {
        let board_str: [&str; 0] = [];
        assert!(board_from_rows(&board_str).is_err());
    }

    #[test]
    fn test_digits_from_text_strips_whitespace() {
        assert_eq!(digits_from_text("123\r\n456\t7 8\n"), "12345678");
        assert_eq!(digits_from_text(""), "");
    }
}
