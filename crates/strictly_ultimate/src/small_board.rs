//! A single 3x3 sub-board.

use crate::rules::line_winner;
use crate::types::{BoardStatus, Mark, Square};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// One of the nine sub-boards.
///
/// Cells freeze once the board is won or tied; only [`SmallBoard::clear`]
/// reopens a board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SmallBoard {
    squares: [Square; 9],
    status: BoardStatus,
}

impl SmallBoard {
    /// Creates an empty, open board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the square at the given cell (0-8).
    pub fn get(&self, cell: usize) -> Option<Square> {
        self.squares.get(cell).copied()
    }

    /// Returns all squares in row-major order.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Current outcome of this board.
    pub fn status(&self) -> BoardStatus {
        self.status
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, cell: usize) -> bool {
        matches!(self.get(cell), Some(Square::Empty))
    }

    /// Checks if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// Writes a mark and recomputes the status.
    ///
    /// Callers must have checked that the board is open and the cell empty.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn place(&mut self, mark: Mark, cell: usize) -> BoardStatus {
        debug_assert!(self.status.is_open());
        debug_assert!(self.is_empty(cell));
        self.squares[cell] = Square::Occupied(mark);
        self.update_status();
        self.status
    }

    /// Wipes every cell and reopens the board.
    pub(crate) fn clear(&mut self) {
        trace!("Clearing small board");
        *self = Self::new();
    }

    fn update_status(&mut self) {
        if let Some(winner) = line_winner(&self.squares) {
            self.status = BoardStatus::Won(winner);
        } else if self.is_full() {
            self.status = BoardStatus::Tied;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_open_and_empty() {
        let board = SmallBoard::new();
        assert_eq!(board.status(), BoardStatus::Open);
        assert!((0..9).all(|c| board.is_empty(c)));
        assert_eq!(board.get(9), None);
    }

    #[test]
    fn test_column_win() {
        let mut board = SmallBoard::new();
        board.place(Mark::O, 1);
        board.place(Mark::O, 4);
        assert_eq!(board.place(Mark::O, 7), BoardStatus::Won(Mark::O));
    }

    #[test]
    fn test_full_board_without_line_ties() {
        // X O X / X O O / O X X
        #[rustfmt::skip]
        let layout = [
            Mark::X, Mark::O, Mark::X,
            Mark::X, Mark::O, Mark::O,
            Mark::O, Mark::X, Mark::X,
        ];
        let mut board = SmallBoard::new();
        for (cell, mark) in layout.into_iter().enumerate() {
            board.place(mark, cell);
        }
        assert_eq!(board.status(), BoardStatus::Tied);
    }

    #[test]
    fn test_win_on_last_cell_is_not_a_tie() {
        // X O X / O O X / O X X  (X completes the right column last)
        #[rustfmt::skip]
        let moves = [
            (Mark::X, 0), (Mark::O, 1), (Mark::X, 2),
            (Mark::O, 3), (Mark::O, 4), (Mark::X, 5),
            (Mark::O, 6), (Mark::X, 7), (Mark::X, 8),
        ];
        let mut board = SmallBoard::new();
        for (mark, cell) in moves {
            board.place(mark, cell);
        }
        assert_eq!(board.status(), BoardStatus::Won(Mark::X));
    }

    #[test]
    fn test_clear_reopens() {
        let mut board = SmallBoard::new();
        board.place(Mark::Z, 0);
        board.clear();
        assert_eq!(board, SmallBoard::new());
    }
}
