//! Move rejection reasons.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Why the engine refused a move. A rejected move never changes the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Error, Serialize, Deserialize)]
pub enum MoveError {
    /// The macro board is already won or tied.
    #[display("Game is already over")]
    GameOver,

    /// One of the indices is outside 0..=8.
    #[display("Move ({big}, {small}) is out of range (indices must be 0-8)")]
    OutOfRange {
        /// Requested small board.
        big: usize,
        /// Requested cell.
        small: usize,
    },

    /// The previous move forces play into another board.
    #[display("You must play in board {required}, not board {attempted}")]
    WrongBoard {
        /// The forced board.
        required: usize,
        /// The board the move targeted.
        attempted: usize,
    },

    /// The targeted small board is already won or tied.
    #[display("Board {_0} is already decided")]
    BoardClosed(#[error(not(source))] usize),

    /// The targeted cell already holds a mark.
    #[display("Cell {small} of board {big} is already occupied")]
    SquareOccupied {
        /// Targeted small board.
        big: usize,
        /// Targeted cell.
        small: usize,
    },
}
