//! Three-in-a-line detection.

use crate::types::{BoardStatus, Mark, Square};
use tracing::instrument;

/// The eight winning lines of a 3x3 grid, indices in row-major order.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the mark holding a complete line of cells, if any.
#[instrument(level = "trace")]
pub fn line_winner(squares: &[Square; 9]) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match squares[a] {
        Square::Occupied(mark) if squares[b] == squares[a] && squares[c] == squares[a] => {
            Some(mark)
        }
        _ => None,
    })
}

/// Classic macro rule: three small boards won by the same mark along a line.
///
/// Tied boards never count toward a line.
#[instrument(level = "trace")]
pub fn three_in_line_winner(outcomes: &[BoardStatus; 9]) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| {
        let mark = outcomes[a].winner()?;
        (outcomes[b].winner() == Some(mark) && outcomes[c].winner() == Some(mark)).then_some(mark)
    })
}
