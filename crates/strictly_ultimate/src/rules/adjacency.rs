//! Two-adjacent-boards macro rule.
//!
//! Grid indices:
//!
//! ```text
//! 0 1 2
//! 3 4 5
//! 6 7 8
//! ```

use crate::types::{BoardStatus, Mark};
use tracing::instrument;

/// Every pair of neighbouring boards along a row, column or diagonal through
/// the centre.
pub const ADJACENT_PAIRS: [(usize, usize); 16] = [
    // Rows
    (0, 1),
    (1, 2),
    (3, 4),
    (4, 5),
    (6, 7),
    (7, 8),
    // Columns
    (0, 3),
    (3, 6),
    (1, 4),
    (4, 7),
    (2, 5),
    (5, 8),
    // Diagonals through the centre
    (0, 4),
    (4, 8),
    (2, 4),
    (4, 6),
];

/// Returns the mark that owns two adjacent won boards, if any.
#[instrument(level = "trace")]
pub fn adjacent_winner(outcomes: &[BoardStatus; 9]) -> Option<Mark> {
    ADJACENT_PAIRS.iter().find_map(|&(a, b)| {
        let mark = outcomes[a].winner()?;
        (outcomes[b].winner() == Some(mark)).then_some(mark)
    })
}
