//! Rules for ultimate tic-tac-toe.
//!
//! Pure functions over cell and board outcomes, kept apart from board
//! storage so both nesting levels can share them.

pub mod adjacency;
pub mod win;

pub use adjacency::{ADJACENT_PAIRS, adjacent_winner};
pub use win::{LINES, line_winner, three_in_line_winner};
