//! Strictly Ultimate - pure ultimate tic-tac-toe game logic.
//!
//! Nine 3x3 small boards arranged in a 3x3 macro board. The cell a player
//! picks decides which small board the next player is forced into. A small
//! board is won with three in a line; the macro board is won according to a
//! configurable [`WinPolicy`].
//!
//! This crate has no I/O and no notion of turns or connections; the server
//! crate layers sessions on top of [`UltimateBoard`].
//!
//! # Example
//!
//! ```
//! use strictly_ultimate::{Mark, Rules, UltimateBoard};
//!
//! let mut board = UltimateBoard::new(Rules::default());
//! board.apply(Mark::X, 0, 4).unwrap();
//! assert_eq!(board.forced(), Some(4));
//! assert!(board.apply(Mark::O, 0, 0).is_err());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod error;
mod policy;
pub mod rules;
mod small_board;
mod types;

pub use engine::{BoardSnapshot, Placement, UltimateBoard};
pub use error::MoveError;
pub use policy::{Rules, TiePolicy, WinPolicy};
pub use small_board::SmallBoard;
pub use types::{
    BoardStatus, Mark, ParseSeatCountError, SeatCount, Square, UnsupportedSeatCount,
};
