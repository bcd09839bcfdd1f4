//! The nested board state machine.

use crate::error::MoveError;
use crate::policy::{Rules, TiePolicy};
use crate::small_board::SmallBoard;
use crate::types::{BoardStatus, Mark, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// An accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Who moved.
    pub mark: Mark,
    /// Small board index (0-8).
    pub big: usize,
    /// Cell index inside the small board (0-8).
    pub small: usize,
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> board {}, cell {}", self.mark, self.big, self.small)
    }
}

/// Serializable view of the whole board, sent to every participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Cell marks per small board, row-major at both levels.
    pub grids: [[Option<Mark>; 9]; 9],
    /// Outcome of each small board.
    pub grid_status: [BoardStatus; 9],
    /// The board the next mover must play in, if constrained.
    pub next_forced: Option<usize>,
    /// Macro winner, if any.
    pub macro_winner: Option<Mark>,
    /// True when the macro board ended without a winner.
    pub macro_tied: bool,
}

impl BoardSnapshot {
    /// The macro outcome expressed as a status.
    pub fn macro_status(&self) -> BoardStatus {
        match (self.macro_winner, self.macro_tied) {
            (Some(mark), _) => BoardStatus::Won(mark),
            (None, true) => BoardStatus::Tied,
            (None, false) => BoardStatus::Open,
        }
    }
}

/// Ultimate tic-tac-toe engine.
///
/// Holds the nine small boards, the forced-board pointer and the macro
/// outcome. Turn order is not tracked here; callers pass the mark to play.
#[derive(Debug, Clone)]
pub struct UltimateBoard {
    boards: [SmallBoard; 9],
    forced: Option<usize>,
    status: BoardStatus,
    rules: Rules,
    history: Vec<Placement>,
}

impl UltimateBoard {
    /// Creates an empty board with the given rules.
    #[instrument]
    pub fn new(rules: Rules) -> Self {
        Self {
            boards: Default::default(),
            forced: None,
            status: BoardStatus::Open,
            rules,
            history: Vec::new(),
        }
    }

    /// The rules this board was created with.
    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Gets a small board by index.
    pub fn board(&self, big: usize) -> Option<&SmallBoard> {
        self.boards.get(big)
    }

    /// The board the next move must target, if any.
    pub fn forced(&self) -> Option<usize> {
        self.forced
    }

    /// Macro outcome.
    pub fn status(&self) -> BoardStatus {
        self.status
    }

    /// True once the macro board is won or tied.
    pub fn is_decided(&self) -> bool {
        self.status.is_decided()
    }

    /// Accepted moves in order.
    pub fn history(&self) -> &[Placement] {
        &self.history
    }

    /// Outcome of every small board.
    pub fn outcomes(&self) -> [BoardStatus; 9] {
        std::array::from_fn(|i| self.boards[i].status())
    }

    /// Checks a move without applying it.
    pub fn validate(&self, big: usize, small: usize) -> Result<(), MoveError> {
        if self.is_decided() {
            return Err(MoveError::GameOver);
        }

        if big >= 9 || small >= 9 {
            return Err(MoveError::OutOfRange { big, small });
        }

        // A forced board that has since closed no longer constrains the move.
        if let Some(required) = self.forced
            && self.boards[required].status().is_open()
            && big != required
        {
            return Err(MoveError::WrongBoard {
                required,
                attempted: big,
            });
        }

        let target = &self.boards[big];
        if target.status().is_decided() {
            return Err(MoveError::BoardClosed(big));
        }
        if !target.is_empty(small) {
            return Err(MoveError::SquareOccupied { big, small });
        }

        Ok(())
    }

    /// Places `mark` at cell `small` of board `big`.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveError`] and leaves the board untouched when the move is
    /// illegal.
    #[instrument(skip(self), fields(forced = ?self.forced))]
    pub fn apply(&mut self, mark: Mark, big: usize, small: usize) -> Result<Placement, MoveError> {
        self.validate(big, small)?;

        let outcome = self.boards[big].place(mark, small);
        match outcome {
            BoardStatus::Won(winner) => info!(big, %winner, "Small board won"),
            BoardStatus::Tied if self.rules.tie == TiePolicy::Reset => {
                info!(big, "Small board tied, resetting");
                self.boards[big].clear();
            }
            BoardStatus::Tied => info!(big, "Small board tied"),
            BoardStatus::Open => {}
        }

        self.forced = self.boards[small].status().is_open().then_some(small);

        let placement = Placement { mark, big, small };
        self.history.push(placement);
        self.update_status();

        debug!(
            next_forced = ?self.forced,
            status = ?self.status,
            moves = self.history.len(),
            "Move applied"
        );
        Ok(placement)
    }

    /// Every move [`UltimateBoard::apply`] would currently accept.
    pub fn legal_moves(&self) -> Vec<(usize, usize)> {
        (0..9)
            .flat_map(|big| (0..9).map(move |small| (big, small)))
            .filter(|&(big, small)| self.validate(big, small).is_ok())
            .collect()
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            grids: std::array::from_fn(|big| {
                let squares = self.boards[big].squares();
                std::array::from_fn(|small| squares[small].mark())
            }),
            grid_status: self.outcomes(),
            next_forced: self.forced,
            macro_winner: self.status.winner(),
            macro_tied: self.status == BoardStatus::Tied,
        }
    }

    fn update_status(&mut self) {
        let outcomes = self.outcomes();
        self.status = if let Some(winner) = self.rules.win.winner(&outcomes) {
            info!(%winner, policy = %self.rules.win, "Macro board won");
            BoardStatus::Won(winner)
        } else if outcomes.iter().all(|s| s.is_decided()) {
            info!("Macro board tied");
            BoardStatus::Tied
        } else {
            BoardStatus::Open
        };

        if self.is_decided() {
            self.forced = None;
        }
    }
}

impl Default for UltimateBoard {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

impl std::fmt::Display for UltimateBoard {
    /// Renders the 9x9 grid with decided boards filled by their outcome.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..9 {
            if row > 0 && row % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            let mut line = String::new();
            for col in 0..9 {
                if col > 0 && col % 3 == 0 {
                    line.push_str("| ");
                }
                let big = (row / 3) * 3 + col / 3;
                let small = (row % 3) * 3 + col % 3;
                let board = &self.boards[big];
                let symbol = match (board.status(), board.squares()[small]) {
                    (BoardStatus::Won(mark), _) => mark.to_string().to_lowercase(),
                    (BoardStatus::Tied, _) => "#".to_string(),
                    (BoardStatus::Open, Square::Occupied(mark)) => mark.to_string(),
                    (BoardStatus::Open, Square::Empty) => ".".to_string(),
                };
                line.push_str(&symbol);
                line.push(' ');
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
