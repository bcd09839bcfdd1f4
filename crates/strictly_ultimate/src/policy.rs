//! Rule variants selected when a game is created.

use crate::rules::{adjacent_winner, three_in_line_winner};
use crate::types::{BoardStatus, Mark};
use serde::{Deserialize, Serialize};

/// How the macro board is won.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WinPolicy {
    /// Two neighbouring small boards won by the same mark.
    #[default]
    AdjacentPair,
    /// Three small boards won by the same mark along a row, column or diagonal.
    ThreeInLine,
}

impl WinPolicy {
    /// Applies this policy to the nine small-board outcomes.
    pub fn winner(self, outcomes: &[BoardStatus; 9]) -> Option<Mark> {
        match self {
            WinPolicy::AdjacentPair => adjacent_winner(outcomes),
            WinPolicy::ThreeInLine => three_in_line_winner(outcomes),
        }
    }
}

/// What happens to a small board that fills up without a winner.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TiePolicy {
    /// The board stays tied and frozen.
    #[default]
    Freeze,
    /// The board is wiped and reopened for play.
    Reset,
}

/// The full rule set for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rules {
    /// Macro win rule.
    pub win: WinPolicy,
    /// Small-board tie rule.
    pub tie: TiePolicy,
}

impl Rules {
    /// Creates a rule set.
    pub fn new(win: WinPolicy, tie: TiePolicy) -> Self {
        Self { win, tie }
    }
}

impl std::fmt::Display for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "win={}, tie={}", self.win, self.tie)
    }
}
