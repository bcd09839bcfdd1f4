//! Core domain types for ultimate tic-tac-toe.

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

/// A player token.
///
/// Marks are handed out in declaration order: two-seat games use
/// `X` and `O`, three-seat games add `Z`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    EnumIter,
)]
pub enum Mark {
    /// First seat.
    X,
    /// Second seat.
    O,
    /// Third seat (three-seat games only).
    Z,
}

/// Number of seats a game needs before play starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum SeatCount {
    /// Two seated players, marks `X` and `O`.
    #[default]
    Two,
    /// Three seated players, marks `X`, `O` and `Z`.
    Three,
}

/// Returned when a seat count other than 2 or 3 is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("Only 2 or 3 seats are supported, got {}", requested)]
pub struct UnsupportedSeatCount {
    /// The rejected value.
    pub requested: u8,
}

/// Returned when seat-count text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum ParseSeatCountError {
    /// The text is not a number.
    #[display("Seat count must be 2 or 3, got {input:?}")]
    NotANumber {
        /// The rejected text.
        input: String,
    },
    /// The number is not a supported seat count.
    #[display("{_0}")]
    #[from]
    Unsupported(UnsupportedSeatCount),
}

impl SeatCount {
    /// Number of seats as an integer.
    pub fn get(self) -> usize {
        match self {
            SeatCount::Two => 2,
            SeatCount::Three => 3,
        }
    }

    /// The fixed order in which marks are assigned to joining players.
    pub fn seating_order(self) -> Vec<Mark> {
        Mark::iter().take(self.get()).collect()
    }
}

impl TryFrom<u8> for SeatCount {
    type Error = UnsupportedSeatCount;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(SeatCount::Two),
            3 => Ok(SeatCount::Three),
            requested => Err(UnsupportedSeatCount { requested }),
        }
    }
}

impl From<SeatCount> for u8 {
    fn from(count: SeatCount) -> Self {
        count.get() as u8
    }
}

impl std::str::FromStr for SeatCount {
    type Err = ParseSeatCountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Ok(requested) = s.trim().parse::<u8>() else {
            return Err(ParseSeatCountError::NotANumber {
                input: s.to_string(),
            });
        };
        Ok(SeatCount::try_from(requested)?)
    }
}

impl std::fmt::Display for SeatCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// A single cell on a small board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Square {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell claimed by a mark.
    Occupied(Mark),
}

impl Square {
    /// Returns the occupying mark, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Square::Empty => None,
            Square::Occupied(mark) => Some(mark),
        }
    }
}

/// Outcome of a small board or of the macro board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoardStatus {
    /// Still playable.
    #[default]
    Open,
    /// Claimed by a mark.
    Won(Mark),
    /// Filled (or exhausted) without a winner.
    Tied,
}

impl BoardStatus {
    /// True while moves may still land here.
    pub fn is_open(self) -> bool {
        matches!(self, BoardStatus::Open)
    }

    /// True once won or tied.
    pub fn is_decided(self) -> bool {
        !self.is_open()
    }

    /// The winning mark, if any.
    pub fn winner(self) -> Option<Mark> {
        match self {
            BoardStatus::Won(mark) => Some(mark),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seating_order_two() {
        assert_eq!(SeatCount::Two.seating_order(), vec![Mark::X, Mark::O]);
    }

    #[test]
    fn test_seating_order_three() {
        assert_eq!(
            SeatCount::Three.seating_order(),
            vec![Mark::X, Mark::O, Mark::Z]
        );
    }

    #[test]
    fn test_seat_count_rejects_four() {
        assert_eq!(
            SeatCount::try_from(4),
            Err(UnsupportedSeatCount { requested: 4 })
        );
        assert_eq!("3".parse::<SeatCount>(), Ok(SeatCount::Three));
        assert_eq!(
            "1".parse::<SeatCount>(),
            Err(ParseSeatCountError::Unsupported(UnsupportedSeatCount {
                requested: 1
            }))
        );
    }

    #[test]
    fn test_seat_count_reports_unparsable_text() {
        let err = "abc".parse::<SeatCount>().unwrap_err();
        assert_eq!(
            err,
            ParseSeatCountError::NotANumber {
                input: "abc".to_string()
            }
        );
        assert_eq!(err.to_string(), r#"Seat count must be 2 or 3, got "abc""#);
        assert_eq!(
            "7".parse::<SeatCount>().unwrap_err().to_string(),
            "Only 2 or 3 seats are supported, got 7"
        );
    }

    #[test]
    fn test_mark_parses_from_name() {
        assert_eq!("Z".parse::<Mark>().ok(), Some(Mark::Z));
        assert_eq!(Mark::O.to_string(), "O");
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let won = serde_json::to_string(&BoardStatus::Won(Mark::X)).unwrap();
        assert_eq!(won, r#"{"won":"X"}"#);
        let open = serde_json::to_string(&BoardStatus::Open).unwrap();
        assert_eq!(open, r#""open""#);
    }
}
