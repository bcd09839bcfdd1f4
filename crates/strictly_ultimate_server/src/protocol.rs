//! Wire messages.
//!
//! Every message travels as one JSON object per line, tagged by its `type`
//! field:
//!
//! ```text
//! {"type":"introduce","name":"alice"}
//! {"type":"move","big":0,"small":4}
//! {"type":"error","message":"Not your turn (waiting for O)"}
//! ```

use serde::{Deserialize, Serialize};
use strictly_ultimate::{BoardSnapshot, Mark};

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join the session, or rename if already joined.
    Introduce {
        /// Display name shown to other participants.
        name: String,
    },
    /// Attempt a move.
    Move {
        /// Small board index (0-8).
        big: usize,
        /// Cell index inside the small board (0-8).
        small: usize,
    },
    /// End the session (first seat only).
    Shutdown,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for every seat to be filled.
    Lobby,
    /// All seats were filled; moves are accepted.
    InPlay,
    /// The macro board is won or tied.
    Decided,
    /// The session was shut down.
    Terminated,
}

/// One assigned seat and the name of whoever sits there now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct SeatView {
    /// The seat's mark.
    pub mark: Mark,
    /// Occupant's display name; `None` once the occupant disconnected.
    pub name: Option<String>,
}

/// Full game state broadcast after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Whose turn it is. Frozen once the game is decided.
    pub turn: Mark,
    /// Session lifecycle phase.
    pub phase: SessionPhase,
    /// Board state.
    pub board: BoardSnapshot,
    /// Seats needed before play starts.
    pub required_players: usize,
    /// Seats currently occupied by a live connection.
    pub connected_players: usize,
    /// Assigned seats in seating order.
    pub seats: Vec<SeatView>,
    /// Observer display names.
    pub observers: Vec<String>,
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when a connection joins.
    Assign {
        /// The seat mark, or `None` for observers.
        you_are: Option<Mark>,
        /// Seats needed before play starts.
        required_players: usize,
        /// Seats currently occupied.
        connected_players: usize,
        /// Assigned seats in seating order.
        seats: Vec<SeatView>,
        /// Observer display names.
        observers: Vec<String>,
    },
    /// Current game state.
    State(GameView),
    /// A request from this connection was rejected.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// The session ended.
    Shutdown,
}

impl ServerMessage {
    /// Builds an error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_client_move() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"move","big":3,"small":7}"#).unwrap();
        assert_eq!(msg, ClientMessage::Move { big: 3, small: 7 });
    }

    #[test]
    fn test_decodes_bare_shutdown() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"shutdown"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Shutdown);
    }

    #[test]
    fn test_rejects_negative_index() {
        let msg = serde_json::from_str::<ClientMessage>(r#"{"type":"move","big":-1,"small":0}"#);
        assert!(msg.is_err());
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"chat","text":"hi"}"#).is_err());
    }

    #[test]
    fn test_error_encoding() {
        let json = serde_json::to_string(&ServerMessage::error("Not your turn")).unwrap();
        assert_eq!(json, r#"{"type":"error","message":"Not your turn"}"#);
    }

    #[test]
    fn test_assign_for_observer_has_null_mark() {
        let msg = ServerMessage::Assign {
            you_are: None,
            required_players: 2,
            connected_players: 2,
            seats: vec![SeatView::new(Mark::X, Some("alice".into()))],
            observers: vec!["carol".into()],
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "assign");
        assert!(value["you_are"].is_null());
        assert_eq!(value["seats"][0]["mark"], "X");
    }
}
