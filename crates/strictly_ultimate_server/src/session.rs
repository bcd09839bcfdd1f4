//! Game session: seat roster, turn rotation and broadcast.
//!
//! One [`Session`] owns one board. Every mutation runs under a single mutex,
//! and the resulting state is queued to every participant before the lock is
//! released, so all participants observe the same sequence of states.

use crate::protocol::{GameView, SeatView, ServerMessage, SessionPhase};
use derive_more::{Display, Error, From};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use strictly_ultimate::{Mark, MoveError, Placement, Rules, SeatCount, UltimateBoard};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Identifier of one connection, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("#{}", _0)]
pub struct ParticipantId(pub u64);

/// Outbound queue to one connection.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// What a participant is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Bound to a seat for the rest of the session.
    Seated(Mark),
    /// Watches only.
    Observer,
}

impl Role {
    /// The seat mark, if seated.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Role::Seated(mark) => Some(mark),
            Role::Observer => None,
        }
    }
}

/// Seat count and rules a session is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_new::new)]
pub struct GameSettings {
    /// Seats needed before play starts.
    pub seats: SeatCount,
    /// Board rules.
    pub rules: Rules,
}

/// Why a session request was rejected. None of these alter session state.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// The connection is not attached to this session.
    #[display("Unknown participant {}", _0)]
    UnknownParticipant(#[error(not(source))] ParticipantId),

    /// The connection has not introduced itself yet.
    #[display("Introduce yourself before playing")]
    NotJoined,

    /// Display names must not be blank.
    #[display("Display name cannot be empty")]
    EmptyName,

    /// Observers cannot move.
    #[display("You are an observer")]
    NotASeat,

    /// Some seats are unfilled or vacated.
    #[display("Waiting for more players ({connected}/{required})")]
    NotEnoughPlayers {
        /// Seats currently occupied.
        connected: usize,
        /// Seats required.
        required: usize,
    },

    /// Another seat is due to move.
    #[display("Not your turn (waiting for {expected})")]
    OutOfTurn {
        /// The mark whose turn it is.
        expected: Mark,
    },

    /// The board refused the move.
    #[display("Illegal move: {}", _0)]
    #[from]
    IllegalMove(#[error(source)] MoveError),

    /// Only the first seat may end the session.
    #[display("Only the first seat can shut down the session")]
    UnauthorizedShutdown,

    /// The session has already been shut down.
    #[display("Session has been shut down")]
    Terminated,
}

#[derive(Debug)]
struct Seat {
    mark: Mark,
    occupant: Option<ParticipantId>,
}

#[derive(Debug)]
struct Connection {
    name: String,
    role: Option<Role>,
    outbound: Outbound,
}

#[derive(Debug)]
struct SessionState {
    board: UltimateBoard,
    /// Marks not yet handed out, in seating order.
    unassigned: VecDeque<Mark>,
    /// Marks handed out so far, in seating order.
    seats: Vec<Seat>,
    connections: BTreeMap<ParticipantId, Connection>,
    /// Index into the seating order.
    turn: usize,
    terminated: bool,
}

/// A single game shared by every connection task.
#[derive(Debug)]
pub struct Session {
    settings: GameSettings,
    seating_order: Vec<Mark>,
    state: Mutex<SessionState>,
    next_id: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
}

impl Session {
    /// Creates a session in the lobby phase.
    #[instrument]
    pub fn new(settings: GameSettings) -> Self {
        let seating_order = settings.seats.seating_order();
        info!(seats = ?seating_order, rules = %settings.rules, "Creating game session");
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(SessionState {
                board: UltimateBoard::new(settings.rules),
                unassigned: seating_order.iter().copied().collect(),
                seats: Vec::with_capacity(seating_order.len()),
                connections: BTreeMap::new(),
                turn: 0,
                terminated: false,
            }),
            settings,
            seating_order,
            next_id: AtomicU64::new(1),
            shutdown_tx,
        }
    }

    /// Settings this session was created with.
    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    /// Marks in the order seats are handed out.
    pub fn seating_order(&self) -> &[Mark] {
        &self.seating_order
    }

    /// Receiver that flips to `true` when the session shuts down.
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Registers a new connection. It receives nothing until it joins.
    #[instrument(skip(self, outbound))]
    pub fn attach(&self, outbound: Outbound) -> Result<ParticipantId, SessionError> {
        let mut state = self.lock();
        if state.terminated {
            return Err(SessionError::Terminated);
        }
        let id = ParticipantId(self.next_id.fetch_add(1, Ordering::Relaxed));
        state.connections.insert(
            id,
            Connection {
                name: String::new(),
                role: None,
                outbound,
            },
        );
        debug!(%id, "Connection attached");
        Ok(id)
    }

    /// Joins the game under `name`, or renames an already joined participant.
    ///
    /// The first joiners take seats in seating order; once every seat has
    /// been handed out, later joiners become observers.
    #[instrument(skip(self))]
    pub fn join(&self, id: ParticipantId, name: &str) -> Result<Role, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        let mut guard = self.lock();
        let state = &mut *guard;
        if state.terminated {
            return Err(SessionError::Terminated);
        }

        let connection = state
            .connections
            .get_mut(&id)
            .ok_or(SessionError::UnknownParticipant(id))?;
        connection.name = name.to_string();

        if let Some(role) = connection.role {
            info!(%id, name, ?role, "Participant renamed");
            self.broadcast(state);
            return Ok(role);
        }

        let role = match state.unassigned.pop_front() {
            Some(mark) => {
                state.seats.push(Seat {
                    mark,
                    occupant: Some(id),
                });
                info!(%id, name, %mark, "Assigned seat");
                Role::Seated(mark)
            }
            None => {
                info!(%id, name, "Joined as observer");
                Role::Observer
            }
        };
        connection.role = Some(role);

        let assign = ServerMessage::Assign {
            you_are: role.mark(),
            required_players: self.settings.seats.get(),
            connected_players: state.occupied_seats(),
            seats: state.seat_views(),
            observers: state.observer_names(),
        };
        if let Some(connection) = state.connections.get(&id) {
            let _ = connection.outbound.send(assign);
        }

        if state.seats.len() == self.seating_order.len() && role != Role::Observer {
            info!("All seats filled, game in play");
        }

        self.broadcast(state);
        Ok(role)
    }

    /// Attempts a move for participant `id`.
    ///
    /// On success the turn passes to the next seat in seating order, whether
    /// or not that seat currently has a live connection. The turn freezes once
    /// the game is decided.
    #[instrument(skip(self))]
    pub fn apply_move(
        &self,
        id: ParticipantId,
        big: usize,
        small: usize,
    ) -> Result<Placement, SessionError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.terminated {
            return Err(SessionError::Terminated);
        }

        let role = state
            .connections
            .get(&id)
            .ok_or(SessionError::UnknownParticipant(id))?
            .role
            .ok_or(SessionError::NotJoined)?;
        let mark = role.mark().ok_or(SessionError::NotASeat)?;

        let connected = state.occupied_seats();
        let required = self.settings.seats.get();
        if connected < required {
            return Err(SessionError::NotEnoughPlayers {
                connected,
                required,
            });
        }

        if state.board.is_decided() {
            return Err(SessionError::IllegalMove(MoveError::GameOver));
        }

        let expected = self.seating_order[state.turn];
        if mark != expected {
            warn!(%id, %mark, %expected, "Move out of turn");
            return Err(SessionError::OutOfTurn { expected });
        }

        let placement = state.board.apply(mark, big, small).inspect_err(|e| {
            warn!(%id, %mark, big, small, error = %e, "Illegal move");
        })?;

        if state.board.is_decided() {
            info!(outcome = ?state.board.status(), "Game decided\n{}", state.board);
        } else {
            state.turn = (state.turn + 1) % self.seating_order.len();
        }

        info!(%id, %placement, next = %self.seating_order[state.turn], "Move accepted");
        self.broadcast(state);
        Ok(placement)
    }

    /// Drops a connection. A seated participant's seat stays assigned and
    /// keeps its place in the turn rotation.
    #[instrument(skip(self))]
    pub fn remove(&self, id: ParticipantId) -> Option<Role> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let connection = state.connections.remove(&id)?;

        let role = connection.role;
        match role {
            Some(Role::Seated(mark)) => {
                if let Some(seat) = state.seats.iter_mut().find(|s| s.occupant == Some(id)) {
                    seat.occupant = None;
                }
                info!(%id, name = %connection.name, %mark, "Seated player left, seat vacated");
            }
            Some(Role::Observer) => info!(%id, name = %connection.name, "Observer left"),
            None => debug!(%id, "Connection left before joining"),
        }

        if role.is_some() && !state.terminated {
            self.broadcast(state);
        }
        role
    }

    /// Ends the session. Only the occupant of the first seat may do this.
    ///
    /// Every participant receives a shutdown notice and every outbound queue
    /// is closed.
    #[instrument(skip(self))]
    pub fn shutdown(&self, id: ParticipantId) -> Result<(), SessionError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.terminated {
            return Err(SessionError::Terminated);
        }

        let role = state
            .connections
            .get(&id)
            .ok_or(SessionError::UnknownParticipant(id))?
            .role
            .ok_or(SessionError::NotJoined)?;
        if role.mark() != self.seating_order.first().copied() {
            warn!(%id, ?role, "Unauthorized shutdown attempt");
            return Err(SessionError::UnauthorizedShutdown);
        }

        info!(%id, "Shutting down session");
        state.terminated = true;
        for connection in std::mem::take(&mut state.connections).into_values() {
            let _ = connection.outbound.send(ServerMessage::Shutdown);
        }
        for seat in &mut state.seats {
            seat.occupant = None;
        }
        self.shutdown_tx.send_replace(true);
        Ok(())
    }

    /// Current state as broadcast to participants.
    pub fn snapshot(&self) -> GameView {
        let state = self.lock();
        self.view(&state)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        let state = self.lock();
        self.phase_of(&state)
    }

    /// The mark due to move.
    pub fn current_turn(&self) -> Mark {
        let state = self.lock();
        self.seating_order[state.turn]
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn phase_of(&self, state: &SessionState) -> SessionPhase {
        if state.terminated {
            SessionPhase::Terminated
        } else if state.board.is_decided() {
            SessionPhase::Decided
        } else if state.seats.len() == self.seating_order.len() {
            SessionPhase::InPlay
        } else {
            SessionPhase::Lobby
        }
    }

    fn view(&self, state: &SessionState) -> GameView {
        GameView {
            turn: self.seating_order[state.turn],
            phase: self.phase_of(state),
            board: state.board.snapshot(),
            required_players: self.settings.seats.get(),
            connected_players: state.occupied_seats(),
            seats: state.seat_views(),
            observers: state.observer_names(),
        }
    }

    /// Queues the current state to every joined connection. Runs with the
    /// lock held so queued states follow mutation order.
    fn broadcast(&self, state: &SessionState) {
        let view = self.view(state);
        let mut delivered = 0;
        for (id, connection) in &state.connections {
            if connection.role.is_none() {
                continue;
            }
            match connection.outbound.send(ServerMessage::State(view.clone())) {
                Ok(()) => delivered += 1,
                Err(_) => debug!(%id, "Outbound queue closed, skipping"),
            }
        }
        debug!(delivered, phase = ?view.phase, "Broadcast state");
    }
}

impl SessionState {
    fn occupied_seats(&self) -> usize {
        self.seats.iter().filter(|s| s.occupant.is_some()).count()
    }

    fn seat_views(&self) -> Vec<SeatView> {
        self.seats
            .iter()
            .map(|seat| {
                let name = seat
                    .occupant
                    .and_then(|id| self.connections.get(&id))
                    .map(|c| c.name.clone());
                SeatView::new(seat.mark, name)
            })
            .collect()
    }

    fn observer_names(&self) -> Vec<String> {
        self.connections
            .values()
            .filter(|c| c.role == Some(Role::Observer))
            .map(|c| c.name.clone())
            .collect()
    }
}
