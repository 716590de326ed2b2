//! Error types for the room layer.
//!
//! Every variant is recoverable at the caller: a rejected start, draw,
//! or claim leaves the session state untouched and is reported back to
//! the client as a user-facing message.

use bingohall_game::GameError;
use bingohall_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No active room is registered under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// A second host tried to register a room that already has one.
    #[error("room {0} already has a host")]
    InvalidRole(RoomCode),

    /// The session is in a state that forbids this operation — starting
    /// twice, drawing before start, claiming after the game finished.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The claimed identity is not a member of this room.
    #[error("player {0} is not in room {1}")]
    NotInRoom(PlayerId, RoomCode),

    /// The room's command channel is closed or full (room shutting down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// An error surfaced from the game logic (e.g. draw exhaustion when
    /// misused).
    #[error(transparent)]
    Game(#[from] GameError),
}
