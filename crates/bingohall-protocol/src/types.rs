//! Identity types and the event vocabulary.
//!
//! Events are internally tagged (`{"event": "call-number", ...}`) with
//! kebab-case tags, which is what the UI collaborators on the other side
//! of the socket expect.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's identity within a room.
///
/// Assigned sequentially in join order, starting at 1. Only unique within
/// its room — two rooms can both have a `P-1`. The core never owns the
/// underlying connection, just this id and its room association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A 4-character room code: uppercase ASCII letters and digits.
///
/// Codes arriving from clients are normalized to uppercase, so `ab12`
/// and `AB12` name the same room. Parsing rejects anything that is not
/// exactly four alphanumeric ASCII characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Number of characters in a room code.
    pub const LEN: usize = 4;

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ProtocolError::InvalidRoomCode(s.to_string()));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Everything a client can send to the server.
///
/// The first event on a fresh connection must be `register-host` or
/// `register-player`; the server rejects anything else until the
/// connection has a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Create a room and attach as its host. When `room_code` is omitted
    /// the server generates one.
    RegisterHost { room_code: Option<RoomCode> },

    /// Join an existing room as a player. The reply carries the assigned
    /// [`PlayerId`].
    RegisterPlayer { room_code: RoomCode },

    /// Host only: move the session from lobby to in-progress.
    StartGame,

    /// Host only: ask the server to draw the next number. The number
    /// itself is produced server-side — clients never supply it.
    CallNumber,

    /// Player only: claim a win. The claimant's identity is taken from
    /// the connection, not from the payload.
    PlayerWin { room_code: RoomCode },
}

/// Everything the server can send to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Reply to `register-host`: the room exists and you are its host.
    HostRegistered { room_code: RoomCode },

    /// Reply to `register-player`: you are in, here is your identity.
    Registered {
        room_code: RoomCode,
        player_id: PlayerId,
    },

    /// Sent to the host whenever the lobby population changes.
    PlayerJoined { count: usize },

    /// Sent to a player who joins mid-game: every number drawn so far,
    /// in draw order.
    CalledHistory { numbers: Vec<u8> },

    /// The session left the lobby.
    GameStarted,

    /// An authoritative draw, fanned out to the host and every player.
    CallNumber { number: u8, room_code: RoomCode },

    /// The session finished. `winner` is `None` when all 75 numbers were
    /// drawn without a claim.
    GameOver { winner: Option<PlayerId> },

    /// The host left; the room and its session are gone.
    RoomClosed,

    /// A rejected operation, reported back to the client that sent it.
    Error { message: String },
}
