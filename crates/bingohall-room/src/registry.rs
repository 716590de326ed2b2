//! The room registry: maps room codes to running room actors.

use std::collections::HashMap;

use bingohall_protocol::RoomCode;
use rand::Rng;
use tokio::sync::mpsc;

use crate::room::{EventSender, RoomEvent, RoomHandle, spawn_room};
use crate::RoomError;

/// Alphabet for generated room codes.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Command channel depth for each room actor.
const ROOM_CHANNEL_SIZE: usize = 64;

/// Registry of all active rooms, keyed by room code.
///
/// The registry itself does no locking; the server wraps it in a mutex
/// and holds the lock only for the map operations. All game work happens
/// inside the room actors.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    events: mpsc::UnboundedSender<RoomEvent>,
}

impl RoomRegistry {
    /// Creates a registry, returning it together with the receiving end
    /// of the room event stream.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RoomEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        (
            Self {
                rooms: HashMap::new(),
                events,
            },
            events_rx,
        )
    }

    /// Creates a room and spawns its actor.
    ///
    /// With `requested` set, the host's code is used verbatim; if a room
    /// already runs under it the registration is rejected rather than
    /// silently replacing the host. With `None`, a fresh code is
    /// generated, regenerating on the (unlikely) collision.
    pub fn create_room(
        &mut self,
        requested: Option<RoomCode>,
        host: EventSender,
    ) -> Result<RoomHandle, RoomError> {
        let room_code = match requested {
            Some(code) => {
                if self.rooms.contains_key(&code) {
                    return Err(RoomError::InvalidRole(code));
                }
                code
            }
            None => loop {
                let code = generate_code(&mut rand::rng());
                if !self.rooms.contains_key(&code) {
                    break code;
                }
            },
        };

        let handle = spawn_room(
            room_code.clone(),
            host,
            self.events.clone(),
            ROOM_CHANNEL_SIZE,
        );
        self.rooms.insert(room_code.clone(), handle.clone());
        tracing::info!(%room_code, rooms = self.rooms.len(), "room created");
        Ok(handle)
    }

    /// Looks up a room by code.
    pub fn get(&self, room_code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(room_code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_code.clone()))
    }

    /// Removes a room from the registry and tells its actor to shut
    /// down. A missing code is a no-op: the room may already be gone.
    pub async fn close_room(&mut self, room_code: &RoomCode) {
        if let Some(handle) = self.rooms.remove(room_code) {
            let _ = handle.close().await;
            tracing::info!(%room_code, rooms = self.rooms.len(), "room closed");
        }
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

/// Generates a four-character room code from `CODE_CHARSET`.
fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code: String = (0..RoomCode::LEN)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect();
    code.parse().expect("generated code is always valid")
}
