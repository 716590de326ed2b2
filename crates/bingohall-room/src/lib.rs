//! Room lifecycle and session orchestration for Bingohall.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! session state machine: the player roster, the authoritative
//! called-number sequence, and the winner. The actor's command loop is
//! the single serialization point for a room — two concurrent win claims
//! can never interleave — while separate rooms run fully in parallel.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — maps room codes to running rooms
//! - [`RoomHandle`] — send commands to a room actor
//! - [`SessionState`] — the Lobby → InProgress → Finished machine
//! - [`RoomEvent`] — terminal events for observers (history recording)

mod error;
mod registry;
mod room;
mod state;

pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{EventSender, RoomEvent, RoomHandle, RoomInfo};
pub use state::SessionState;
