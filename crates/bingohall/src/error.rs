//! Unified error type for the Bingohall server.

use bingohall_protocol::ProtocolError;
use bingohall_room::RoomError;
use bingohall_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BingoError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, invalid transition, stale claim).
    #[error(transparent)]
    Room(#[from] RoomError),
}
