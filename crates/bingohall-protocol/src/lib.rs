//! Wire vocabulary for Bingohall.
//!
//! Defines every type that crosses the network between the server and its
//! hosts/players: identity newtypes, the client/server event enums, and the
//! [`Codec`] trait used to turn them into bytes.
//!
//! The encoding itself is pluggable — the core never assumes a specific
//! wire format, only the event vocabulary defined here.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientEvent, PlayerId, RoomCode, ServerEvent};
