//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed — malformed input, missing fields, or an
    /// unknown event tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value is not a valid room code (must be 4 alphanumeric
    /// ASCII characters).
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),

    /// The message decoded fine but violates protocol rules — e.g. a
    /// game event sent before registration.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
