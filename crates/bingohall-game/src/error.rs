//! Error types for the game logic layer.

/// Errors from the pure game logic.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    /// A draw was requested with all 75 numbers already called.
    /// Callers must check the called count and finish the game instead.
    #[error("all 75 numbers have been drawn")]
    Exhausted,

    /// The game already reached an outcome; no further draws are legal.
    #[error("game is already finished")]
    Finished,
}
