//! The session lifecycle state machine.

/// The lifecycle state of a room's session.
///
/// Transitions are strictly forward — no skipping, no going back:
///
/// ```text
/// Lobby → InProgress → Finished
/// ```
///
/// - **Lobby**: room exists, players are joining, nothing drawn yet.
/// - **InProgress**: the host is drawing numbers; win claims are live.
/// - **Finished**: terminal. A claim was accepted, the pool was
///   exhausted, or the host abandoned the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Lobby,
    InProgress,
    Finished,
}

impl SessionState {
    /// Returns the next state in the strict ordering, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Lobby => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Whether numbers can be drawn and claims accepted.
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Whether the session has reached its terminal state.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
