//! The bounded match history log.
//!
//! Presentation-adjacent state: entries are appended by an observer of
//! the core event stream, never from inside state-mutating game logic.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of retained entries; the oldest is evicted on overflow.
pub const HISTORY_CAP: usize = 50;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameResult {
    /// A player's claim was accepted.
    Won,
    /// All 75 numbers were drawn without a winner.
    Exhausted,
    /// The host left while the session was in progress.
    Abandoned,
}

/// One immutable record of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the game ended.
    pub timestamp: DateTime<Utc>,
    /// The room the game ran in (`"OFFLINE"` for solo games).
    pub room_code: String,
    /// The winning player's id, if anyone won.
    pub winner: Option<u64>,
    /// How many numbers had been called when the game ended.
    pub numbers_called: usize,
    /// The outcome.
    pub result: GameResult,
}

/// Process-wide append-only log of the 50 most recent games,
/// newest first.
#[derive(Debug, Default)]
pub struct MatchHistory {
    entries: VecDeque<HistoryEntry>,
}

impl MatchHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry, evicting the oldest once the cap is reached.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAP);
    }

    /// Iterates entries newest-first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
