//! Pure bingo game logic for Bingohall.
//!
//! Everything in this crate is synchronous and network-free: the card
//! generator, the draw sequencer, the win validator, the bounded match
//! history, and the offline solo game. The room layer drives these from
//! its actors; tests drive them directly with seeded RNGs.
//!
//! # Key types
//!
//! - [`Card`] — a 5×5 card with a free center cell
//! - [`draw_next`] — the authoritative non-repeating draw in `[1, 75]`
//! - [`win_pattern`] / [`has_win`] — row/column/diagonal/blackout detection
//! - [`MatchHistory`] — the 50-entry append-only result log
//! - [`SoloGame`] — the single-player offline variant

mod card;
mod draw;
mod error;
mod history;
mod solo;
mod win;

pub use card::{Card, Cell, SIZE};
pub use draw::{MAX_NUMBER, draw_next};
pub use error::GameError;
pub use history::{GameResult, HistoryEntry, MatchHistory};
pub use solo::{SoloGame, SoloOutcome};
pub use win::{WinPattern, has_win, win_pattern};
