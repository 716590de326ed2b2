//! Win detection on a marked 5×5 grid.
//!
//! Pure functions, no session context — callable from the solo game, the
//! room layer, and unit tests alike. The free cell arrives already `true`
//! in the grid, so no special-casing is needed here.

use serde::{Deserialize, Serialize};

use crate::card::SIZE;

/// The line (or full card) that completed a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "kebab-case")]
pub enum WinPattern {
    /// Every cell marked. Checked first so a full card reports blackout
    /// rather than an arbitrary row.
    Blackout,
    /// Row `0..5` fully marked.
    Row(usize),
    /// Column `0..5` fully marked.
    Column(usize),
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

/// Returns the winning pattern for a marked grid, if any.
pub fn win_pattern(marks: &[[bool; SIZE]; SIZE]) -> Option<WinPattern> {
    if marks.iter().flatten().all(|m| *m) {
        return Some(WinPattern::Blackout);
    }
    for i in 0..SIZE {
        if marks[i].iter().all(|m| *m) {
            return Some(WinPattern::Row(i));
        }
        if marks.iter().all(|row| row[i]) {
            return Some(WinPattern::Column(i));
        }
    }
    if (0..SIZE).all(|i| marks[i][i]) {
        return Some(WinPattern::Diagonal);
    }
    if (0..SIZE).all(|i| marks[i][SIZE - 1 - i]) {
        return Some(WinPattern::AntiDiagonal);
    }
    None
}

/// Boolean view of [`win_pattern`].
pub fn has_win(marks: &[[bool; SIZE]; SIZE]) -> bool {
    win_pattern(marks).is_some()
}
