//! The offline single-player game.
//!
//! Room, registry, and session collapse into one local state: the same
//! draw sequencer and win validator, no network fan-out, and the win
//! claim replaced by a local check after every draw and mark.

use rand::Rng;

use crate::{Card, GameError, MAX_NUMBER, WinPattern, draw_next, win_pattern};

/// How a solo game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoloOutcome {
    /// The card completed a line (or blackout).
    Won(WinPattern),
    /// All 75 numbers drawn without completing anything.
    Exhausted,
}

/// A single-player practice game.
///
/// The player marks cells themselves; a mark is only accepted for a
/// number that has actually been called. The win check runs after every
/// draw and every mark, so the game terminates within 75 draws.
#[derive(Debug)]
pub struct SoloGame<R: Rng> {
    rng: R,
    card: Card,
    called: Vec<u8>,
    outcome: Option<SoloOutcome>,
}

impl<R: Rng> SoloGame<R> {
    /// Starts a new game with a freshly generated card.
    pub fn new(mut rng: R) -> Self {
        let card = Card::generate(&mut rng);
        Self {
            rng,
            card,
            called: Vec::new(),
            outcome: None,
        }
    }

    /// Draws the next number and runs the post-draw check.
    pub fn call_number(&mut self) -> Result<u8, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::Finished);
        }

        let n = draw_next(&mut self.rng, &self.called)?;
        self.called.push(n);
        self.check_outcome();
        Ok(n)
    }

    /// Marks the cell at `(row, col)` if its number has been called.
    ///
    /// Returns `true` if the cell was newly marked; `false` if it was
    /// already marked or its number has not been drawn yet.
    pub fn mark(&mut self, row: usize, col: usize) -> Result<bool, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::Finished);
        }

        let cell = self.card.cell(row, col);
        if cell.marked || !self.called.contains(&cell.number) {
            return Ok(false);
        }
        self.card.mark_cell(row, col);
        self.check_outcome();
        Ok(true)
    }

    /// Discards the current card and draw history and starts over.
    pub fn reset(&mut self) {
        self.card = Card::generate(&mut self.rng);
        self.called.clear();
        self.outcome = None;
    }

    fn check_outcome(&mut self) {
        if let Some(pattern) = win_pattern(&self.card.marks()) {
            self.outcome = Some(SoloOutcome::Won(pattern));
        } else if self.called.len() == MAX_NUMBER as usize {
            self.outcome = Some(SoloOutcome::Exhausted);
        }
    }

    /// The player's card.
    pub fn card(&self) -> &Card {
        &self.card
    }

    /// Numbers called so far, in draw order.
    pub fn called(&self) -> &[u8] {
        &self.called
    }

    /// The outcome, once the game has finished.
    pub fn outcome(&self) -> Option<SoloOutcome> {
        self.outcome
    }

    /// Whether the game has reached an outcome.
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}
