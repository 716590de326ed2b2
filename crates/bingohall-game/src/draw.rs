//! The authoritative draw sequencer.

use rand::Rng;

use crate::GameError;

/// Highest drawable number.
pub const MAX_NUMBER: u8 = 75;

/// Draws the next number: uniform over `[1, 75]` minus `called`.
///
/// Rejection sampling, matching the reference behavior: draw a candidate,
/// retry if it was already called. The exhaustion check up front bounds
/// the loop — with k numbers called, a fresh candidate is found with
/// probability `(75 - k) / 75` per attempt, and k < 75 is guaranteed here.
///
/// Callers that reach 75 called numbers must treat the game as finished
/// instead of calling this again.
pub fn draw_next<R: Rng + ?Sized>(rng: &mut R, called: &[u8]) -> Result<u8, GameError> {
    if called.len() >= MAX_NUMBER as usize {
        return Err(GameError::Exhausted);
    }
    loop {
        let n = rng.random_range(1..=MAX_NUMBER);
        if !called.contains(&n) {
            return Ok(n);
        }
    }
}
