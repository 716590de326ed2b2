//! Card generation and marking.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Side length of a card.
pub const SIZE: usize = 5;

/// Width of each column's value range (column c draws from
/// `[15c + 1, 15c + 15]`).
const COLUMN_SPAN: u8 = 15;

/// Position of the free cell.
const FREE: (usize, usize) = (2, 2);

/// One cell of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The printed number. The free cell carries 0, which is never drawn.
    pub number: u8,
    /// Whether the cell has been marked.
    pub marked: bool,
}

/// A 5×5 bingo card.
///
/// Generated once at game start and immutable afterwards except for the
/// per-cell `marked` flag. Each column holds 5 distinct values from its
/// 15-value range; duplicates across columns are allowed (standard bingo
/// rules). The center cell is free and pre-marked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    cells: [[Cell; SIZE]; SIZE],
}

impl Card {
    /// Generates a fresh card from the given random source.
    ///
    /// Per-column rejection sampling: draw a candidate in the column's
    /// range, redraw on collision with a value already picked for that
    /// column. Bounded in practice — 5 picks out of 15 candidates.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cells = [[Cell { number: 0, marked: false }; SIZE]; SIZE];

        for col in 0..SIZE {
            let low = col as u8 * COLUMN_SPAN + 1;
            let mut picked: Vec<u8> = Vec::with_capacity(SIZE);
            while picked.len() < SIZE {
                let n = rng.random_range(low..low + COLUMN_SPAN);
                if !picked.contains(&n) {
                    picked.push(n);
                }
            }
            for (row, n) in picked.into_iter().enumerate() {
                cells[row][col].number = n;
            }
        }

        cells[FREE.0][FREE.1] = Cell { number: 0, marked: true };
        Self { cells }
    }

    /// Returns the cell at the given position.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Marks every cell carrying `number`. Returns `true` if anything
    /// was newly marked.
    pub fn mark_value(&mut self, number: u8) -> bool {
        let mut hit = false;
        for row in self.cells.iter_mut() {
            for cell in row.iter_mut() {
                if cell.number == number && !cell.marked {
                    cell.marked = true;
                    hit = true;
                }
            }
        }
        hit
    }

    /// Marks a single cell by position. Returns `true` if it was newly
    /// marked.
    pub fn mark_cell(&mut self, row: usize, col: usize) -> bool {
        let cell = &mut self.cells[row][col];
        if cell.marked {
            return false;
        }
        cell.marked = true;
        true
    }

    /// Exports the marked grid for the win validator.
    pub fn marks(&self) -> [[bool; SIZE]; SIZE] {
        let mut grid = [[false; SIZE]; SIZE];
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                grid[r][c] = cell.marked;
            }
        }
        grid
    }
}
