//! 3x3 tic-tac-toe board.
//!
//! # Layout
//! ```text
//!  1 | 2 | 3        (0,0) (0,1) (0,2)
//!  4 | 5 | 6   ==   (1,0) (1,1) (1,2)
//!  7 | 8 | 9        (2,0) (2,1) (2,2)
//! ```
//!
//! Positions are what players send; coordinates are what the board stores.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker a player puts on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Wire value of the mark (`0` is reserved for an empty cell).
    pub fn value(self) -> u8 {
        match self {
            Mark::X => 1,
            Mark::O => 2,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// Errors raised when placing a mark.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("position {0} is out of range, pick a position from 1 to 9")]
    OutOfRange(u8),

    #[error("position {0} is already taken")]
    Occupied(u8),
}

/// Outcome of scanning the board for three in a row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WinResult {
    pub victory: bool,
    pub winner: Option<Mark>,
    /// Zero-based `(row, col)` of the winning line.
    pub coordinates: Vec<(usize, usize)>,
}

impl WinResult {
    fn line(mark: Mark, coordinates: [(usize, usize); 3]) -> Self {
        Self {
            victory: true,
            winner: Some(mark),
            coordinates: coordinates.to_vec(),
        }
    }
}

/// Board state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Option<Mark>; 3]; 3],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a 1-based position into zero-based coordinates.
    pub fn coordinates(position: u8) -> Result<(usize, usize), MoveError> {
        if !(1..=9).contains(&position) {
            return Err(MoveError::OutOfRange(position));
        }
        let index = (position - 1) as usize;
        Ok((index / 3, index % 3))
    }

    /// Put `mark` at `position` (1..=9).
    pub fn place(&mut self, position: u8, mark: Mark) -> Result<(), MoveError> {
        let (row, col) = Self::coordinates(position)?;
        let cell = &mut self.cells[row][col];
        if cell.is_some() {
            return Err(MoveError::Occupied(position));
        }
        *cell = Some(mark);
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Mark> {
        self.cells[row][col]
    }

    /// Empty positions in ascending order.
    pub fn available(&self) -> Vec<u8> {
        (1..=9u8)
            .filter(|&p| {
                let index = (p - 1) as usize;
                self.cells[index / 3][index % 3].is_none()
            })
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    /// Rows first, then columns, then the main diagonal and the anti-diagonal.
    pub fn check_win(&self) -> WinResult {
        for row in 0..3 {
            if let Some(mark) = self.same_mark([(row, 0), (row, 1), (row, 2)]) {
                return WinResult::line(mark, [(row, 0), (row, 1), (row, 2)]);
            }
        }

        for col in 0..3 {
            if let Some(mark) = self.same_mark([(0, col), (1, col), (2, col)]) {
                return WinResult::line(mark, [(0, col), (1, col), (2, col)]);
            }
        }

        let diagonal = [(0, 0), (1, 1), (2, 2)];
        if let Some(mark) = self.same_mark(diagonal) {
            return WinResult::line(mark, diagonal);
        }

        let anti_diagonal = [(0, 2), (1, 1), (2, 0)];
        if let Some(mark) = self.same_mark(anti_diagonal) {
            return WinResult::line(mark, anti_diagonal);
        }

        WinResult::default()
    }

    fn same_mark(&self, line: [(usize, usize); 3]) -> Option<Mark> {
        let first = self.cells[line[0].0][line[0].1]?;
        line.iter()
            .all(|&(r, c)| self.cells[r][c] == Some(first))
            .then_some(first)
    }

    /// Wire representation: `0` empty, `1` X, `2` O.
    pub fn rows(&self) -> [[u8; 3]; 3] {
        let mut rows = [[0u8; 3]; 3];
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                rows[r][c] = cell.map(Mark::value).unwrap_or(0);
            }
        }
        rows
    }

    /// Compact text form such as `"X-O--X---"`.
    pub fn to_text(&self) -> String {
        self.cells
            .iter()
            .flatten()
            .map(|cell| cell.map(Mark::as_char).unwrap_or('-'))
            .collect()
    }
}
