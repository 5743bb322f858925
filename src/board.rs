//! Hexagonal board geometry, stones, moves, and text coordinates.
//!
//! A board of side `S` is stored in a square `W x W` array (`W = 2S - 1`).
//! Cell `(x, y)` lives at index `y * W + x`; only cells with
//! `|x - y| <= S - 1` belong to the hexagon, the two remaining corners of the
//! square are permanently out of bounds.

use std::fmt;

use thiserror::Error;

use crate::constants::{HEX_DIRECTIONS, MAX_SIDE};

/// A cell, represented as an index into the square board array.
pub type Point = usize;

/// Content of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stone {
    #[default]
    Empty,
    /// Player 0 (moves first).
    Black,
    /// Player 1.
    White,
}

impl Stone {
    /// The stone placed by `player` (0 or 1).
    #[inline]
    pub fn of_player(player: usize) -> Stone {
        if player == 0 { Stone::Black } else { Stone::White }
    }

    /// The player owning this stone, or `None` for an empty cell.
    #[inline]
    pub fn owner(self) -> Option<usize> {
        match self {
            Stone::Empty => None,
            Stone::Black => Some(0),
            Stone::White => Some(1),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Stone::Empty => '.',
            Stone::Black => 'X',
            Stone::White => 'O',
        }
    }
}

/// A single action: place a stone on a cell, or end the turn early.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Place(Point),
    Pass,
}

impl Move {
    /// Dense index of this move in `[0, len]`; pass takes the slot after the
    /// last cell.
    #[inline]
    pub fn slot(self, len: usize) -> usize {
        match self {
            Move::Place(pt) => pt,
            Move::Pass => len,
        }
    }
}

/// Errors from parsing a text coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("malformed coordinate '{0}'")]
    Malformed(String),
    #[error("coordinate '{0}' is off the board")]
    OffBoard(String),
}

/// Geometry of a hexagonal board of a given side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    side: usize,
    width: usize,
}

impl Board {
    /// Create the geometry for a board of side `side`.
    ///
    /// # Panics
    /// If `side` is zero or larger than [`MAX_SIDE`].
    pub fn new(side: usize) -> Self {
        assert!(
            (1..=MAX_SIDE).contains(&side),
            "board side must be in 1..={MAX_SIDE}, got {side}"
        );
        Self {
            side,
            width: 2 * side - 1,
        }
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Width (and height) of the square backing array.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Length of the backing array, `width^2`.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.width
    }

    /// Number of playable cells in the hexagon: `3S(S-1) + 1`.
    #[inline]
    pub fn cell_count(&self) -> usize {
        3 * self.side * (self.side - 1) + 1
    }

    /// Whether `(x, y)` is a playable cell. Accepts any signed coordinate.
    #[inline]
    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        let w = self.width as isize;
        let s = self.side as isize;
        x >= 0 && y >= 0 && x < w && y < w && x - y <= s - 1 && y - x <= s - 1
    }

    /// Whether `pt` indexes a playable cell.
    #[inline]
    pub fn contains(&self, pt: Point) -> bool {
        pt < self.len() && {
            let (x, y) = self.from_index(pt);
            self.in_bounds(x as isize, y as isize)
        }
    }

    #[inline]
    pub fn to_index(&self, x: usize, y: usize) -> Point {
        debug_assert!(x < self.width && y < self.width);
        y * self.width + x
    }

    /// Inverse of [`Board::to_index`].
    ///
    /// # Panics
    /// If `pt` is outside `[0, len)`.
    #[inline]
    pub fn from_index(&self, pt: Point) -> (usize, usize) {
        assert!(pt < self.len(), "cell index {pt} out of range 0..{}", self.len());
        (pt % self.width, pt / self.width)
    }

    /// The playable neighbors of `pt`. Indices outside the array or the
    /// hexagon have no neighbors.
    pub fn neighbors(self, pt: Point) -> impl Iterator<Item = Point> {
        let valid = pt < self.len();
        let x = (pt % self.width) as isize;
        let y = (pt / self.width) as isize;
        HEX_DIRECTIONS.iter().filter_map(move |&(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            (valid && self.in_bounds(nx, ny)).then(|| self.to_index(nx as usize, ny as usize))
        })
    }

    /// All playable cells in index order.
    pub fn points(self) -> impl Iterator<Item = Point> {
        (0..self.len()).filter(move |&pt| self.contains(pt))
    }

    /// Parse a move such as `"c4"` or `"pass"`.
    ///
    /// The letter selects the column `x`, the number is the row `y + 1`.
    pub fn parse_move(&self, s: &str) -> Result<Move, CoordError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Ok(Move::Pass);
        }

        let malformed = || CoordError::Malformed(s.to_string());
        let mut chars = s.chars();
        let col = chars.next().filter(char::is_ascii_alphabetic).ok_or_else(malformed)?;
        let row: usize = chars.as_str().parse().map_err(|_| malformed())?;
        if row == 0 {
            return Err(malformed());
        }

        let x = (col.to_ascii_lowercase() as u8 - b'a') as isize;
        let y = row as isize - 1;
        if !self.in_bounds(x, y) {
            return Err(CoordError::OffBoard(s.to_string()));
        }
        Ok(Move::Place(self.to_index(x as usize, y as usize)))
    }

    /// Format a move as text, the inverse of [`Board::parse_move`].
    pub fn format_move(&self, mv: Move) -> String {
        match mv {
            Move::Pass => "pass".into(),
            Move::Place(pt) => {
                let (x, y) = self.from_index(pt);
                format!("{}{}", (b'a' + x as u8) as char, y + 1)
            }
        }
    }

    /// Write every playable cell in hex layout, `cell_width` characters each.
    ///
    /// Row `y` is shifted by half a cell per step away from the middle row so
    /// adjacent rows interlock.
    pub fn render(
        &self,
        f: &mut impl fmt::Write,
        cell_width: usize,
        cell: impl Fn(Point) -> String,
    ) -> fmt::Result {
        let s = self.side as isize;
        for y in 0..self.width {
            let indent = (s - 1 - y as isize).unsigned_abs() * (cell_width + 1) / 2;
            write!(f, "{:>2} {:indent$}", y + 1, "")?;
            for x in 0..self.width {
                if self.in_bounds(x as isize, y as isize) {
                    write!(f, "{} ", cell(self.to_index(x, y)))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
