//! Grid geometry over linear cell indices.
//!
//! A grid of `width × height` cells is never materialized as a 2D structure.
//! Cells are addressed by a linear index in row-major order
//! (`row = index / width`, `col = index % width`), and every component works
//! with those indices plus the row/column derived from them.
//!
//! # Examples
//!
//! ```
//! use flowline_core::{GridSize, Position};
//!
//! let size = GridSize::new(4, 3);
//! assert_eq!(size.cell_count(), 12);
//! assert_eq!(size.position(6), Position::new(1, 2));
//! assert_eq!(size.index(Position::new(1, 2)), 6);
//!
//! // Corner cells have two neighbors, inner cells four.
//! assert_eq!(size.neighbors(0).len(), 2);
//! assert_eq!(size.neighbors(5).len(), 4);
//! ```

use std::{fmt, ops::Range};

use tinyvec::ArrayVec;

/// Orthogonal neighbors of a cell, at most four.
pub type Neighbors = ArrayVec<[usize; 4]>;

/// A row/column coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Position {
    /// Row, counted from the top.
    pub row: usize,
    /// Column, counted from the left.
    pub col: usize,
}

impl Position {
    /// Creates a position from a row and a column.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}c{}", self.row, self.col)
    }
}

/// Dimensions of a rectangular grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridSize {
    width: usize,
    height: usize,
}

impl GridSize {
    /// Creates grid dimensions.
    ///
    /// No lower bound is enforced here; generation parameters reject grids that are
    /// too small to hold a puzzle.
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.width * self.height
    }

    /// All linear cell indices, in row-major order.
    #[must_use]
    pub const fn cells(self) -> Range<usize> {
        0..self.cell_count()
    }

    /// Returns `true` if `index` addresses a cell of this grid.
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index < self.cell_count()
    }

    /// Converts a linear index into a row/column position.
    #[must_use]
    pub const fn position(self, index: usize) -> Position {
        Position::new(index / self.width, index % self.width)
    }

    /// Converts a row/column position into a linear index.
    #[must_use]
    pub const fn index(self, pos: Position) -> usize {
        pos.row * self.width + pos.col
    }

    /// Returns the in-bounds orthogonal neighbors of `index`.
    ///
    /// The order is up, down, left, right. Diagonals are never included.
    #[must_use]
    pub fn neighbors(self, index: usize) -> Neighbors {
        let Position { row, col } = self.position(index);
        let mut out = Neighbors::new();
        if row > 0 {
            out.push(index - self.width);
        }
        if row + 1 < self.height {
            out.push(index + self.width);
        }
        if col > 0 {
            out.push(index - 1);
        }
        if col + 1 < self.width {
            out.push(index + 1);
        }
        out
    }

    /// Returns `true` if the two cells share an edge.
    #[must_use]
    pub const fn are_adjacent(self, a: usize, b: usize) -> bool {
        self.manhattan(a, b) == 1
    }

    /// Manhattan distance between two cells.
    #[must_use]
    pub const fn manhattan(self, a: usize, b: usize) -> usize {
        let pa = self.position(a);
        let pb = self.position(b);
        pa.row.abs_diff(pb.row) + pa.col.abs_diff(pb.col)
    }

    /// Returns `true` if the cell lies on the outer border of the grid.
    #[must_use]
    pub const fn is_border(self, index: usize) -> bool {
        let Position { row, col } = self.position(index);
        row == 0 || col == 0 || row + 1 == self.height || col + 1 == self.width
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
