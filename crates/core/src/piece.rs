//! Piece geometry - the seven tetrominoes, the rotation transforms, and placed pieces.

use serde::{Deserialize, Serialize};

/// A (column, row) pair. Rows grow downward, columns grow rightward.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub col: i32,
    pub row: i32,
}

impl Point {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[inline(always)]
    pub const fn offset(self, dc: i32, dr: i32) -> Self {
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }
}

/// Offsets of the four cells of a piece relative to its anchor.
pub type Offsets = [Point; 4];

const fn p(col: i32, row: i32) -> Point {
    Point::new(col, row)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Shape {
    T,
    J,
    L,
    Z,
    S,
    I,
    O,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::T,
        Shape::J,
        Shape::L,
        Shape::Z,
        Shape::S,
        Shape::I,
        Shape::O,
    ];

    /// Un-rotated offsets. The anchor sits on the lowest row of every shape,
    /// so a spawned piece only touches row 0 of the visible board.
    pub const fn offsets(self) -> Offsets {
        match self {
            Shape::T => [p(-1, 0), p(0, 0), p(1, 0), p(0, -1)],
            Shape::J => [p(-1, -1), p(-1, 0), p(0, 0), p(1, 0)],
            Shape::L => [p(1, -1), p(-1, 0), p(0, 0), p(1, 0)],
            Shape::Z => [p(-1, -1), p(0, -1), p(0, 0), p(1, 0)],
            Shape::S => [p(0, -1), p(1, -1), p(-1, 0), p(0, 0)],
            Shape::I => [p(-1, 0), p(0, 0), p(1, 0), p(2, 0)],
            Shape::O => [p(0, 0), p(1, 0), p(0, -1), p(1, -1)],
        }
    }
}

/// `(c, r) -> (-r, c)` applied to every offset.
pub fn rotate_left(offsets: &Offsets) -> Offsets {
    offsets.map(|o| Point::new(-o.row, o.col))
}

/// `(c, r) -> (r, -c)` applied to every offset.
pub fn rotate_right(offsets: &Offsets) -> Offsets {
    offsets.map(|o| Point::new(o.row, -o.col))
}

/// Canonical identity of a piece's absolute cells: the four flattened
/// indices `row * width + col`, sorted. Independent of anchor/offset split.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct PieceKey([i32; 4]);

impl PieceKey {
    pub fn indices(&self) -> &[i32; 4] {
        &self.0
    }
}

/// An offset list (possibly rotated, hence anonymous) plus an anchor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub offsets: Offsets,
    pub anchor: Point,
}

impl PlacedPiece {
    pub fn new(offsets: Offsets, anchor: Point) -> Self {
        Self { offsets, anchor }
    }

    pub fn spawn(shape: Shape, anchor: Point) -> Self {
        Self::new(shape.offsets(), anchor)
    }

    /// Absolute cells: offsets + anchor.
    #[inline]
    pub fn cells(&self) -> [Point; 4] {
        self.offsets
            .map(|o| o.offset(self.anchor.col, self.anchor.row))
    }

    pub fn translated(&self, dc: i32, dr: i32) -> Self {
        Self {
            offsets: self.offsets,
            anchor: self.anchor.offset(dc, dr),
        }
    }

    pub fn rotated_left(&self) -> Self {
        Self {
            offsets: rotate_left(&self.offsets),
            anchor: self.anchor,
        }
    }

    pub fn rotated_right(&self) -> Self {
        Self {
            offsets: rotate_right(&self.offsets),
            anchor: self.anchor,
        }
    }

    /// Lowest row (largest row index) touched by the piece.
    pub fn max_row(&self) -> i32 {
        self.cells().iter().map(|c| c.row).max().unwrap_or(self.anchor.row)
    }

    pub fn key(&self, width: usize) -> PieceKey {
        let w = width as i32;
        let mut idx = self.cells().map(|c| c.row * w + c.col);
        idx.sort_unstable();
        PieceKey(idx)
    }
}
