//! Elementary moves. Every move also drops the piece one row.

use crate::PlacedPiece;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Move {
    Down,
    Left,
    Right,
    RotateLeft,
    RotateRight,
}

impl Move {
    pub const ALL: [Move; 5] = [
        Move::Down,
        Move::Left,
        Move::Right,
        Move::RotateLeft,
        Move::RotateRight,
    ];

    /// The transformed piece, without any legality check.
    pub fn apply(self, piece: &PlacedPiece) -> PlacedPiece {
        match self {
            Move::Down => piece.translated(0, 1),
            Move::Left => piece.translated(-1, 1),
            Move::Right => piece.translated(1, 1),
            Move::RotateLeft => piece.rotated_left().translated(0, 1),
            Move::RotateRight => piece.rotated_right().translated(0, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Shape};

    #[test]
    fn test_every_move_drops_one_row() {
        let piece = PlacedPiece::spawn(Shape::T, Point::new(4, 2));
        for mv in Move::ALL {
            assert_eq!(mv.apply(&piece).anchor.row, 3, "{mv:?}");
        }
    }

    #[test]
    fn test_lateral_moves() {
        let piece = PlacedPiece::spawn(Shape::J, Point::new(4, 2));
        assert_eq!(Move::Left.apply(&piece).anchor, Point::new(3, 3));
        assert_eq!(Move::Right.apply(&piece).anchor, Point::new(5, 3));
        assert_eq!(Move::Down.apply(&piece).offsets, piece.offsets);
    }

    #[test]
    fn test_rotation_moves() {
        let piece = PlacedPiece::spawn(Shape::S, Point::new(4, 2));
        let left = Move::RotateLeft.apply(&piece);
        assert_eq!(left.offsets, piece.rotated_left().offsets);
        let right = Move::RotateRight.apply(&piece);
        assert_eq!(right.offsets, piece.rotated_right().offsets);
    }
}
