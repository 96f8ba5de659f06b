//! Single-step actions - the five elementary moves that are legal right now.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use tetrad_core::{Move, PlacedPiece, Snapshot, Transition};

/// At most one action per elementary move - never spills to the heap.
pub type StepList = SmallVec<[SingleStepAction; 5]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Piece still active in the resulting snapshot.
    Falling,
    /// Piece merged, rows cleared, no active piece.
    Landed { lines_cleared: usize },
}

/// One elementary move applied to a snapshot's active piece.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleStepAction {
    pub mv: Move,
    /// The transformed piece the move produced.
    pub piece: PlacedPiece,
    pub kind: StepKind,
    result: Arc<Snapshot>,
    source: Arc<Snapshot>,
}

impl SingleStepAction {
    fn new(source: &Arc<Snapshot>, mv: Move, piece: PlacedPiece, transition: Transition) -> Self {
        let (kind, result) = match transition {
            Transition::Falling(snapshot) => (StepKind::Falling, snapshot),
            Transition::Landed {
                snapshot,
                lines_cleared,
            } => (StepKind::Landed { lines_cleared }, snapshot),
        };
        Self {
            mv,
            piece,
            kind,
            result: Arc::new(result),
            source: Arc::clone(source),
        }
    }

    /// Snapshot after the move.
    #[inline]
    pub fn result(&self) -> &Snapshot {
        &self.result
    }

    /// The snapshot this action was generated from.
    #[inline]
    pub fn source(&self) -> &Snapshot {
        &self.source
    }

    /// Shared handle to the result.
    pub(crate) fn result_arc(&self) -> &Arc<Snapshot> {
        &self.result
    }

    pub fn is_landed(&self) -> bool {
        matches!(self.kind, StepKind::Landed { .. })
    }

    pub fn lines_cleared(&self) -> usize {
        match self.kind {
            StepKind::Landed { lines_cleared } => lines_cleared,
            StepKind::Falling => 0,
        }
    }
}

/// Try one elementary move. None if the transformed piece is not legal.
pub fn try_step(snapshot: &Snapshot, mv: Move) -> Option<SingleStepAction> {
    step_from(&Arc::new(snapshot.clone()), mv)
}

/// Every legal elementary move, in `Move::ALL` order.
/// Empty when there is no active piece or it cannot move at all.
pub fn single_step_actions(snapshot: &Snapshot) -> StepList {
    steps_from(&Arc::new(snapshot.clone()))
}

pub(crate) fn step_from(source: &Arc<Snapshot>, mv: Move) -> Option<SingleStepAction> {
    let current = source.piece()?;
    let piece = mv.apply(current);
    let transition = source.transition(mv)?;
    Some(SingleStepAction::new(source, mv, piece, transition))
}

pub(crate) fn steps_from(source: &Arc<Snapshot>) -> StepList {
    Move::ALL
        .iter()
        .filter_map(|&mv| step_from(source, mv))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetrad_core::{CellSet, Point, Shape};

    #[test]
    fn test_all_moves_on_open_board() {
        let s = Snapshot::default().spawn(Shape::T).expect("spawn");
        let actions = single_step_actions(&s);
        assert_eq!(actions.len(), 5);
        let moves: Vec<Move> = actions.iter().map(|a| a.mv).collect();
        assert_eq!(moves, Move::ALL.to_vec());
        assert!(actions.iter().all(|a| a.kind == StepKind::Falling));
        assert!(actions.iter().all(|a| a.source() == &s));
    }

    #[test]
    fn test_wall_filters_lateral_move() {
        let s = Snapshot::default().spawn(Shape::I).expect("spawn");
        // walk the I piece left until it touches the wall
        let mut cur = s;
        while let Some(a) = try_step(&cur, Move::Left) {
            cur = a.result().clone();
        }
        let piece = cur.piece().expect("still falling");
        assert_eq!(piece.cells().iter().map(|c| c.col).min(), Some(0));
        let actions = single_step_actions(&cur);
        assert!(actions.iter().all(|a| a.mv != Move::Left));
        assert!(actions.iter().any(|a| a.mv == Move::Down));
    }

    #[test]
    fn test_no_piece_no_actions() {
        assert!(single_step_actions(&Snapshot::default()).is_empty());
    }

    #[test]
    fn test_landing_action() {
        let mut set = CellSet::new(10, 20);
        set.insert_cell(5, 5);
        let s = Snapshot::from_occupied(set).spawn(Shape::O).expect("spawn");
        let mut cur = s;
        loop {
            let a = try_step(&cur, Move::Down).expect("down stays legal until landing");
            if a.is_landed() {
                assert_eq!(a.lines_cleared(), 0);
                assert!(a.result().piece().is_none());
                assert!(a.result().occupied().contains_cell(5, 4));
                assert_eq!(a.piece.anchor, Point::new(5, 4));
                break;
            }
            cur = a.result().clone();
        }
    }

    #[test]
    fn test_buried_piece_has_no_moves() {
        // only column 0 is open below the spawn row
        let mut set = CellSet::new(10, 20);
        for y in 1..20 {
            for x in 1..10 {
                set.insert_cell(x, y);
            }
        }
        let s = Snapshot::from_occupied(set).spawn(Shape::O).expect("row 0 is free");
        assert!(single_step_actions(&s).is_empty());
    }
}
