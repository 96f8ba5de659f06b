//! Drop-action enumeration - every distinct resting placement of the active piece.
//!
//! Two phases:
//!
//! 1. Fast-forward: plain move-downs until the piece is within
//!    [`FAST_FORWARD_MARGIN`] rows of the top-most occupied row. Placements
//!    reachable only by sideways movement above that point are not explored.
//! 2. Breadth-first search over single-step actions. A node is the set of
//!    absolute cells of the falling piece; each is expanded once, so the first
//!    path found to any placement is a shortest one.

use std::sync::Arc;

use log::trace;
use rustc_hash::FxHashSet;

use tetrad_core::{query, CellSet, Move, PieceKey, Snapshot};

use crate::movement::{step_from, steps_from, SingleStepAction, StepKind};

/// Rows of clearance kept above the stack when fast-forwarding.
pub const FAST_FORWARD_MARGIN: i32 = 8;

/// A minimal move sequence and the terminal snapshot it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropAction {
    path: Vec<SingleStepAction>,
    result: Arc<Snapshot>,
    source: Arc<Snapshot>,
}

impl DropAction {
    pub fn path(&self) -> &[SingleStepAction] {
        &self.path
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.path.iter().map(|a| a.mv)
    }

    /// Terminal snapshot: piece merged, rows cleared, nothing active.
    pub fn result(&self) -> &Snapshot {
        &self.result
    }

    /// The snapshot the search started from.
    pub fn source(&self) -> &Snapshot {
        &self.source
    }

    pub fn lines_cleared(&self) -> usize {
        self.path.last().map_or(0, SingleStepAction::lines_cleared)
    }
}

/// BFS arena entry - the action that reached a node and its parent node.
struct Node {
    action: SingleStepAction,
    parent: Option<usize>,
}

/// All distinct terminal placements of the active piece, one shortest path
/// each. No two results share an occupied-cell set. Order is unspecified.
///
/// Empty when there is no active piece or it cannot move at all.
pub fn drop_actions(snapshot: &Snapshot) -> Vec<DropAction> {
    let Some(piece) = snapshot.piece() else {
        return Vec::new();
    };
    let width = snapshot.width();
    let source = Arc::new(snapshot.clone());

    let (prefix, seed) = fast_forward(&source);
    let seed_piece = seed.piece().copied().unwrap_or(*piece);

    let mut arena: Vec<Node> = Vec::new();
    let mut seen: FxHashSet<PieceKey> = FxHashSet::default();
    let mut recorded: FxHashSet<CellSet> = FxHashSet::default();
    let mut results = Vec::new();

    seen.insert(seed_piece.key(width));
    let mut frontier: Vec<Option<usize>> = vec![None];
    let mut depth = 0usize;

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &parent in &frontier {
            let from = match parent {
                Some(i) => arena[i].action.result_arc(),
                None => &seed,
            };
            for action in steps_from(from) {
                match action.kind {
                    StepKind::Landed { .. } => {
                        if recorded.insert(action.result().occupied().clone()) {
                            let result = Arc::clone(action.result_arc());
                            let mut path = prefix.clone();
                            path.extend(trace_path(&arena, parent));
                            path.push(action);
                            results.push(DropAction {
                                path,
                                result,
                                source: Arc::clone(&source),
                            });
                        }
                    }
                    StepKind::Falling => {
                        if seen.insert(action.piece.key(width)) {
                            arena.push(Node { action, parent });
                            next.push(Some(arena.len() - 1));
                        }
                    }
                }
            }
        }
        frontier = next;
        depth += 1;
    }

    trace!(
        "drop_actions: fast-forward {} rows, {} nodes over {} generations, {} placements",
        prefix.len(),
        arena.len(),
        depth,
        results.len()
    );
    results
}

/// Move down until the piece is within the margin of the stack top. Returns
/// the actions taken and the snapshot reached.
fn fast_forward(root: &Arc<Snapshot>) -> (Vec<SingleStepAction>, Arc<Snapshot>) {
    let stack_top = query::min_occupied_row(root) as i32;
    let mut prefix = Vec::new();
    let mut cur = Arc::clone(root);
    while let Some(piece) = cur.piece() {
        if stack_top - piece.max_row() <= FAST_FORWARD_MARGIN {
            break;
        }
        match step_from(&cur, Move::Down) {
            Some(action) if action.kind == StepKind::Falling => {
                cur = Arc::clone(action.result_arc());
                prefix.push(action);
            }
            _ => break,
        }
    }
    (prefix, cur)
}

/// Actions from the seed to `node`, in order.
fn trace_path(arena: &[Node], mut node: Option<usize>) -> Vec<SingleStepAction> {
    let mut path = Vec::new();
    while let Some(i) = node {
        path.push(arena[i].action.clone());
        node = arena[i].parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetrad_core::Shape;

    #[test]
    fn test_no_piece_no_drops() {
        assert!(drop_actions(&Snapshot::default()).is_empty());
    }

    #[test]
    fn test_i_piece_empty_board() {
        let s = Snapshot::default().spawn(Shape::I).expect("spawn");
        let drops = drop_actions(&s);
        assert!(!drops.is_empty());
        for d in &drops {
            assert!(d.result().piece().is_none());
            assert_eq!(d.result().occupied().count(), 4);
            assert_eq!(d.lines_cleared(), 0);
            assert_eq!(d.source(), &s);
        }
        // a flat I on the floor and a vertical I both show up
        let flat = drops
            .iter()
            .any(|d| d.result().occupied().row_count(19) == 4);
        let upright = drops
            .iter()
            .any(|d| (16..20).all(|y| d.result().occupied().row_count(y) == 1));
        assert!(flat && upright);
    }

    #[test]
    fn test_results_are_unique() {
        let s = Snapshot::default().spawn(Shape::T).expect("spawn");
        let drops = drop_actions(&s);
        let distinct: FxHashSet<&CellSet> = drops.iter().map(|d| d.result().occupied()).collect();
        assert_eq!(distinct.len(), drops.len());
    }

    #[test]
    fn test_fast_forward_prefix() {
        let s = Snapshot::default().spawn(Shape::O).expect("spawn");
        let (prefix, seed) = fast_forward(&Arc::new(s.clone()));
        // empty 20-row board: stop once 20 - max_row <= 8
        assert_eq!(prefix.len(), 12);
        assert!(prefix.iter().all(|a| a.mv == Move::Down));
        assert_eq!(seed.piece().map(|p| p.max_row()), Some(12));
        for d in drop_actions(&s) {
            assert!(d.moves().take(12).all(|m| m == Move::Down));
        }
    }

    #[test]
    fn test_no_fast_forward_near_stack() {
        let mut set = CellSet::new(10, 20);
        set.insert_cell(0, 6);
        let s = Snapshot::from_occupied(set).spawn(Shape::O).expect("spawn");
        let (prefix, _) = fast_forward(&Arc::new(s));
        assert!(prefix.is_empty());
    }

    #[test]
    fn test_line_clear_placement() {
        let mut set = CellSet::new(10, 20);
        for x in 0..10 {
            if !(4..8).contains(&x) {
                set.insert_cell(x, 19);
            }
        }
        let s = Snapshot::from_occupied(set).spawn(Shape::I).expect("spawn");
        let drops = drop_actions(&s);
        let clear = drops
            .iter()
            .find(|d| d.lines_cleared() == 1)
            .expect("flat I into the gap clears the row");
        assert!(clear.result().occupied().is_empty());
    }
}
