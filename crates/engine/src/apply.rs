use tetrad_core::{Snapshot, Transition};

use crate::error::EngineError;
use crate::movegen::DropAction;
use crate::movement::SingleStepAction;

/// Anything generated from a snapshot that can be applied back to it.
pub trait Action {
    /// Snapshot the action was generated from.
    fn source(&self) -> &Snapshot;
    /// Snapshot the action leads to.
    fn result(&self) -> &Snapshot;
}

impl Action for SingleStepAction {
    fn source(&self) -> &Snapshot {
        SingleStepAction::source(self)
    }

    fn result(&self) -> &Snapshot {
        SingleStepAction::result(self)
    }
}

impl Action for DropAction {
    fn source(&self) -> &Snapshot {
        DropAction::source(self)
    }

    fn result(&self) -> &Snapshot {
        DropAction::result(self)
    }
}

/// Apply an action to the snapshot it came from.
/// Fails with `StaleAction` for any other snapshot, including one with the
/// same cells but a different piece orientation.
pub fn apply<A: Action>(snapshot: &Snapshot, action: &A) -> Result<Snapshot, EngineError> {
    if action.source() != snapshot {
        return Err(EngineError::StaleAction);
    }
    Ok(action.result().clone())
}

/// Re-run a recorded path move by move from `snapshot`, recomputing every
/// transition instead of trusting the stored results.
pub fn replay(snapshot: &Snapshot, path: &[SingleStepAction]) -> Result<Snapshot, EngineError> {
    let mut cur = snapshot.clone();
    for (step, action) in path.iter().enumerate() {
        if action.source() != &cur {
            return Err(EngineError::StaleAction);
        }
        if cur.piece().is_none() {
            return Err(EngineError::NoActivePiece);
        }
        let next = cur
            .transition(action.mv)
            .ok_or(EngineError::ReplayDiverged { step })?;
        if next.is_landed() != action.is_landed() || next.snapshot() != action.result() {
            return Err(EngineError::ReplayDiverged { step });
        }
        cur = next.into_snapshot();
    }
    Ok(cur)
}

/// Merge the active piece where it stands, for when no move is left.
/// Returns the new snapshot and the number of rows cleared.
pub fn lock(snapshot: &Snapshot) -> Result<(Snapshot, usize), EngineError> {
    match snapshot.lock_piece() {
        Some(Transition::Landed {
            snapshot,
            lines_cleared,
        }) => Ok((snapshot, lines_cleared)),
        _ => Err(EngineError::NoActivePiece),
    }
}
