use std::cmp::Ordering;

use tetrad_core::{Move, Snapshot, Transition};
use tetrad_engine::{drop_actions, single_step_actions, DropAction, SingleStepAction};
use tetrad_eval::{evaluate, select_best, EvalError, EvalWeights};

/// What a strategy wants done with the active piece.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Take a whole drop path at once.
    Drop(DropAction),
    /// Take one elementary move and ask again.
    Step(SingleStepAction),
}

pub trait Strategy {
    /// `None` means lock the active piece where it stands.
    fn decide(&self, snapshot: &Snapshot) -> Option<Decision>;
}

/// Scores every drop action and takes the best. Ties go to the first
/// placement the enumerator produced.
#[derive(Clone, Debug, Default)]
pub struct GreedyDrop {
    pub weights: EvalWeights,
}

impl GreedyDrop {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn from_params(params: &[f32]) -> Result<Self, EvalError> {
        Ok(Self::new(EvalWeights::from_params(params)?))
    }

    pub fn find_best_drop(&self, snapshot: &Snapshot) -> Option<(DropAction, f32)> {
        select_best(self.scored(snapshot), |(_, score)| *score)
    }

    /// Top `n` placements, best first.
    pub fn find_top_drops(&self, snapshot: &Snapshot, n: usize) -> Vec<(DropAction, f32)> {
        if n == 0 {
            return Vec::new();
        }
        let mut scored = self.scored(snapshot);
        // stable, so equal scores keep enumeration order
        scored.sort_by(|a, b| score_cmp(a.1, b.1));
        scored.truncate(n);
        scored
    }

    fn scored(&self, snapshot: &Snapshot) -> Vec<(DropAction, f32)> {
        drop_actions(snapshot)
            .into_iter()
            .map(|d| {
                let score = evaluate(d.result(), d.lines_cleared(), &self.weights);
                (d, score)
            })
            .collect()
    }
}

impl Strategy for GreedyDrop {
    fn decide(&self, snapshot: &Snapshot) -> Option<Decision> {
        self.find_best_drop(snapshot).map(|(d, _)| Decision::Drop(d))
    }
}

/// Picks one elementary move at a time. A falling candidate is scored by
/// where it would land if it only moved down from there.
#[derive(Clone, Debug, Default)]
pub struct GreedyStep {
    pub weights: EvalWeights,
}

impl GreedyStep {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    fn score(&self, action: &SingleStepAction) -> f32 {
        let (landed, lines) = if action.is_landed() {
            (action.result().clone(), action.lines_cleared())
        } else {
            settle(action.result())
        };
        evaluate(&landed, lines, &self.weights)
    }
}

impl Strategy for GreedyStep {
    fn decide(&self, snapshot: &Snapshot) -> Option<Decision> {
        select_best(single_step_actions(snapshot), |a| self.score(a)).map(Decision::Step)
    }
}

/// Move down until the piece merges. Returns the terminal snapshot and
/// rows cleared.
fn settle(snapshot: &Snapshot) -> (Snapshot, usize) {
    let mut cur = snapshot.clone();
    loop {
        let next = cur.transition(Move::Down).or_else(|| cur.lock_piece());
        match next {
            Some(Transition::Falling(s)) => cur = s,
            Some(Transition::Landed {
                snapshot,
                lines_cleared,
            }) => return (snapshot, lines_cleared),
            None => return (cur, 0),
        }
    }
}

fn score_cmp(a: f32, b: f32) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
