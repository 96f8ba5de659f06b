//! tetrad-eval - linear scoring of snapshots for choosing between placements.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tetrad_core::{query, Snapshot};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("expected {expected} weights, got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("weight {index} is not finite")]
    NonFinite { index: usize },
}

/// Board features read off the query primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub cell_count: usize,
    /// Rows from the floor up to the top-most occupied row.
    pub stack_height: usize,
    /// Sum over columns of empty cells above the first occupied one.
    pub top_empty_total: usize,
    /// Sum of absolute differences between neighbouring columns.
    pub bumpiness: usize,
    pub boxed_cells: usize,
    /// Boxed cells weighted by row index, so buried ones count more.
    pub boxed_depth: usize,
}

impl Features {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let height = snapshot.height();
        let tops = query::top_empty_counts(snapshot);
        let boxed = query::boxed_empty_counts(snapshot);

        let bumpiness = tops.windows(2).map(|w| w[0].abs_diff(w[1])).sum();
        let boxed_depth = boxed
            .iter()
            .enumerate()
            .map(|(row, &n)| n * (row + 1))
            .sum();

        Self {
            cell_count: query::cell_count(snapshot),
            stack_height: height - query::min_occupied_row(snapshot),
            top_empty_total: tops.iter().sum(),
            bumpiness,
            boxed_cells: boxed.iter().sum(),
            boxed_depth,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub lines_cleared: f32,
    pub stack_height: f32,
    pub bumpiness: f32,
    pub boxed_cells: f32,
    pub boxed_depth: f32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            lines_cleared: 1.0,
            stack_height: -0.5,
            bumpiness: -0.2,
            boxed_cells: -2.0,
            boxed_depth: -0.05,
        }
    }
}

impl EvalWeights {
    /// Length of the flat parameter vector used by optimizers.
    pub const PARAM_COUNT: usize = 5;

    /// Build weights from a flat vector, in field order.
    pub fn from_params(params: &[f32]) -> Result<Self, EvalError> {
        if params.len() != Self::PARAM_COUNT {
            return Err(EvalError::Arity {
                expected: Self::PARAM_COUNT,
                actual: params.len(),
            });
        }
        if let Some(index) = params.iter().position(|p| !p.is_finite()) {
            return Err(EvalError::NonFinite { index });
        }
        Ok(Self {
            lines_cleared: params[0],
            stack_height: params[1],
            bumpiness: params[2],
            boxed_cells: params[3],
            boxed_depth: params[4],
        })
    }

    pub fn to_params(&self) -> [f32; Self::PARAM_COUNT] {
        [
            self.lines_cleared,
            self.stack_height,
            self.bumpiness,
            self.boxed_cells,
            self.boxed_depth,
        ]
    }
}

/// Score a terminal snapshot reached by clearing `lines`. Higher is better.
pub fn evaluate(snapshot: &Snapshot, lines: usize, weights: &EvalWeights) -> f32 {
    score_features(&Features::from_snapshot(snapshot), lines, weights)
}

pub fn score_features(f: &Features, lines: usize, weights: &EvalWeights) -> f32 {
    lines as f32 * weights.lines_cleared
        + f.stack_height as f32 * weights.stack_height
        + f.bumpiness as f32 * weights.bumpiness
        + f.boxed_cells as f32 * weights.boxed_cells
        + f.boxed_depth as f32 * weights.boxed_depth
}

/// Highest-scoring candidate. Ties go to the earliest one in iteration
/// order; NaN scores never win.
pub fn select_best<T, I, F>(candidates: I, mut score: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> f32,
{
    let mut best: Option<(f32, T)> = None;
    for c in candidates {
        let s = score(&c);
        match &best {
            Some((b, _)) if s.is_nan() || s <= *b => {}
            None if s.is_nan() => {}
            _ => best = Some((s, c)),
        }
    }
    best.map(|(_, c)| c)
}
