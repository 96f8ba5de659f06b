//! Batch runner - many independent games on the rayon pool.

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tetrad_core::{BoardConfig, ConfigError, Snapshot};
use tetrad_engine::EngineError;
use tetrad_eval::EvalError;

use crate::game::{play_game, GameResult, Randomizer, ShapeSource};
use crate::strategy::{GreedyDrop, Strategy};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("invalid runner config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("batch needs at least one game")]
    NoGames,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub board: BoardConfig,
    pub games: usize,
    /// Per-game cap on placed pieces.
    pub max_pieces: usize,
    /// Game `i` is seeded with `seed + i`.
    pub seed: u64,
    pub randomizer: Randomizer,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            games: 20,
            max_pieces: 500,
            seed: 0,
            randomizer: Randomizer::default(),
        }
    }
}

impl RunnerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, RunnerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        self.board.validate()?;
        if self.games == 0 {
            return Err(RunnerError::NoGames);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub games: usize,
    pub mean_lines: f64,
    pub min_lines: usize,
    pub max_lines: usize,
    pub mean_pieces: f64,
    pub topped_out: usize,
}

impl BatchStats {
    pub fn from_results(results: &[GameResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let n = results.len() as f64;
        let lines = results.iter().map(|r| r.lines_cleared);
        Self {
            games: results.len(),
            mean_lines: lines.clone().sum::<usize>() as f64 / n,
            min_lines: lines.clone().min().unwrap_or(0),
            max_lines: lines.max().unwrap_or(0),
            mean_pieces: results.iter().map(|r| r.pieces_placed).sum::<usize>() as f64 / n,
            topped_out: results.iter().filter(|r| r.topped_out).count(),
        }
    }
}

/// Run `config.games` games in parallel. Results are collected in game
/// order before aggregation, so stats do not depend on thread count.
pub fn run_batch<S: Strategy + Sync + ?Sized>(
    config: &RunnerConfig,
    strategy: &S,
) -> Result<BatchStats, RunnerError> {
    config.validate()?;
    let board = Snapshot::new(config.board);

    let results = (0..config.games)
        .into_par_iter()
        .map(|i| {
            let mut source = ShapeSource::new(config.randomizer, config.seed.wrapping_add(i as u64));
            let r = play_game(&board, strategy, &mut source, config.max_pieces)?;
            debug!(
                "game {}: {} pieces, {} lines, topped out: {}",
                i, r.pieces_placed, r.lines_cleared, r.topped_out
            );
            Ok(r)
        })
        .collect::<Result<Vec<_>, RunnerError>>()?;

    let stats = BatchStats::from_results(&results);
    info!(
        "{} games: mean {:.1} lines (min {}, max {}), {} topped out",
        stats.games, stats.mean_lines, stats.min_lines, stats.max_lines, stats.topped_out
    );
    Ok(stats)
}

/// Greedy drop play with weights from a flat parameter vector, for
/// black-box optimizers.
pub fn run_with_params(config: &RunnerConfig, params: &[f32]) -> Result<BatchStats, RunnerError> {
    let strategy = GreedyDrop::from_params(params)?;
    run_batch(config, &strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tetrad_eval::EvalWeights;

    fn small_config() -> RunnerConfig {
        RunnerConfig {
            games: 4,
            max_pieces: 15,
            seed: 11,
            ..RunnerConfig::default()
        }
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config = RunnerConfig::from_json_str(r#"{"games": 3, "randomizer": "uniform"}"#)
            .expect("valid config");
        assert_eq!(config.games, 3);
        assert_eq!(config.randomizer, Randomizer::Uniform);
        assert_eq!(config.board, BoardConfig::default());
        assert_eq!(config.max_pieces, 500);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            RunnerConfig::from_json_str(r#"{"games": 0}"#),
            Err(RunnerError::NoGames)
        ));
        assert!(matches!(
            RunnerConfig::from_json_str(r#"{"board": {"width": 2}}"#),
            Err(RunnerError::Config(ConfigError::Width(2)))
        ));
        assert!(matches!(
            RunnerConfig::from_json_str("{"),
            Err(RunnerError::Json(_))
        ));
    }

    #[test]
    fn test_stats_aggregation() {
        let results = [
            GameResult {
                pieces_placed: 10,
                lines_cleared: 2,
                topped_out: false,
            },
            GameResult {
                pieces_placed: 20,
                lines_cleared: 6,
                topped_out: true,
            },
        ];
        let stats = BatchStats::from_results(&results);
        assert_eq!(stats.games, 2);
        assert_eq!(stats.mean_lines, 4.0);
        assert_eq!(stats.min_lines, 2);
        assert_eq!(stats.max_lines, 6);
        assert_eq!(stats.mean_pieces, 15.0);
        assert_eq!(stats.topped_out, 1);
        assert_eq!(BatchStats::from_results(&[]), BatchStats::default());
    }

    #[test]
    fn test_batch_respects_caps() {
        let stats = run_batch(&small_config(), &GreedyDrop::default()).expect("batch");
        assert_eq!(stats.games, 4);
        assert!(stats.mean_pieces <= 15.0);
    }

    #[test]
    fn test_batch_deterministic_across_pools() {
        let config = small_config();
        let strategy = GreedyDrop::default();
        let wide = run_batch(&config, &strategy).expect("batch");
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .expect("pool");
        let single = pool
            .install(|| run_batch(&config, &strategy))
            .expect("batch");
        assert_eq!(wide, single);
    }

    #[test]
    fn test_run_with_params() {
        let stats = run_with_params(&small_config(), &EvalWeights::default().to_params())
            .expect("batch");
        assert_eq!(stats.games, 4);
        assert!(matches!(
            run_with_params(&small_config(), &[1.0]),
            Err(RunnerError::Eval(EvalError::Arity { .. }))
        ));
    }
}
