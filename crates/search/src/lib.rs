//! tetrad-search - decision strategies and game running on top of the engine.

mod game;
mod runner;
mod strategy;

pub use game::{play_game, GameResult, Randomizer, ShapeSource};
pub use runner::{run_batch, run_with_params, BatchStats, RunnerConfig, RunnerError};
pub use strategy::{Decision, GreedyDrop, GreedyStep, Strategy};
