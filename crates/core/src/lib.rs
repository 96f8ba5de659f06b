//! Tetrad core crate - piece geometry and immutable board snapshots.

mod board;
mod config;
mod moves;
mod piece;
pub mod query;
mod state;

pub use board::CellSet;
pub use config::{BoardConfig, ConfigError};
pub use moves::Move;
pub use piece::{rotate_left, rotate_right, Offsets, PieceKey, PlacedPiece, Point, Shape};
pub use state::{Snapshot, Transition};
