//! tetrad-engine - action generation over core snapshots.
//!
//! Single-step actions, drop-action enumeration, and applying or replaying
//! actions against the snapshot they came from.

pub mod apply;
pub mod error;
pub mod movegen;
pub mod movement;

pub use apply::{apply, lock, replay, Action};
pub use error::EngineError;
pub use movegen::{drop_actions, DropAction, FAST_FORWARD_MARGIN};
pub use movement::{single_step_actions, try_step, SingleStepAction, StepKind, StepList};
