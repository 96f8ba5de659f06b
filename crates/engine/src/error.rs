use thiserror::Error;

/// Invalid operations against a snapshot. Always recoverable: re-query the
/// current actions and try again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("action was not generated from this snapshot")]
    StaleAction,
    #[error("snapshot has no active piece")]
    NoActivePiece,
    #[error("recorded path no longer reproduces at step {step}")]
    ReplayDiverged { step: usize },
}
