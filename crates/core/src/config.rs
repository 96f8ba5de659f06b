use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board width {0} outside {min}..={max}", min = BoardConfig::MIN_WIDTH, max = BoardConfig::MAX_WIDTH)]
    Width(usize),
    #[error("board height {0} outside {min}..={max}", min = BoardConfig::MIN_HEIGHT, max = BoardConfig::MAX_HEIGHT)]
    Height(usize),
    #[error("expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },
    #[error("row {row} has bits outside the board width")]
    RowOverflow { row: usize },
    #[error("active piece overlaps occupied cells or leaves the board")]
    IllegalPiece,
}

/// Board dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

impl BoardConfig {
    pub const MIN_WIDTH: usize = 4;
    pub const MAX_WIDTH: usize = 256;
    pub const MIN_HEIGHT: usize = 4;
    pub const MAX_HEIGHT: usize = 256;

    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        let config = Self { width, height };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(Self::MIN_WIDTH..=Self::MAX_WIDTH).contains(&self.width) {
            return Err(ConfigError::Width(self.width));
        }
        if !(Self::MIN_HEIGHT..=Self::MAX_HEIGHT).contains(&self.height) {
            return Err(ConfigError::Height(self.height));
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
        }
    }
}
