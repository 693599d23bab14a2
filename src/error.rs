/// Error taxonomy for configuration, level construction and grid access.
///
/// Configuration errors abort level setup before any frame runs.
/// `OutOfRange` is a contract violation and is surfaced as-is, never clamped.
/// Per-frame simulation has no error paths.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entity::EntityKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("level has no rows")]
    NoRows,
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },
    #[error("symbol {symbol:?} at row {row}, column {col} has no legend entry")]
    UnmappedSymbol { symbol: char, row: usize, col: usize },
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfRange { row: usize, col: usize, rows: usize, cols: usize },
}

impl GridError {
    /// Malformed level data, as opposed to a bad lookup.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, GridError::OutOfRange { .. })
    }
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("second player spawn at row {row}, column {col}")]
    DuplicatePlayer { row: usize, col: usize },
    #[error("{kind:?} at ({x}, {y}) is buried in terrain with no room above")]
    SpawnBlocked { kind: EntityKind, x: f64, y: f64 },
    #[error("could not read level {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("legend key {0:?} must be a single character")]
    BadLegendKey(String),
    #[error("{key} must be a positive number, got {value}")]
    NonPositive { key: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_not_configuration() {
        let e = GridError::OutOfRange { row: 9, col: 0, rows: 3, cols: 4 };
        assert!(!e.is_configuration());
        assert!(GridError::NoRows.is_configuration());
        assert!(GridError::UnmappedSymbol { symbol: 'Q', row: 0, col: 0 }.is_configuration());
    }

    #[test]
    fn messages_name_the_cell() {
        let e = GridError::RaggedRow { row: 2, expected: 26, actual: 25 };
        assert_eq!(e.to_string(), "row 2 has 25 cells, expected 26");
        let l: LevelError = GridError::OutOfRange { row: 5, col: 1, rows: 3, cols: 4 }.into();
        assert_eq!(l.to_string(), "cell (5, 1) is outside the 3x4 grid");
    }
}
