//! Error types for crossfill.
//!
//! Failing to find a fill is not an error: see `FillFailure` and `ArcConsistencyFailure`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// The grid structure can't be turned into a puzzle.
#[derive(Debug, Error)]
pub enum MalformedStructureError {
    #[error("grid has no cells")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("grid has no open cells")]
    NoOpenCells,

    #[error("couldn't read structure file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The word list couldn't be loaded.
#[derive(Debug, Error)]
pub enum WordListError {
    #[error("couldn't read word list '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("word list '{}' has no words", path.display())]
    Empty { path: PathBuf },
}

/// Main error type for crossfill operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed structure: {0}")]
    Structure(#[from] MalformedStructureError),

    #[error(transparent)]
    WordList(#[from] WordListError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("couldn't write '{}'", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for crossfill operations.
pub type Result<T> = std::result::Result<T, Error>;
