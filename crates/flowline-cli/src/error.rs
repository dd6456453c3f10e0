use std::{io, path::PathBuf};

use flowline_core::{FingerprintParseError, PuzzleParseError};
use flowline_generator::{DailyError, ParameterError};

/// Errors reported by the command-line front end.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub(crate) enum CliError {
    #[display("{_0}")]
    Parameters(ParameterError),
    #[display("{_0}")]
    Daily(DailyError),
    #[display("{}: {source}", path.display())]
    Puzzle {
        path: PathBuf,
        source: PuzzleParseError,
    },
    #[display("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("{}:{line}: {source}", path.display())]
    SeenEntry {
        path: PathBuf,
        line: usize,
        source: FingerprintParseError,
    },
}
