//! Puzzle generation for connect-the-dots path puzzles.
//!
//! # Overview
//!
//! - [`PuzzleGenerator`] turns [`GenerationParams`] and a [`PuzzleSeed`] into a
//!   [`GeneratedPuzzle`]. It runs the [`primary`] generator (randomized path
//!   growing) and, if that exhausts its attempt budget, the [`fallback`] generator
//!   (partition and linearize). Both hand their layouts to a local repair stage
//!   that reshapes paths without ever letting one touch itself.
//! - [`UniqueSearch`] and [`generate_unique`] retry generation until they find a
//!   valid puzzle whose fingerprint is not in the player's seen set.
//! - [`daily_puzzle`] builds the 8x8 puzzle of the day from a date.
//!
//! Generation is deterministic: the same parameters, config and seed always give
//! the same puzzle.
//!
//! # Examples
//!
//! ```
//! use flowline_core::{SeenFingerprints, validate};
//! use flowline_generator::{GenerationParams, INTERACTIVE_MAX_ATTEMPTS, generate_unique};
//!
//! let params = GenerationParams::new(7, 7, 5, 7, None)?;
//! let outcome = generate_unique(&params, SeenFingerprints::new(), INTERACTIVE_MAX_ATTEMPTS);
//!
//! let generated = outcome.puzzle.expect("at least one attempt was allowed");
//! assert!(outcome.is_unique);
//! assert!(validate(&generated.puzzle).is_ok());
//! assert_eq!(outcome.seen.len(), 1);
//! println!("seed {}:\n{}", generated.seed, generated.puzzle);
//! # Ok::<(), flowline_generator::ParameterError>(())
//! ```

mod daily;
pub mod fallback;
mod generator;
mod params;
pub mod primary;
mod repair;
mod seed;
mod unique;

pub use self::{
    daily::{DAILY_GRID_SIDE, DailyError, daily_puzzle, daily_seed},
    generator::{GeneratedPuzzle, PuzzleGenerator},
    params::{
        DEFAULT_PALETTE_SIZE, GenerationParams, GeneratorConfig, MIN_GRID_SIDE, MIN_PATH_CELLS,
        ParameterError,
    },
    seed::{LevelRng, PuzzleSeed, SeedParseError, make_rng, next_unit},
    unique::{
        AttemptReport, BULK_MAX_ATTEMPTS, CandidateSource, GenerationWarning,
        INTERACTIVE_MAX_ATTEMPTS, Rejection, SearchStatus, UniqueOutcome, UniqueSearch,
        generate_unique,
    },
};
