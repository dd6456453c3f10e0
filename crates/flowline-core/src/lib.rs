//! Core data structures for connect-the-dots path puzzles.
//!
//! A puzzle is a `width × height` grid partitioned into colored paths. Each color
//! has two anchor cells, and the player joins every pair of anchors with a path so
//! that the paths fill the whole grid without crossing.
//!
//! # Overview
//!
//! - [`grid`]: linear cell indices, positions and orthogonal neighbors
//! - [`puzzle`]: [`ColorId`], [`Path`] and [`Puzzle`] (anchors plus the canonical
//!   solution)
//! - [`validate`](mod@validate): the rule checker every generated puzzle must pass,
//!   and [`check_solution`] for a player's drawing
//! - [`fingerprint`]: structural [`Fingerprint`]s and the [`SeenFingerprints`] set
//!   used to avoid handing a player the same puzzle twice
//!
//! # Examples
//!
//! ```
//! use flowline_core::{Fingerprint, GridSize, Path, Puzzle, SeenFingerprints, validate};
//!
//! let puzzle = Puzzle::from_paths(
//!     GridSize::new(3, 3),
//!     vec![
//!         Path::new(vec![0, 1, 2]),
//!         Path::new(vec![3, 4, 5]),
//!         Path::new(vec![6, 7, 8]),
//!     ],
//! );
//! assert!(validate(&puzzle).is_ok());
//!
//! let fp = Fingerprint::of(&puzzle);
//! let seen = SeenFingerprints::new().with(fp.clone());
//! assert!(seen.contains(&fp));
//! ```

pub mod fingerprint;
pub mod grid;
pub mod puzzle;
pub mod validate;

pub use self::{
    fingerprint::{Fingerprint, FingerprintParseError, SeenFingerprints},
    grid::{GridSize, Neighbors, Position},
    puzzle::{ColorId, Path, Puzzle, PuzzleParseError},
    validate::{ValidationError, check_solution, validate},
};
