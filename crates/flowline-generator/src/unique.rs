//! Searching for a puzzle the player has not seen yet.
//!
//! A [`UniqueSearch`] repeatedly asks a [`CandidateSource`] for a puzzle, validates
//! it, and compares its [`Fingerprint`] against the player's
//! [`SeenFingerprints`]. The first valid, unseen candidate is accepted and its
//! fingerprint recorded. When the attempt bound runs out, the last candidate is
//! returned anyway together with a [`GenerationWarning`], so the caller always has
//! a puzzle to show.
//!
//! The search is a resumable step function: [`UniqueSearch::step`] runs exactly one
//! attempt and hands the search back, so the host decides when the next attempt
//! runs. [`UniqueSearch::run`] drives it to completion with a callback between
//! attempts.
//!
//! ```text
//! START -> GENERATE -> VALIDATE -> CHECK_UNIQUE -> ACCEPTED
//!             ^           |             |
//!             +-----------+-------------+   (until attempts run out -> EXHAUSTED)
//! ```

use flowline_core::{Fingerprint, SeenFingerprints, ValidationError, validate};
use log::{debug, info, warn};

use crate::{GeneratedPuzzle, GenerationParams, PuzzleGenerator};

/// Attempt bound for requests a player is waiting on.
pub const INTERACTIVE_MAX_ATTEMPTS: usize = 25;

/// Attempt bound for background and bulk pre-generation.
pub const BULK_MAX_ATTEMPTS: usize = 200;

/// Something that produces candidate puzzles.
///
/// Implemented for [`PuzzleGenerator`] and for any `FnMut() -> GeneratedPuzzle`.
pub trait CandidateSource {
    /// Produces the next candidate.
    fn next_candidate(&mut self) -> GeneratedPuzzle;
}

impl CandidateSource for PuzzleGenerator {
    fn next_candidate(&mut self) -> GeneratedPuzzle {
        self.generate()
    }
}

impl<F> CandidateSource for F
where
    F: FnMut() -> GeneratedPuzzle,
{
    fn next_candidate(&mut self) -> GeneratedPuzzle {
        self()
    }
}

/// Why a candidate was discarded.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Rejection {
    /// The candidate breaks a puzzle rule.
    #[display("invalid candidate: {_0}")]
    Invalid(ValidationError),
    /// The player has already seen a puzzle with this fingerprint.
    #[display("candidate {_0} was already seen")]
    Seen(Fingerprint),
}

/// Why an exhausted search returned a puzzle that is not what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GenerationWarning {
    /// The returned puzzle is valid but the player has seen it before.
    #[display("no unseen puzzle found, the puzzle may be a repeat")]
    NotUnique,
    /// The returned puzzle breaks a rule.
    #[display("no valid puzzle found, the puzzle may have issues ({_0})")]
    Invalid(ValidationError),
}

/// Progress passed to the callback of [`UniqueSearch::run`] between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    /// Attempts made so far.
    pub attempt: usize,
    /// The attempt bound.
    pub max_attempts: usize,
    /// Why the latest candidate was discarded.
    pub rejection: Rejection,
}

/// Result of a finished search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueOutcome {
    /// The accepted puzzle, or the last candidate if the search was exhausted.
    ///
    /// `None` only when no attempt was allowed at all.
    pub puzzle: Option<GeneratedPuzzle>,
    /// Fingerprint of [`puzzle`](Self::puzzle).
    pub fingerprint: Option<Fingerprint>,
    /// `true` if the puzzle is valid and was not in the seen set.
    pub is_unique: bool,
    /// Number of candidates generated.
    pub attempts_used: usize,
    /// The seen set, extended with the accepted fingerprint.
    ///
    /// Unchanged when the search was exhausted.
    pub seen: SeenFingerprints,
    /// Set when the search was exhausted and a fallback answer was returned.
    pub warning: Option<GenerationWarning>,
}

/// State after one call to [`UniqueSearch::step`].
#[derive(Debug)]
pub enum SearchStatus<S> {
    /// The candidate was discarded and attempts remain.
    Pending {
        /// The search, ready for its next attempt.
        search: UniqueSearch<S>,
        /// Why the candidate was discarded.
        rejection: Rejection,
    },
    /// The search is over.
    Done(UniqueOutcome),
}

#[derive(Debug)]
struct LastCandidate {
    candidate: GeneratedPuzzle,
    fingerprint: Fingerprint,
    warning: GenerationWarning,
}

/// A resumable search for a valid, unseen puzzle.
///
/// # Examples
///
/// Driving the search one attempt at a time:
///
/// ```
/// use flowline_core::SeenFingerprints;
/// use flowline_generator::{
///     GenerationParams, INTERACTIVE_MAX_ATTEMPTS, PuzzleGenerator, SearchStatus, UniqueSearch,
/// };
///
/// let params = GenerationParams::new(5, 5, 4, 5, None)?;
/// let mut search = UniqueSearch::new(
///     PuzzleGenerator::new(params),
///     SeenFingerprints::new(),
///     INTERACTIVE_MAX_ATTEMPTS,
/// );
/// let outcome = loop {
///     match search.step() {
///         // A real host would return to its event loop here.
///         SearchStatus::Pending { search: next, .. } => search = next,
///         SearchStatus::Done(outcome) => break outcome,
///     }
/// };
/// assert!(outcome.is_unique);
/// assert_eq!(outcome.seen.len(), 1);
/// # Ok::<(), flowline_generator::ParameterError>(())
/// ```
#[derive(Debug)]
pub struct UniqueSearch<S> {
    source: S,
    seen: SeenFingerprints,
    max_attempts: usize,
    attempts: usize,
    last: Option<LastCandidate>,
}

impl<S> UniqueSearch<S>
where
    S: CandidateSource,
{
    /// Creates a search over candidates from `source`.
    ///
    /// `seen` is a snapshot of the player's seen set; the search only reads it and
    /// returns the extended set in the [`UniqueOutcome`].
    #[must_use]
    pub fn new(source: S, seen: SeenFingerprints, max_attempts: usize) -> Self {
        Self {
            source,
            seen,
            max_attempts,
            attempts: 0,
            last: None,
        }
    }

    /// Attempts made so far.
    #[must_use]
    pub fn attempts_used(&self) -> usize {
        self.attempts
    }

    /// The attempt bound.
    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// The seen set the search checks against.
    #[must_use]
    pub fn seen(&self) -> &SeenFingerprints {
        &self.seen
    }

    /// Runs one attempt.
    ///
    /// Returns [`SearchStatus::Pending`] when the candidate was discarded and
    /// another attempt is allowed, and [`SearchStatus::Done`] otherwise.
    #[must_use]
    pub fn step(mut self) -> SearchStatus<S> {
        if self.attempts >= self.max_attempts {
            return SearchStatus::Done(self.exhausted());
        }
        self.attempts += 1;

        let candidate = self.source.next_candidate();
        let fingerprint = Fingerprint::of(&candidate.puzzle);
        let rejection = match validate(&candidate.puzzle) {
            Err(err) => {
                debug!(
                    "attempt {}: rejected candidate (seed {}, fallback {}): {err}",
                    self.attempts, candidate.seed, candidate.used_fallback
                );
                self.last = Some(LastCandidate {
                    candidate,
                    fingerprint,
                    warning: GenerationWarning::Invalid(err.clone()),
                });
                Rejection::Invalid(err)
            }
            Ok(()) if self.seen.contains(&fingerprint) => {
                debug!(
                    "attempt {}: candidate {fingerprint} already seen",
                    self.attempts
                );
                self.last = Some(LastCandidate {
                    candidate,
                    fingerprint: fingerprint.clone(),
                    warning: GenerationWarning::NotUnique,
                });
                Rejection::Seen(fingerprint)
            }
            Ok(()) => {
                info!(
                    "accepted puzzle {fingerprint} after {} attempts",
                    self.attempts
                );
                return SearchStatus::Done(UniqueOutcome {
                    puzzle: Some(candidate),
                    fingerprint: Some(fingerprint.clone()),
                    is_unique: true,
                    attempts_used: self.attempts,
                    seen: self.seen.with(fingerprint),
                    warning: None,
                });
            }
        };

        if self.attempts >= self.max_attempts {
            return SearchStatus::Done(self.exhausted());
        }
        SearchStatus::Pending {
            search: self,
            rejection,
        }
    }

    /// Runs the search to completion, calling `on_yield` between attempts.
    pub fn run<F>(self, mut on_yield: F) -> UniqueOutcome
    where
        F: FnMut(&AttemptReport),
    {
        let mut search = self;
        loop {
            match search.step() {
                SearchStatus::Pending {
                    search: next,
                    rejection,
                } => {
                    on_yield(&AttemptReport {
                        attempt: next.attempts,
                        max_attempts: next.max_attempts,
                        rejection,
                    });
                    search = next;
                }
                SearchStatus::Done(outcome) => return outcome,
            }
        }
    }

    fn exhausted(self) -> UniqueOutcome {
        let Some(last) = self.last else {
            return UniqueOutcome {
                puzzle: None,
                fingerprint: None,
                is_unique: false,
                attempts_used: self.attempts,
                seen: self.seen,
                warning: None,
            };
        };
        warn!(
            "no valid unseen puzzle in {} attempts, returning last candidate: {}",
            self.attempts, last.warning
        );
        UniqueOutcome {
            puzzle: Some(last.candidate),
            fingerprint: Some(last.fingerprint),
            is_unique: false,
            attempts_used: self.attempts,
            seen: self.seen,
            warning: Some(last.warning),
        }
    }
}

/// Generates a puzzle that is valid and not in `seen`.
///
/// Runs a [`UniqueSearch`] over a [`PuzzleGenerator`] with random seeds.
///
/// # Examples
///
/// ```
/// use flowline_core::SeenFingerprints;
/// use flowline_generator::{GenerationParams, generate_unique};
///
/// let params = GenerationParams::for_grid(6, 6, None)?;
/// let first = generate_unique(&params, SeenFingerprints::new(), 25);
/// assert!(first.is_unique);
///
/// let second = generate_unique(&params, first.seen, 25);
/// assert!(second.is_unique);
/// assert_ne!(first.fingerprint, second.fingerprint);
/// assert_eq!(second.seen.len(), 2);
/// # Ok::<(), flowline_generator::ParameterError>(())
/// ```
#[must_use]
pub fn generate_unique(
    params: &GenerationParams,
    seen: SeenFingerprints,
    max_attempts: usize,
) -> UniqueOutcome {
    UniqueSearch::new(PuzzleGenerator::new(*params), seen, max_attempts).run(|report| {
        debug!(
            "unique search {}/{}: {}",
            report.attempt, report.max_attempts, report.rejection
        );
    })
}

#[cfg(test)]
mod tests {
    use flowline_core::{GridSize, Path, Puzzle};

    use super::*;
    use crate::PuzzleSeed;

    fn generated(puzzle: Puzzle) -> GeneratedPuzzle {
        GeneratedPuzzle {
            puzzle,
            seed: PuzzleSeed::new(0),
            used_fallback: false,
        }
    }

    fn columns() -> GeneratedPuzzle {
        generated(Puzzle::from_paths(
            GridSize::new(3, 3),
            vec![
                Path::new(vec![0, 3, 6]),
                Path::new(vec![1, 4, 7]),
                Path::new(vec![2, 5, 8]),
            ],
        ))
    }

    fn stripes() -> GeneratedPuzzle {
        generated(Puzzle::from_paths(
            GridSize::new(3, 3),
            vec![
                Path::new(vec![0, 1, 2]),
                Path::new(vec![3, 4, 5]),
                Path::new(vec![6, 7, 8]),
            ],
        ))
    }

    fn with_gap() -> GeneratedPuzzle {
        generated(Puzzle::from_paths(
            GridSize::new(3, 3),
            vec![Path::new(vec![0, 1, 2]), Path::new(vec![3, 4, 5])],
        ))
    }

    /// Returns `first` for `k` calls, then `then` forever.
    fn stub(
        first: GeneratedPuzzle,
        k: usize,
        then: GeneratedPuzzle,
    ) -> impl FnMut() -> GeneratedPuzzle {
        let mut calls = 0;
        move || {
            calls += 1;
            if calls <= k { first.clone() } else { then.clone() }
        }
    }

    #[test]
    fn test_skips_seen_until_new_fingerprint() {
        let f = Fingerprint::of(&columns().puzzle);
        let g = Fingerprint::of(&stripes().puzzle);
        let seen = SeenFingerprints::new().with(f.clone());

        let mut yields = 0;
        let outcome = UniqueSearch::new(stub(columns(), 3, stripes()), seen, 10).run(|report| {
            yields += 1;
            assert_eq!(report.rejection, Rejection::Seen(f.clone()));
        });

        assert_eq!(outcome.puzzle, Some(stripes()));
        assert_eq!(outcome.fingerprint, Some(g.clone()));
        assert!(outcome.is_unique);
        assert_eq!(outcome.attempts_used, 4);
        assert_eq!(outcome.warning, None);
        assert!(outcome.seen.contains(&f));
        assert!(outcome.seen.contains(&g));
        assert_eq!(yields, 3);
    }

    #[test]
    fn test_exhausted_returns_last_seen_candidate() {
        let f = Fingerprint::of(&columns().puzzle);
        let seen = SeenFingerprints::new().with(f.clone());

        let mut yields = 0;
        let outcome =
            UniqueSearch::new(stub(columns(), usize::MAX, stripes()), seen.clone(), 5)
                .run(|_| yields += 1);

        assert_eq!(outcome.puzzle, Some(columns()));
        assert_eq!(outcome.fingerprint, Some(f));
        assert!(!outcome.is_unique);
        assert_eq!(outcome.attempts_used, 5);
        assert_eq!(outcome.seen, seen);
        assert_eq!(outcome.warning, Some(GenerationWarning::NotUnique));
        assert_eq!(yields, 4);
    }

    #[test]
    fn test_invalid_candidates_are_rejected() {
        let outcome = UniqueSearch::new(stub(with_gap(), 2, stripes()), SeenFingerprints::new(), 10)
            .run(|report| assert!(matches!(report.rejection, Rejection::Invalid(_))));
        assert_eq!(outcome.puzzle, Some(stripes()));
        assert_eq!(outcome.attempts_used, 3);
        assert_eq!(outcome.seen.len(), 1);
    }

    #[test]
    fn test_exhausted_with_invalid_candidate_warns() {
        let mut fallback = with_gap();
        fallback.used_fallback = true;
        let outcome = UniqueSearch::new(
            stub(fallback.clone(), usize::MAX, stripes()),
            SeenFingerprints::new(),
            3,
        )
        .run(|_| {});
        assert_eq!(outcome.puzzle, Some(fallback));
        assert!(!outcome.is_unique);
        assert!(matches!(
            outcome.warning,
            Some(GenerationWarning::Invalid(ValidationError::Uncovered { cell: 6 }))
        ));
        assert!(outcome.seen.is_empty());
    }

    #[test]
    fn test_step_hands_back_control() {
        let f = Fingerprint::of(&columns().puzzle);
        let seen = SeenFingerprints::new().with(f.clone());
        let search = UniqueSearch::new(stub(columns(), 1, stripes()), seen, 10);

        let SearchStatus::Pending { search, rejection } = search.step() else {
            panic!("first candidate should be rejected");
        };
        assert_eq!(rejection, Rejection::Seen(f));
        assert_eq!(search.attempts_used(), 1);

        let SearchStatus::Done(outcome) = search.step() else {
            panic!("second candidate should be accepted");
        };
        assert!(outcome.is_unique);
        assert_eq!(outcome.attempts_used, 2);
    }

    #[test]
    fn test_zero_attempts_yields_nothing() {
        let outcome = UniqueSearch::new(stub(stripes(), 0, stripes()), SeenFingerprints::new(), 0)
            .run(|_| panic!("no attempt should run"));
        assert_eq!(outcome.puzzle, None);
        assert_eq!(outcome.fingerprint, None);
        assert!(!outcome.is_unique);
        assert_eq!(outcome.attempts_used, 0);
        assert_eq!(outcome.warning, None);
    }

    #[test]
    fn test_generate_unique_records_fingerprint() {
        let params = GenerationParams::new(5, 5, 4, 5, None).unwrap();
        let outcome = generate_unique(&params, SeenFingerprints::new(), INTERACTIVE_MAX_ATTEMPTS);
        let puzzle = outcome.puzzle.unwrap();
        assert!(outcome.is_unique);
        assert_eq!(validate(&puzzle.puzzle), Ok(()));
        assert_eq!(outcome.fingerprint, Some(Fingerprint::of(&puzzle.puzzle)));
        assert_eq!(outcome.seen.len(), 1);
    }

    #[test]
    fn test_seeded_generator_skips_seen_puzzle() {
        let params = GenerationParams::for_grid(6, 6, None).unwrap();
        let generator = PuzzleGenerator::new(params);
        let first = generator.generate_with_seed(PuzzleSeed::new(1));
        let seen = SeenFingerprints::new().with(Fingerprint::of(&first.puzzle));

        let mut seeds = [1, 1, 2].into_iter();
        let source = move || generator.generate_with_seed(PuzzleSeed::new(seeds.next().unwrap()));
        let outcome = UniqueSearch::new(source, seen, 3).run(|report| {
            assert!(matches!(report.rejection, Rejection::Seen(_)));
        });

        let puzzle = outcome.puzzle.unwrap();
        assert!(outcome.is_unique);
        assert_eq!(outcome.attempts_used, 3);
        assert_eq!(puzzle.seed, PuzzleSeed::new(2));
        assert_eq!(validate(&puzzle.puzzle), Ok(()));
        assert_eq!(outcome.seen.len(), 2);
    }
}
