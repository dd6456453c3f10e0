use flowline_core::Puzzle;
use log::warn;

use crate::{GenerationParams, GeneratorConfig, PuzzleSeed, fallback, primary};

/// A puzzle together with the seed it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratedPuzzle {
    /// The puzzle, anchors and canonical solution.
    pub puzzle: Puzzle,
    /// Seed that reproduces this puzzle with the same parameters and config.
    pub seed: PuzzleSeed,
    /// `true` if the primary generator gave up and the fallback built the puzzle.
    ///
    /// Fallback puzzles are valid too, but their color count may leave the
    /// requested range on grids that cannot hold it.
    pub used_fallback: bool,
}

/// Generates puzzles for fixed parameters.
///
/// The primary generator runs first. If it exhausts
/// [`GeneratorConfig::attempt_budget`], the fallback generator continues from the
/// same random stream, so a seed always determines the result.
///
/// # Examples
///
/// ```
/// use flowline_core::validate;
/// use flowline_generator::{GenerationParams, PuzzleGenerator, PuzzleSeed};
///
/// let params = GenerationParams::new(5, 5, 4, 5, None)?;
/// let generator = PuzzleGenerator::new(params);
///
/// let a = generator.generate_with_seed(PuzzleSeed::new(42));
/// let b = generator.generate_with_seed(PuzzleSeed::new(42));
/// assert_eq!(a, b);
/// assert!(!a.used_fallback);
/// assert!(validate(&a.puzzle).is_ok());
/// # Ok::<(), flowline_generator::ParameterError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PuzzleGenerator {
    params: GenerationParams,
    config: GeneratorConfig,
}

impl PuzzleGenerator {
    /// Creates a generator with the default [`GeneratorConfig`].
    #[must_use]
    pub fn new(params: GenerationParams) -> Self {
        Self {
            params,
            config: GeneratorConfig::default(),
        }
    }

    /// Replaces the generator tunables.
    #[must_use]
    pub fn with_config(self, config: GeneratorConfig) -> Self {
        Self { config, ..self }
    }

    /// The generation parameters.
    #[must_use]
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// The generator tunables.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a puzzle from a fresh random seed.
    #[must_use]
    pub fn generate(&self) -> GeneratedPuzzle {
        self.generate_with_seed(PuzzleSeed::random())
    }

    /// Generates the puzzle determined by `seed`.
    #[must_use]
    pub fn generate_with_seed(&self, seed: PuzzleSeed) -> GeneratedPuzzle {
        let mut rng = seed.rng();
        if let Some(puzzle) = primary::generate(&self.params, &self.config, &mut rng) {
            return GeneratedPuzzle {
                puzzle,
                seed,
                used_fallback: false,
            };
        }

        warn!(
            "primary generator gave up on {} (seed {seed}), using fallback",
            self.params.size()
        );
        GeneratedPuzzle {
            puzzle: fallback::generate(&self.params, &mut rng),
            seed,
            used_fallback: true,
        }
    }
}
