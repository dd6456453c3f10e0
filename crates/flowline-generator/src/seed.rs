//! Puzzle seeds and the deterministic random number generator.

use std::{fmt, num::ParseIntError, str::FromStr};

use rand::{RngExt as _, SeedableRng as _};

/// Random number generator used by the generators.
///
/// PCG with 64-bit state and 32-bit output: fast, well distributed and with a
/// period far beyond anything a grid of at most a few thousand cells consumes.
pub type LevelRng = rand_pcg::Pcg32;

/// Seed from which a puzzle is generated.
///
/// The same seed and parameters always yield the same puzzle. Puzzles generated
/// without an explicit seed draw one from the operating system, and the seed is
/// recorded with the result so any puzzle can be reproduced later.
///
/// # Examples
///
/// ```
/// use flowline_generator::PuzzleSeed;
///
/// let seed = PuzzleSeed::from_date(2024, 1, 15);
/// assert_eq!(seed.value(), 20_240_115);
/// assert_eq!(seed.to_string(), "20240115");
/// assert_eq!("20240115".parse::<PuzzleSeed>().unwrap(), seed);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PuzzleSeed(u32);

/// Error returned when parsing a seed fails.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid puzzle seed: {_0}")]
pub struct SeedParseError(ParseIntError);

impl PuzzleSeed {
    /// Creates a seed from a raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Draws a fresh seed from the thread-local, OS-seeded generator.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::rng().random())
    }

    /// Seed of the daily puzzle: `year * 10000 + month * 100 + day`.
    #[must_use]
    pub const fn from_date(year: u32, month: u32, day: u32) -> Self {
        Self(year * 10_000 + month * 100 + day)
    }

    /// The raw seed value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Creates the generator for this seed.
    #[must_use]
    pub fn rng(self) -> LevelRng {
        make_rng(self)
    }
}

/// Creates a deterministic generator for `seed`.
#[must_use]
pub fn make_rng(seed: PuzzleSeed) -> LevelRng {
    LevelRng::seed_from_u64(u64::from(seed.0))
}

/// Draws a float in `[0, 1)`.
pub fn next_unit(rng: &mut LevelRng) -> f64 {
    rng.random::<f64>()
}

impl fmt::Display for PuzzleSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PuzzleSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self).map_err(SeedParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = make_rng(PuzzleSeed::new(42));
        let mut b = make_rng(PuzzleSeed::new(42));
        for _ in 0..100 {
            assert_eq!(next_unit(&mut a).to_bits(), next_unit(&mut b).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = make_rng(PuzzleSeed::new(1));
        let mut b = make_rng(PuzzleSeed::new(2));
        let xs: Vec<f64> = (0..8).map(|_| next_unit(&mut a)).collect();
        let ys: Vec<f64> = (0..8).map(|_| next_unit(&mut b)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_unit_range() {
        let mut rng = make_rng(PuzzleSeed::new(7));
        for _ in 0..10_000 {
            let x = next_unit(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_no_short_cycle() {
        // Every draw over a budget larger than the biggest grid is distinct.
        let mut rng = make_rng(PuzzleSeed::new(20_240_115));
        let mut draws: Vec<u64> = (0..4096).map(|_| next_unit(&mut rng).to_bits()).collect();
        draws.sort_unstable();
        draws.dedup();
        assert_eq!(draws.len(), 4096);
    }

    #[test]
    fn test_parse() {
        assert_eq!("42".parse::<PuzzleSeed>(), Ok(PuzzleSeed::new(42)));
        assert_eq!(" 7 ".parse::<PuzzleSeed>(), Ok(PuzzleSeed::new(7)));
        assert!("-1".parse::<PuzzleSeed>().is_err());
        assert!("seed".parse::<PuzzleSeed>().is_err());
    }
}
