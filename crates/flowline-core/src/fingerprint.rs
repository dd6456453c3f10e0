//! Content fingerprints and the seen-fingerprint set.
//!
//! A [`Fingerprint`] identifies a puzzle by its dimensions and anchor layout. Two
//! puzzles with the same anchors are treated as the same puzzle even if their
//! solution routing differs.
//!
//! The digest is SHA-256 over a fixed little-endian encoding:
//!
//! ```text
//! width:u64 height:u64 count:u64 (cell:u64 color:u16)*
//! ```
//!
//! with the anchor pairs sorted by `(cell, color)`. The fingerprint is the first
//! eight bytes of the digest in lowercase hex, so it is stable across processes
//! and platforms.

use std::{collections::BTreeSet, fmt, str::FromStr};

use sha2::{Digest as _, Sha256};

use crate::Puzzle;

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 16;

/// A short, deterministic content hash of a puzzle's structure.
///
/// # Examples
///
/// ```
/// use flowline_core::{Fingerprint, GridSize, Path, Puzzle};
///
/// let puzzle = Puzzle::from_paths(
///     GridSize::new(3, 2),
///     vec![Path::new(vec![0, 1, 2]), Path::new(vec![3, 4, 5])],
/// );
/// let fp = Fingerprint::of(&puzzle);
/// assert_eq!(fp.as_str().len(), 16);
/// assert_eq!(fp, fp.as_str().parse().unwrap());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

/// Error returned when parsing a malformed fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "invalid fingerprint {input:?}: expected {} lowercase hex digits",
    FINGERPRINT_LEN
)]
pub struct FingerprintParseError {
    input: String,
}

impl Fingerprint {
    /// Computes the fingerprint of a puzzle.
    #[must_use]
    pub fn of(puzzle: &Puzzle) -> Self {
        let size = puzzle.size();
        let mut pairs: Vec<(usize, u16)> = puzzle
            .anchors()
            .iter()
            .map(|(&cell, &color)| (cell, color.value()))
            .collect();
        pairs.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(encode(size.width()));
        hasher.update(encode(size.height()));
        hasher.update(encode(pairs.len()));
        for (cell, color) in pairs {
            hasher.update(encode(cell));
            hasher.update(color.to_le_bytes());
        }
        let digest = hasher.finalize();

        let mut hex = String::with_capacity(FINGERPRINT_LEN);
        for byte in &digest[..FINGERPRINT_LEN / 2] {
            hex.push(hex_digit(byte >> 4));
            hex.push(hex_digit(byte & 0x0f));
        }
        Self(hex)
    }

    /// The fingerprint as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn encode(value: usize) -> [u8; 8] {
    u64::try_from(value).unwrap_or(u64::MAX).to_le_bytes()
}

fn hex_digit(nibble: u8) -> char {
    char::from(b"0123456789abcdef"[usize::from(nibble)])
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == FINGERPRINT_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(FingerprintParseError {
                input: s.to_owned(),
            });
        }
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = FingerprintParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

/// The fingerprints a player has already encountered.
///
/// The set is a plain value: it is handed to the generation core, never held as
/// shared state by it. Recording a fingerprint consumes the set and returns the
/// extended one; nothing is ever removed. Persisting the set is up to the caller.
///
/// # Examples
///
/// ```
/// use flowline_core::{Fingerprint, SeenFingerprints};
///
/// let fp: Fingerprint = "0123456789abcdef".parse().unwrap();
/// let seen = SeenFingerprints::new();
/// assert!(!seen.contains(&fp));
///
/// let seen = seen.with(fp.clone());
/// assert!(seen.contains(&fp));
/// assert_eq!(seen.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SeenFingerprints(BTreeSet<Fingerprint>);

impl SeenFingerprints {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the fingerprint was seen before.
    #[must_use]
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.0.contains(fingerprint)
    }

    /// Returns the set extended with `fingerprint`.
    #[must_use]
    pub fn with(mut self, fingerprint: Fingerprint) -> Self {
        self.0.insert(fingerprint);
        self
    }

    /// Returns the union of two snapshots.
    ///
    /// Used to merge the results of generation requests that ran concurrently on
    /// copies of the same set.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Number of fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no fingerprint was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the fingerprints in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.0.iter()
    }
}

impl FromIterator<Fingerprint> for SeenFingerprints {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SeenFingerprints {
    type Item = Fingerprint;
    type IntoIter = std::collections::btree_set::IntoIter<Fingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
