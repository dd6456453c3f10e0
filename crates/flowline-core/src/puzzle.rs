//! Puzzle data model: colors, paths and the puzzle itself.

use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{GridSize, Neighbors};

/// Identifier of one color (one path) of a puzzle.
///
/// Colors are numbered `0..difficulty`. Mapping them to visual colors is up to
/// the rendering layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::From,
    serde::Serialize,
    serde::Deserialize,
)]
#[display("#{_0}")]
#[serde(transparent)]
pub struct ColorId(u16);

impl ColorId {
    /// Creates a color identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Returns the value as a `usize`, suitable for indexing path lists.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Creates a color from a path-list index.
    ///
    /// Indices past `u16::MAX` saturate to `u16::MAX`, so a puzzle with that many
    /// colors ends up with a shared color and fails [`validate`](crate::validate)
    /// instead of panicking.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(u16::try_from(index).unwrap_or(u16::MAX))
    }
}

/// An ordered sequence of cell indices for one color.
///
/// A well-formed path visits orthogonally adjacent cells, never repeats a cell and
/// starts and ends on the two anchors of its color. The type itself does not
/// enforce this; [`validate`](crate::validate) does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    /// Creates a path from a list of cell indices.
    #[must_use]
    pub fn new(cells: Vec<usize>) -> Self {
        Self(cells)
    }

    /// The cells of the path, in order.
    #[must_use]
    pub fn cells(&self) -> &[usize] {
        &self.0
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the path has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of moves needed to draw the path.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// First cell, if any.
    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.0.first().copied()
    }

    /// Last cell, if any.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Both endpoints, or `None` for an empty path.
    #[must_use]
    pub fn endpoints(&self) -> Option<(usize, usize)> {
        Some((self.first()?, self.last()?))
    }

    /// Consumes the path and returns its cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<usize> {
        self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(cells: Vec<usize>) -> Self {
        Self(cells)
    }
}

impl FromIterator<usize> for Path {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A puzzle together with its canonical solution.
///
/// `paths()[c]` is the solution path of color `c`, and the anchors are the cells a
/// player sees pre-filled. A puzzle is immutable: regenerating replaces it wholesale.
///
/// # Examples
///
/// ```
/// use flowline_core::{ColorId, GridSize, Path, Puzzle};
///
/// // 3x3 grid:
/// //   A a a
/// //   B b b
/// //   C c c
/// let size = GridSize::new(3, 3);
/// let puzzle = Puzzle::from_paths(
///     size,
///     vec![
///         Path::new(vec![0, 1, 2]),
///         Path::new(vec![3, 4, 5]),
///         Path::new(vec![6, 7, 8]),
///     ],
/// );
/// assert_eq!(puzzle.difficulty(), 3);
/// assert_eq!(puzzle.anchor_at(2), Some(ColorId::new(0)));
/// assert_eq!(puzzle.anchor_at(4), None);
/// assert!(flowline_core::validate(&puzzle).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Puzzle {
    size: GridSize,
    anchors: BTreeMap<usize, ColorId>,
    paths: Vec<Path>,
}

impl Puzzle {
    /// Builds a puzzle whose anchors are the endpoints of the given paths.
    ///
    /// Empty paths contribute no anchors.
    #[must_use]
    pub fn from_paths(size: GridSize, paths: Vec<Path>) -> Self {
        let mut anchors = BTreeMap::new();
        for (i, path) in paths.iter().enumerate() {
            if let Some((first, last)) = path.endpoints() {
                let color = ColorId::from_index(i);
                anchors.insert(first, color);
                anchors.insert(last, color);
            }
        }
        Self {
            size,
            anchors,
            paths,
        }
    }

    /// Builds a puzzle from explicit anchors and paths without checking them.
    ///
    /// Use [`validate`](crate::validate) to find out whether the result is legal.
    #[must_use]
    pub fn from_parts(size: GridSize, anchors: BTreeMap<usize, ColorId>, paths: Vec<Path>) -> Self {
        Self {
            size,
            anchors,
            paths,
        }
    }

    /// Grid dimensions.
    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Number of colors.
    #[must_use]
    pub fn difficulty(&self) -> usize {
        self.paths.len()
    }

    /// Anchor map, sorted by cell index.
    #[must_use]
    pub fn anchors(&self) -> &BTreeMap<usize, ColorId> {
        &self.anchors
    }

    /// Returns the color anchored at `cell`, if any.
    #[must_use]
    pub fn anchor_at(&self, cell: usize) -> Option<ColorId> {
        self.anchors.get(&cell).copied()
    }

    /// Returns the two anchors of `color`, if it has exactly two.
    #[must_use]
    pub fn anchors_of(&self, color: ColorId) -> Option<(usize, usize)> {
        let mut cells = self
            .anchors
            .iter()
            .filter(|&(_, &c)| c == color)
            .map(|(&cell, _)| cell);
        let a = cells.next()?;
        let b = cells.next()?;
        cells.next().is_none().then_some((a, b))
    }

    /// The canonical solution, one path per color.
    #[must_use]
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// The solution path of `color`.
    #[must_use]
    pub fn path(&self, color: ColorId) -> Option<&Path> {
        self.paths.get(color.index())
    }

    /// All colors in id order.
    pub fn colors(&self) -> impl Iterator<Item = ColorId> + '_ {
        (0..self.paths.len()).map(ColorId::from_index)
    }

    /// Returns a puzzle with the same anchors and the given paths.
    ///
    /// Used by the completion checker to evaluate a player's drawing.
    #[must_use]
    pub fn with_paths(&self, paths: Vec<Path>) -> Self {
        Self {
            size: self.size,
            anchors: self.anchors.clone(),
            paths,
        }
    }
}

const COLOR_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

fn color_char(color: ColorId, anchor: bool) -> char {
    let Some(&letter) = COLOR_LETTERS.get(color.index()) else {
        return if anchor { '*' } else { '+' };
    };
    let c = char::from(letter);
    if anchor { c.to_ascii_uppercase() } else { c }
}

/// Renders the solution as a text grid.
///
/// Each color is drawn with a letter, uppercase on anchors, lowercase elsewhere.
/// Cells not covered by any path are drawn as `.`.
impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut owner = vec![None; self.size.cell_count()];
        for color in self.colors() {
            for &cell in self.paths[color.index()].cells() {
                if let Some(slot) = owner.get_mut(cell) {
                    *slot = Some(color);
                }
            }
        }
        for row in 0..self.size.height() {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..self.size.width() {
                let cell = row * self.size.width() + col;
                let c = match (self.anchor_at(cell), owner[cell]) {
                    (Some(color), _) => color_char(color, true),
                    (None, Some(color)) => color_char(color, false),
                    (None, None) => '.',
                };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Error returned when parsing a text grid fails.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PuzzleParseError {
    /// The input has no cells.
    #[display("puzzle text is empty")]
    Empty,
    /// A row differs in length from the first one.
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        found: usize,
    },
    /// A character that is neither a color letter nor `.`.
    #[display("unexpected character {ch:?} at row {row}, column {col}")]
    UnexpectedChar {
        /// Zero-based row.
        row: usize,
        /// Zero-based column.
        col: usize,
        /// The character.
        ch: char,
    },
}

/// Parses the text grid written by the [`Display`](fmt::Display) impl.
///
/// Uppercase letters become anchors. Each color's path is traced from its first
/// anchor through same-letter cells, so a drawing that is a proper chain parses
/// back to the same paths, possibly reversed. Drawings that branch or touch
/// themselves parse to whatever the trace reaches; [`validate`](crate::validate)
/// reports the rest.
///
/// # Examples
///
/// ```
/// use flowline_core::{Puzzle, validate};
///
/// let puzzle: Puzzle = "AaA\nBbB\nCcC".parse()?;
/// assert_eq!(puzzle.difficulty(), 3);
/// assert!(validate(&puzzle).is_ok());
/// assert_eq!(puzzle.to_string(), "AaA\nBbB\nCcC");
/// # Ok::<(), flowline_core::PuzzleParseError>(())
/// ```
impl FromStr for Puzzle {
    type Err = PuzzleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.trim().lines().map(str::trim).collect();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(PuzzleParseError::Empty);
        }
        let size = GridSize::new(width, rows.len());

        let mut owner = Vec::with_capacity(size.cell_count());
        let mut anchors = BTreeMap::new();
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(PuzzleParseError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                if ch == '.' {
                    owner.push(None);
                    continue;
                }
                let Some(index) = COLOR_LETTERS
                    .iter()
                    .position(|&letter| char::from(letter) == ch.to_ascii_lowercase())
                else {
                    return Err(PuzzleParseError::UnexpectedChar { row, col, ch });
                };
                let color = ColorId::from_index(index);
                if ch.is_ascii_uppercase() {
                    anchors.insert(owner.len(), color);
                }
                owner.push(Some(color));
            }
        }

        let colors = owner.iter().flatten().map(|c| c.index() + 1).max().unwrap_or(0);
        let paths = (0..colors)
            .map(|i| trace_path(size, &owner, &anchors, ColorId::from_index(i)))
            .collect();
        Ok(Self::from_parts(size, anchors, paths))
    }
}

fn trace_path(
    size: GridSize,
    owner: &[Option<ColorId>],
    anchors: &BTreeMap<usize, ColorId>,
    color: ColorId,
) -> Path {
    let mine = |cell: usize| owner[cell] == Some(color);
    let start = anchors
        .iter()
        .find(|&(_, &c)| c == color)
        .map(|(&cell, _)| cell)
        .or_else(|| size.cells().find(|&cell| mine(cell)));
    let Some(start) = start else {
        return Path::default();
    };

    let mut visited = vec![false; size.cell_count()];
    visited[start] = true;
    let mut cells = vec![start];
    while let Some(&tail) = cells.last() {
        let candidates: Neighbors = size
            .neighbors(tail)
            .into_iter()
            .filter(|&n| mine(n) && !visited[n])
            .collect();
        // Leave the closing anchor for last.
        let next = candidates
            .iter()
            .copied()
            .find(|n| !anchors.contains_key(n))
            .or_else(|| candidates.first().copied());
        let Some(next) = next else {
            break;
        };
        visited[next] = true;
        cells.push(next);
        if anchors.contains_key(&next) {
            break;
        }
    }
    Path::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripes() -> Puzzle {
        Puzzle::from_paths(
            GridSize::new(3, 3),
            vec![
                Path::new(vec![0, 1, 2]),
                Path::new(vec![3, 4, 5]),
                Path::new(vec![6, 7, 8]),
            ],
        )
    }

    #[test]
    fn test_from_paths_builds_anchors() {
        let puzzle = stripes();
        assert_eq!(puzzle.anchors().len(), 6);
        assert_eq!(puzzle.anchors_of(ColorId::new(1)), Some((3, 5)));
        assert_eq!(puzzle.anchor_at(7), None);
        assert_eq!(puzzle.difficulty(), 3);
    }

    #[test]
    fn test_anchors_of_requires_exactly_two() {
        let mut anchors = BTreeMap::new();
        anchors.insert(0, ColorId::new(0));
        let puzzle = Puzzle::from_parts(GridSize::new(3, 3), anchors, vec![]);
        assert_eq!(puzzle.anchors_of(ColorId::new(0)), None);
    }

    #[test]
    fn test_path_accessors() {
        let path = Path::new(vec![4, 5, 8]);
        assert_eq!(path.len(), 3);
        assert_eq!(path.moves(), 2);
        assert_eq!(path.endpoints(), Some((4, 8)));
        assert_eq!(Path::default().moves(), 0);
        assert_eq!(Path::default().endpoints(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(stripes().to_string(), "AaA\nBbB\nCcC");
    }

    #[test]
    fn test_parse_round_trip() {
        let puzzle = stripes();
        assert_eq!(puzzle.to_string().parse::<Puzzle>(), Ok(puzzle));

        // 5x3:
        //   A a a a A
        //   B C c C B
        //   b b b b b
        let bend = Puzzle::from_paths(
            GridSize::new(5, 3),
            vec![
                Path::new(vec![0, 1, 2, 3, 4]),
                Path::new(vec![5, 10, 11, 12, 13, 14, 9]),
                Path::new(vec![6, 7, 8]),
            ],
        );
        assert_eq!(bend.to_string(), "AaaaA\nBCcCB\nbbbbb");
        assert_eq!(bend.to_string().parse::<Puzzle>(), Ok(bend));
    }

    #[test]
    fn test_parse_stops_at_closing_anchor() {
        // The trace reaches B before the stray b, leaving it out of the path.
        let puzzle: Puzzle = "AaA\nBbB\n..b".parse().unwrap();
        assert_eq!(puzzle.paths()[1].cells(), &[3, 4, 5]);
        assert_eq!(puzzle.anchor_at(8), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Puzzle>(), Err(PuzzleParseError::Empty));
        assert_eq!(
            "AaA\nBb".parse::<Puzzle>(),
            Err(PuzzleParseError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            "Aa#".parse::<Puzzle>(),
            Err(PuzzleParseError::UnexpectedChar {
                row: 0,
                col: 2,
                ch: '#'
            })
        );
    }

    #[test]
    fn test_with_paths_keeps_anchors() {
        let puzzle = stripes();
        let replaced = puzzle.with_paths(vec![]);
        assert_eq!(replaced.anchors(), puzzle.anchors());
        assert_eq!(replaced.difficulty(), 0);
    }

    #[test]
    fn test_color_index_saturates() {
        assert_eq!(ColorId::from_index(7), ColorId::new(7));
        assert_eq!(ColorId::from_index(70_000), ColorId::new(u16::MAX));
    }

    #[test]
    fn test_too_many_paths_fail_validation() {
        let count = usize::from(u16::MAX) + 2;
        let size = GridSize::new(count, 1);
        let paths = (0..count).map(|cell| Path::new(vec![cell])).collect();
        let puzzle = Puzzle::from_paths(size, paths);
        assert_eq!(puzzle.anchor_at(count - 1), Some(ColorId::new(u16::MAX)));
        assert!(crate::validate(&puzzle).is_err());
    }
}
