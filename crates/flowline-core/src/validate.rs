//! Puzzle rule checking.
//!
//! [`validate`] is the authority on whether a puzzle is legal, independent of how it
//! was produced. The rules are checked in a fixed order and the first violation is
//! returned:
//!
//! 1. Every color has exactly two anchors, all inside the grid.
//! 2. Every color has a solution path of at least two in-grid cells whose endpoints
//!    are exactly its two anchors (in either order), and the two anchors are not
//!    orthogonal neighbors.
//! 3. No anchor, of any color, appears at an interior position of a path.
//! 4. No cell is used twice, neither by two colors nor by one path.
//! 5. The paths together cover every cell of the grid.
//! 6. Paths are simple chains: consecutive cells are adjacent, endpoints have exactly
//!    one same-path neighbor and interior cells exactly two.
//! 7. No path steps onto a cell and immediately back.
//!
//! [`check_solution`] applies rules 1-5 to a player's drawing.

use std::collections::{BTreeMap, BTreeSet};

use crate::{ColorId, Path, Puzzle};

/// A violated puzzle rule.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ValidationError {
    /// A color does not have exactly two anchors.
    #[display("rule 1: color {color} has {count} anchors, expected 2")]
    AnchorCount {
        /// Offending color.
        color: ColorId,
        /// Number of anchors found.
        count: usize,
    },
    /// An anchor lies outside the grid.
    #[display("rule 1: anchor of color {color} at cell {cell} is outside the grid")]
    AnchorOutOfBounds {
        /// Offending color.
        color: ColorId,
        /// Anchor cell.
        cell: usize,
    },
    /// A color has anchors but no path.
    #[display("rule 2: color {color} has no solution path")]
    MissingPath {
        /// Offending color.
        color: ColorId,
    },
    /// A path is shorter than two cells.
    #[display("rule 2: path of color {color} has {len} cells, expected at least 2")]
    PathTooShort {
        /// Offending color.
        color: ColorId,
        /// Number of cells in the path.
        len: usize,
    },
    /// A path visits a cell outside the grid.
    #[display("rule 2: path of color {color} leaves the grid at cell {cell}")]
    CellOutOfBounds {
        /// Offending color.
        color: ColorId,
        /// Out-of-range cell.
        cell: usize,
    },
    /// A path does not start and end on its color's anchors.
    #[display("rule 2: path of color {color} does not connect its anchors")]
    EndpointMismatch {
        /// Offending color.
        color: ColorId,
    },
    /// The two anchors of a color touch, leaving nothing to draw.
    #[display("rule 2: anchors of color {color} are adjacent")]
    AdjacentAnchors {
        /// Offending color.
        color: ColorId,
    },
    /// An anchor is visited in the middle of its own path.
    #[display("rule 3: anchor cell {cell} lies inside the path of color {color}")]
    AnchorInsidePath {
        /// Offending color.
        color: ColorId,
        /// Anchor cell.
        cell: usize,
    },
    /// Two colors share a cell.
    #[display("rule 4: cell {cell} is used by colors {first} and {second}")]
    Overlap {
        /// Shared cell.
        cell: usize,
        /// Color that claimed the cell first.
        first: ColorId,
        /// Color that claimed it again.
        second: ColorId,
    },
    /// A path visits the same cell twice.
    #[display("rule 4: path of color {color} visits cell {cell} twice")]
    RepeatedCell {
        /// Offending color.
        color: ColorId,
        /// Repeated cell.
        cell: usize,
    },
    /// A cell is not covered by any path.
    #[display("rule 5: cell {cell} is not covered by any path")]
    Uncovered {
        /// Uncovered cell.
        cell: usize,
    },
    /// Two consecutive path cells are not orthogonally adjacent.
    #[display("rule 6: cells {from} and {to} of color {color} are not adjacent")]
    Disconnected {
        /// Offending color.
        color: ColorId,
        /// Earlier cell.
        from: usize,
        /// Following cell.
        to: usize,
    },
    /// A path cell touches the wrong number of cells of its own path.
    #[display(
        "rule 6: cell {cell} of color {color} has {count} same-path neighbors, expected {expected}"
    )]
    Branching {
        /// Offending color.
        color: ColorId,
        /// Offending cell.
        cell: usize,
        /// Same-path neighbors found.
        count: usize,
        /// Same-path neighbors required.
        expected: usize,
    },
    /// A path steps onto a cell and immediately back.
    #[display("rule 7: path of color {color} turns back at cell {cell}")]
    UTurn {
        /// Offending color.
        color: ColorId,
        /// Cell where the path reverses.
        cell: usize,
    },
}

impl ValidationError {
    /// Number of the violated rule (1-7).
    #[must_use]
    pub fn rule(&self) -> u8 {
        match self {
            Self::AnchorCount { .. } | Self::AnchorOutOfBounds { .. } => 1,
            Self::MissingPath { .. }
            | Self::PathTooShort { .. }
            | Self::CellOutOfBounds { .. }
            | Self::EndpointMismatch { .. }
            | Self::AdjacentAnchors { .. } => 2,
            Self::AnchorInsidePath { .. } => 3,
            Self::Overlap { .. } | Self::RepeatedCell { .. } => 4,
            Self::Uncovered { .. } => 5,
            Self::Disconnected { .. } | Self::Branching { .. } => 6,
            Self::UTurn { .. } => 7,
        }
    }
}

/// Checks every puzzle rule against the puzzle's canonical solution.
///
/// # Errors
///
/// Returns the first violated rule.
///
/// # Examples
///
/// ```
/// use flowline_core::{GridSize, Path, Puzzle, ValidationError, validate};
///
/// let size = GridSize::new(3, 3);
/// let puzzle = Puzzle::from_paths(size, vec![Path::new(vec![0, 1, 2, 5, 4, 3, 6, 7, 8])]);
/// // The single path folds back on itself, so its start touches cell 3.
/// let err = validate(&puzzle).unwrap_err();
/// assert!(matches!(err, ValidationError::Branching { .. }));
/// assert_eq!(err.rule(), 6);
/// ```
pub fn validate(puzzle: &Puzzle) -> Result<(), ValidationError> {
    check_structure(puzzle)?;
    check_chains(puzzle)?;
    check_u_turns(puzzle)
}

/// Checks a player's drawing against a puzzle.
///
/// `player_paths[c]` is the path the player drew for color `c`. The drawing completes
/// the puzzle if every path joins its two anchors, no cell is used twice and the
/// whole grid is covered. The canonical solution is not consulted, so any routing
/// that satisfies the rules is accepted.
///
/// # Errors
///
/// Returns the first violated rule among rules 1-5.
pub fn check_solution(puzzle: &Puzzle, player_paths: &[Path]) -> Result<(), ValidationError> {
    check_structure(&puzzle.with_paths(player_paths.to_vec()))
}

/// Rules 1-5.
fn check_structure(puzzle: &Puzzle) -> Result<(), ValidationError> {
    let size = puzzle.size();

    // Rule 1
    let mut anchors_by_color: BTreeMap<ColorId, Vec<usize>> =
        puzzle.colors().map(|color| (color, vec![])).collect();
    for (&cell, &color) in puzzle.anchors() {
        if !size.contains(cell) {
            return Err(ValidationError::AnchorOutOfBounds { color, cell });
        }
        anchors_by_color.entry(color).or_default().push(cell);
    }
    for (&color, cells) in &anchors_by_color {
        if cells.len() != 2 {
            return Err(ValidationError::AnchorCount {
                color,
                count: cells.len(),
            });
        }
    }

    // Rule 2
    for (&color, cells) in &anchors_by_color {
        let Some(path) = puzzle.path(color) else {
            return Err(ValidationError::MissingPath { color });
        };
        if path.len() < 2 {
            return Err(ValidationError::PathTooShort {
                color,
                len: path.len(),
            });
        }
        if let Some(&cell) = path.cells().iter().find(|&&cell| !size.contains(cell)) {
            return Err(ValidationError::CellOutOfBounds { color, cell });
        }
        let (first, last) = path
            .endpoints()
            .ok_or(ValidationError::PathTooShort { color, len: 0 })?;
        let (a, b) = (cells[0], cells[1]);
        if !((first == a && last == b) || (first == b && last == a)) {
            return Err(ValidationError::EndpointMismatch { color });
        }
        if size.are_adjacent(a, b) {
            return Err(ValidationError::AdjacentAnchors { color });
        }
    }

    // Rule 3
    for color in puzzle.colors() {
        let cells = puzzle.paths()[color.index()].cells();
        let interior = &cells[1..cells.len() - 1];
        if let Some(&cell) = interior.iter().find(|&&cell| puzzle.anchor_at(cell).is_some()) {
            return Err(ValidationError::AnchorInsidePath { color, cell });
        }
    }

    // Rule 4
    let mut owner: Vec<Option<ColorId>> = vec![None; size.cell_count()];
    for color in puzzle.colors() {
        for &cell in puzzle.paths()[color.index()].cells() {
            match owner[cell] {
                Some(first) if first == color => {
                    return Err(ValidationError::RepeatedCell { color, cell });
                }
                Some(first) => {
                    return Err(ValidationError::Overlap {
                        cell,
                        first,
                        second: color,
                    });
                }
                None => owner[cell] = Some(color),
            }
        }
    }

    // Rule 5
    if let Some(cell) = owner.iter().position(Option::is_none) {
        return Err(ValidationError::Uncovered { cell });
    }

    Ok(())
}

/// Rule 6. Assumes rules 1-5 hold.
fn check_chains(puzzle: &Puzzle) -> Result<(), ValidationError> {
    let size = puzzle.size();
    for color in puzzle.colors() {
        let cells = puzzle.paths()[color.index()].cells();
        for pair in cells.windows(2) {
            if !size.are_adjacent(pair[0], pair[1]) {
                return Err(ValidationError::Disconnected {
                    color,
                    from: pair[0],
                    to: pair[1],
                });
            }
        }

        let members: BTreeSet<usize> = cells.iter().copied().collect();
        let last = cells.len() - 1;
        for (i, &cell) in cells.iter().enumerate() {
            let expected = if i == 0 || i == last { 1 } else { 2 };
            let count = size
                .neighbors(cell)
                .into_iter()
                .filter(|n| members.contains(n))
                .count();
            if count != expected {
                return Err(ValidationError::Branching {
                    color,
                    cell,
                    count,
                    expected,
                });
            }
        }
    }
    Ok(())
}

/// Rule 7.
fn check_u_turns(puzzle: &Puzzle) -> Result<(), ValidationError> {
    for color in puzzle.colors() {
        let cells = puzzle.paths()[color.index()].cells();
        if let Some(w) = cells.windows(3).find(|w| w[0] == w[2]) {
            return Err(ValidationError::UTurn { color, cell: w[1] });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridSize;

    fn c(value: u16) -> ColorId {
        ColorId::new(value)
    }

    // 4x4:
    //   A a a A
    //   B b b B
    //   C c c C
    //   D d d D
    fn stripes() -> Puzzle {
        Puzzle::from_paths(
            GridSize::new(4, 4),
            vec![
                Path::new(vec![0, 1, 2, 3]),
                Path::new(vec![4, 5, 6, 7]),
                Path::new(vec![8, 9, 10, 11]),
                Path::new(vec![12, 13, 14, 15]),
            ],
        )
    }

    #[test]
    fn test_valid_puzzle() {
        assert_eq!(validate(&stripes()), Ok(()));
    }

    #[test]
    fn test_reversed_path_is_valid() {
        let size = GridSize::new(4, 4);
        let mut paths = stripes().paths().to_vec();
        paths[0] = Path::new(vec![3, 2, 1, 0]);
        let puzzle = Puzzle::from_parts(size, stripes().anchors().clone(), paths);
        assert_eq!(validate(&puzzle), Ok(()));
    }

    #[test]
    fn test_rule1_anchor_count() {
        let mut anchors = stripes().anchors().clone();
        anchors.insert(5, c(0));
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), anchors, stripes().paths().to_vec());
        let err = validate(&puzzle).unwrap_err();
        assert_eq!(err, ValidationError::AnchorCount { color: c(0), count: 3 });
        assert_eq!(err.rule(), 1);
    }

    #[test]
    fn test_rule1_color_without_anchors() {
        let mut anchors = stripes().anchors().clone();
        anchors.remove(&12);
        anchors.remove(&15);
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), anchors, stripes().paths().to_vec());
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::AnchorCount { color: c(3), count: 0 })
        );
    }

    #[test]
    fn test_rule1_anchor_out_of_bounds() {
        let mut anchors = stripes().anchors().clone();
        anchors.insert(16, c(0));
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), anchors, stripes().paths().to_vec());
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::AnchorOutOfBounds { color: c(0), cell: 16 })
        );
    }

    #[test]
    fn test_rule2_missing_path() {
        let mut paths = stripes().paths().to_vec();
        paths.pop();
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), stripes().anchors().clone(), paths);
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::MissingPath { color: c(3) })
        );
    }

    #[test]
    fn test_rule2_path_too_short() {
        let mut paths = stripes().paths().to_vec();
        paths[1] = Path::new(vec![4]);
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), stripes().anchors().clone(), paths);
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::PathTooShort { color: c(1), len: 1 })
        );
    }

    #[test]
    fn test_rule2_endpoint_mismatch() {
        let mut paths = stripes().paths().to_vec();
        paths[1] = Path::new(vec![4, 5, 6]);
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), stripes().anchors().clone(), paths);
        let err = validate(&puzzle).unwrap_err();
        assert_eq!(err, ValidationError::EndpointMismatch { color: c(1) });
        assert_eq!(err.rule(), 2);
    }

    #[test]
    fn test_rule2_cell_out_of_bounds() {
        let mut paths = stripes().paths().to_vec();
        paths[3] = Path::new(vec![12, 13, 99, 15]);
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), stripes().anchors().clone(), paths);
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::CellOutOfBounds { color: c(3), cell: 99 })
        );
    }

    #[test]
    fn test_rule2_adjacent_anchors() {
        // 5x1 grid: color 0 covers two touching cells.
        let size = GridSize::new(5, 1);
        let puzzle = Puzzle::from_paths(
            size,
            vec![Path::new(vec![0, 1]), Path::new(vec![2, 3, 4])],
        );
        let err = validate(&puzzle).unwrap_err();
        assert_eq!(err, ValidationError::AdjacentAnchors { color: c(0) });
        assert_eq!(err.rule(), 2);
    }

    #[test]
    fn test_rule2_adjacent_anchors_on_bent_path() {
        // The path bends around a corner, but its ends still touch.
        let size = GridSize::new(2, 2);
        let puzzle = Puzzle::from_paths(size, vec![Path::new(vec![0, 1, 3, 2])]);
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::AdjacentAnchors { color: c(0) })
        );
    }

    #[test]
    fn test_rule3_anchor_inside_path() {
        // 3x3 rows; color 0 detours 0 -> 3 -> 4 -> 1 -> 2 over an anchor of color 1.
        let size = GridSize::new(3, 3);
        let rows = Puzzle::from_paths(
            size,
            vec![
                Path::new(vec![0, 1, 2]),
                Path::new(vec![3, 4, 5]),
                Path::new(vec![6, 7, 8]),
            ],
        );
        let mut paths = rows.paths().to_vec();
        paths[0] = Path::new(vec![0, 3, 4, 1, 2]);
        let puzzle = Puzzle::from_parts(size, rows.anchors().clone(), paths);
        let err = validate(&puzzle).unwrap_err();
        assert_eq!(err, ValidationError::AnchorInsidePath { color: c(0), cell: 3 });
        assert_eq!(err.rule(), 3);
    }

    #[test]
    fn test_rule4_overlap() {
        let mut paths = stripes().paths().to_vec();
        paths[1] = Path::new(vec![4, 5, 1, 6, 7]);
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), stripes().anchors().clone(), paths);
        let err = validate(&puzzle).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Overlap {
                cell: 1,
                first: c(0),
                second: c(1)
            }
        );
        assert_eq!(err.rule(), 4);
    }

    #[test]
    fn test_rule4_repeated_cell() {
        let mut paths = stripes().paths().to_vec();
        paths[2] = Path::new(vec![8, 9, 10, 9, 10, 11]);
        let puzzle = Puzzle::from_parts(GridSize::new(4, 4), stripes().anchors().clone(), paths);
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::RepeatedCell { color: c(2), cell: 9 })
        );
    }

    #[test]
    fn test_rule5_uncovered() {
        let size = GridSize::new(4, 4);
        let paths = vec![
            Path::new(vec![0, 1, 2, 3]),
            Path::new(vec![4, 5, 6, 7]),
            Path::new(vec![8, 9, 10, 11]),
            Path::new(vec![12, 13, 14]),
        ];
        let puzzle = Puzzle::from_paths(size, paths);
        let err = validate(&puzzle).unwrap_err();
        assert_eq!(err, ValidationError::Uncovered { cell: 15 });
        assert_eq!(err.rule(), 5);
    }

    #[test]
    fn test_rule6_disconnected() {
        let size = GridSize::new(4, 4);
        let paths = vec![
            Path::new(vec![0, 1, 2, 3]),
            Path::new(vec![4, 5, 6, 7]),
            Path::new(vec![8, 9, 10, 11]),
            Path::new(vec![12, 14, 13, 15]),
        ];
        let puzzle = Puzzle::from_paths(size, paths);
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::Disconnected {
                color: c(3),
                from: 12,
                to: 14
            })
        );
    }

    #[test]
    fn test_rule6_self_touching_path() {
        // 3x3 with a single serpentine path: the fold makes the start cell touch
        // cell 3 as well as its successor.
        let size = GridSize::new(3, 3);
        let puzzle = Puzzle::from_paths(size, vec![Path::new(vec![0, 1, 2, 5, 4, 3, 6, 7, 8])]);
        assert_eq!(
            validate(&puzzle),
            Err(ValidationError::Branching {
                color: c(0),
                cell: 0,
                count: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn test_rule7_u_turn() {
        let size = GridSize::new(3, 1);
        let puzzle = Puzzle::from_paths(size, vec![Path::new(vec![0, 1, 0, 1, 2])]);
        // Repeated cells are reported by rule 4 first; check rule 7 directly.
        assert_eq!(
            check_u_turns(&puzzle),
            Err(ValidationError::UTurn { color: c(0), cell: 1 })
        );
    }

    // 3x3, anchors A at 0/6 and B at 2/7:
    //   A a B
    //   a a b
    //   A B b
    fn two_routes() -> Puzzle {
        Puzzle::from_paths(
            GridSize::new(3, 3),
            vec![Path::new(vec![0, 1, 4, 3, 6]), Path::new(vec![2, 5, 8, 7])],
        )
    }

    #[test]
    fn test_check_solution_ignores_path_shape() {
        // Both routings touch themselves, but each joins its anchors and together
        // they fill the grid.
        let puzzle = two_routes();
        assert_eq!(validate(&puzzle).map_err(|err| err.rule()), Err(6));
        assert_eq!(check_solution(&puzzle, puzzle.paths()), Ok(()));
        let player = vec![Path::new(vec![6, 3, 0]), Path::new(vec![2, 1, 4, 5, 8, 7])];
        assert_eq!(check_solution(&puzzle, &player), Ok(()));
    }

    #[test]
    fn test_check_solution_rejects_incomplete_drawing() {
        let puzzle = stripes();
        let player = vec![
            Path::new(vec![0, 1, 2, 3]),
            Path::new(vec![4, 5, 6, 7]),
            Path::new(vec![8, 9, 10, 11]),
        ];
        assert_eq!(
            check_solution(&puzzle, &player),
            Err(ValidationError::MissingPath { color: c(3) })
        );
    }

    #[test]
    fn test_check_solution_rejects_gaps() {
        let puzzle = two_routes();
        // Both anchor pairs are joined but cells 1 and 4 stay empty.
        let player = vec![Path::new(vec![0, 3, 6]), Path::new(vec![2, 5, 8, 7])];
        let err = check_solution(&puzzle, &player).unwrap_err();
        assert_eq!(err, ValidationError::Uncovered { cell: 1 });
    }
}
