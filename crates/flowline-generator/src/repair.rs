//! Local repair of path layouts.
//!
//! A [`Layout`] splits the grid into paths that touch themselves only between
//! consecutive cells. Every move keeps it that way: a path grows at one end by
//! taking over the adjoining piece of a neighboring path, cut at the cell it
//! touches. The neighbor keeps the other piece, or disappears when nothing is left.
//!
//! Once every path has at least [`MIN_PATH_CELLS`] cells the layout is a valid
//! puzzle, since such a path cannot have touching endpoints.

use std::{cmp::Reverse, mem, ops::RangeInclusive};

use flowline_core::GridSize;
use rand::RngExt as _;

use crate::{LevelRng, params::MIN_PATH_CELLS};

/// Reason a repair gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub(crate) enum RepairError {
    #[display("short path at cell {cell} has no clean neighbor to join")]
    Stranded { cell: usize },
    #[display("no path is long enough to split")]
    NoSplit,
    #[display("gave up after {steps} steps")]
    OutOfSteps { steps: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

/// Part of the donor path a move takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    /// `donor[at..]`
    Tail,
    /// `donor[..=at]`, reversed.
    Head,
}

/// Extends `path` at `end` with a piece of `donor` starting at `donor[at]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Move {
    path: usize,
    end: End,
    donor: usize,
    at: usize,
    piece: Piece,
}

/// A partition of the grid into self-avoiding paths.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    size: GridSize,
    paths: Vec<Vec<usize>>,
    owner: Vec<usize>,
    position: Vec<usize>,
}

impl Layout {
    /// The paths must cover every cell exactly once, and none may touch itself.
    /// Empty paths are dropped.
    pub(crate) fn new(size: GridSize, mut paths: Vec<Vec<usize>>) -> Self {
        paths.retain(|path| !path.is_empty());
        let mut layout = Self {
            size,
            paths,
            owner: vec![0; size.cell_count()],
            position: vec![0; size.cell_count()],
        };
        for i in 0..layout.paths.len() {
            layout.relabel(i);
        }
        layout
    }

    pub(crate) fn len(&self) -> usize {
        self.paths.len()
    }

    pub(crate) fn into_paths(self) -> Vec<Vec<usize>> {
        self.paths
    }

    /// Reshapes the layout until every path is long enough and the path count
    /// lies in `colors`.
    ///
    /// Short paths join a neighbor first. While there are too many paths, a
    /// random path (half of the time one of the shortest) grows, preferring
    /// moves that swallow a whole neighbor. While there are too few, the longest
    /// path is cut in two.
    pub(crate) fn repair(
        &mut self,
        colors: &RangeInclusive<usize>,
        max_steps: usize,
        rng: &mut LevelRng,
    ) -> Result<(), RepairError> {
        for _ in 0..max_steps {
            let short: Vec<usize> = (0..self.paths.len())
                .filter(|&i| self.paths[i].len() < MIN_PATH_CELLS)
                .collect();
            if !short.is_empty() {
                let i = short[rng.random_range(0..short.len())];
                let moves = self.moves(i, 1);
                if moves.is_empty() {
                    return Err(RepairError::Stranded {
                        cell: self.paths[i][0],
                    });
                }
                self.apply(moves[rng.random_range(0..moves.len())]);
                continue;
            }

            let count = self.paths.len();
            if count > *colors.end() {
                let i = if rng.random_bool(0.5) {
                    self.random_shortest(rng)
                } else {
                    rng.random_range(0..count)
                };
                let moves = self.moves(i, MIN_PATH_CELLS);
                let merges: Vec<Move> = moves
                    .iter()
                    .copied()
                    .filter(|mv| self.rest_len(mv) == 0)
                    .collect();
                let pool = if merges.is_empty() { moves } else { merges };
                if !pool.is_empty() {
                    self.apply(pool[rng.random_range(0..pool.len())]);
                }
            } else if count < *colors.start() {
                self.split_longest(rng)?;
            } else {
                return Ok(());
            }
        }

        if self.is_complete(colors) {
            Ok(())
        } else {
            Err(RepairError::OutOfSteps { steps: max_steps })
        }
    }

    /// Cuts the longest paths until there are `count` of them.
    pub(crate) fn split_until(
        &mut self,
        count: usize,
        rng: &mut LevelRng,
    ) -> Result<(), RepairError> {
        while self.paths.len() < count {
            self.split_longest(rng)?;
        }
        Ok(())
    }

    /// Applies up to `steps` random moves that keep the number of paths and keep
    /// every path at least [`MIN_PATH_CELLS`] long.
    pub(crate) fn shake(&mut self, steps: usize, rng: &mut LevelRng) {
        if self.paths.is_empty() {
            return;
        }
        for _ in 0..steps {
            let i = rng.random_range(0..self.paths.len());
            let moves: Vec<Move> = self
                .moves(i, MIN_PATH_CELLS)
                .into_iter()
                .filter(|mv| self.rest_len(mv) > 0)
                .collect();
            if !moves.is_empty() {
                self.apply(moves[rng.random_range(0..moves.len())]);
            }
        }
    }

    fn is_complete(&self, colors: &RangeInclusive<usize>) -> bool {
        colors.contains(&self.paths.len())
            && self.paths.iter().all(|path| path.len() >= MIN_PATH_CELLS)
    }

    fn relabel(&mut self, i: usize) {
        for (k, &cell) in self.paths[i].iter().enumerate() {
            self.owner[cell] = i;
            self.position[cell] = k;
        }
    }

    fn remove(&mut self, i: usize) {
        self.paths.swap_remove(i);
        if i < self.paths.len() {
            self.relabel(i);
        }
    }

    fn end_cell(&self, i: usize, end: End) -> usize {
        let path = &self.paths[i];
        match end {
            End::Front => path[0],
            End::Back => path[path.len() - 1],
        }
    }

    fn random_shortest(&self, rng: &mut LevelRng) -> usize {
        let shortest = self.paths.iter().map(Vec::len).min().unwrap_or(0);
        let candidates: Vec<usize> = (0..self.paths.len())
            .filter(|&i| self.paths[i].len() == shortest)
            .collect();
        candidates[rng.random_range(0..candidates.len())]
    }

    /// Cells the donor keeps after `mv`.
    fn rest_len(&self, mv: &Move) -> usize {
        match mv.piece {
            Piece::Tail => mv.at,
            Piece::Head => self.paths[mv.donor].len() - 1 - mv.at,
        }
    }

    fn in_piece(&self, cell: usize, mv: &Move) -> bool {
        self.owner[cell] == mv.donor
            && match mv.piece {
                Piece::Tail => self.position[cell] >= mv.at,
                Piece::Head => self.position[cell] <= mv.at,
            }
    }

    /// Whether the only contact between the path and the piece is the joint
    /// itself.
    fn joins_cleanly(&self, mv: &Move) -> bool {
        let end = self.end_cell(mv.path, mv.end);
        let joint = self.paths[mv.donor][mv.at];
        self.paths[mv.path].iter().all(|&cell| {
            self.size
                .neighbors(cell)
                .into_iter()
                .all(|n| !self.in_piece(n, mv) || (cell == end && n == joint))
        })
    }

    /// Moves that extend path `i` and leave the donor either empty or with at
    /// least `min_rest` cells.
    fn moves(&self, i: usize, min_rest: usize) -> Vec<Move> {
        let ends: &[End] = if self.paths[i].len() == 1 {
            &[End::Back]
        } else {
            &[End::Front, End::Back]
        };
        let mut moves = vec![];
        for &end in ends {
            let cell = self.end_cell(i, end);
            for n in self.size.neighbors(cell) {
                let donor = self.owner[n];
                if donor == i {
                    continue;
                }
                for piece in [Piece::Tail, Piece::Head] {
                    let mv = Move {
                        path: i,
                        end,
                        donor,
                        at: self.position[n],
                        piece,
                    };
                    let rest = self.rest_len(&mv);
                    if (rest == 0 || rest >= min_rest) && self.joins_cleanly(&mv) {
                        moves.push(mv);
                    }
                }
            }
        }
        moves
    }

    fn apply(&mut self, mv: Move) {
        let mut donor = mem::take(&mut self.paths[mv.donor]);
        let (piece, rest) = match mv.piece {
            Piece::Tail => {
                let piece = donor.split_off(mv.at);
                (piece, donor)
            }
            Piece::Head => {
                let rest = donor.split_off(mv.at + 1);
                donor.reverse();
                (donor, rest)
            }
        };

        let path = &mut self.paths[mv.path];
        if mv.end == End::Front {
            path.reverse();
        }
        path.extend(piece);
        self.relabel(mv.path);

        if rest.is_empty() {
            self.remove(mv.donor);
        } else {
            self.paths[mv.donor] = rest;
            self.relabel(mv.donor);
        }
    }

    fn split_longest(&mut self, rng: &mut LevelRng) -> Result<(), RepairError> {
        let longest = (0..self.paths.len()).max_by_key(|&i| (self.paths[i].len(), Reverse(i)));
        let Some(i) = longest else {
            return Err(RepairError::NoSplit);
        };
        let len = self.paths[i].len();
        if len < 2 * MIN_PATH_CELLS {
            return Err(RepairError::NoSplit);
        }
        let cut = rng.random_range(MIN_PATH_CELLS..=len - MIN_PATH_CELLS);
        let tail = self.paths[i].split_off(cut);
        self.paths.push(tail);
        self.relabel(self.paths.len() - 1);
        Ok(())
    }
}
