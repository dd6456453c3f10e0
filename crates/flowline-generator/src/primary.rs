//! Primary generator: randomized incremental path growing.
//!
//! Each attempt picks a color count, then repeatedly starts a path in a
//! constrained empty cell and grows it one random step at a time. Growth never
//! lets a path touch itself, and on small grids it refuses steps that would strand
//! a neighboring empty cell. Each path is capped near its fair share of the cells
//! still empty, so the grid fills with roughly the chosen number of paths.
//!
//! Growth alone leaves short paths and stray cells behind, so the drawn layout
//! goes through the [repair](crate::repair) stage, which reshapes it into exactly
//! the chosen number of paths. Every puzzle this module returns satisfies
//! [`flowline_core::validate`].

use flowline_core::{GridSize, Path, Puzzle};
use log::{debug, trace};
use rand::{RngExt as _, seq::SliceRandom as _};

use crate::{
    GenerationParams, GeneratorConfig, LevelRng,
    repair::{Layout, RepairError},
};

/// Repair steps allowed per grid cell.
const REPAIR_STEPS_PER_CELL: usize = 8;

/// Runs up to `config.attempt_budget` attempts.
///
/// Returns `None` when every attempt got stuck.
pub fn generate(
    params: &GenerationParams,
    config: &GeneratorConfig,
    rng: &mut LevelRng,
) -> Option<Puzzle> {
    for attempt in 1..=config.attempt_budget {
        match attempt_once(params, config, rng) {
            Ok(puzzle) => {
                debug!(
                    "primary generator filled {} with {} colors after {attempt} attempts",
                    params.size(),
                    puzzle.difficulty()
                );
                return Some(puzzle);
            }
            Err(reason) => trace!("attempt {attempt} stuck: {reason}"),
        }
    }
    debug!(
        "primary generator exhausted {} attempts on {}",
        config.attempt_budget,
        params.size()
    );
    None
}

/// Occupancy of the grid during one attempt.
struct Board {
    size: GridSize,
    owner: Vec<Option<usize>>,
    empty: usize,
}

impl Board {
    fn new(size: GridSize) -> Self {
        Self {
            size,
            owner: vec![None; size.cell_count()],
            empty: size.cell_count(),
        }
    }

    fn is_empty(&self, cell: usize) -> bool {
        self.owner[cell].is_none()
    }

    fn claim(&mut self, cell: usize, color: usize) {
        debug_assert!(self.is_empty(cell));
        self.owner[cell] = Some(color);
        self.empty -= 1;
    }

    fn free_neighbors(&self, cell: usize) -> usize {
        self.size
            .neighbors(cell)
            .into_iter()
            .filter(|&n| self.is_empty(n))
            .count()
    }

    /// Would stepping onto `cell` make the path of `color` touch itself somewhere
    /// other than at `tail`?
    fn touches_path(&self, cell: usize, tail: usize, color: usize) -> bool {
        self.size
            .neighbors(cell)
            .into_iter()
            .any(|n| n != tail && self.owner[n] == Some(color))
    }

    /// Would occupying `cell` leave one of its empty neighbors with no empty
    /// neighbor of its own?
    fn strands_neighbor(&self, cell: usize) -> bool {
        self.size
            .neighbors(cell)
            .into_iter()
            .filter(|&m| self.is_empty(m))
            .any(|m| {
                self.size
                    .neighbors(m)
                    .into_iter()
                    .all(|k| k == cell || !self.is_empty(k))
            })
    }
}

fn attempt_once(
    params: &GenerationParams,
    config: &GeneratorConfig,
    rng: &mut LevelRng,
) -> Result<Puzzle, RepairError> {
    let size = params.size();
    let target = rng.random_range(params.color_range());
    let lookahead = size.cell_count() < config.lookahead_cell_limit;

    let mut board = Board::new(size);
    let mut paths: Vec<Vec<usize>> = Vec::with_capacity(target);

    while let Some(start) = pick_start(&board, config.start_samples, rng) {
        let color = paths.len();
        let remaining = target.saturating_sub(color);
        let limit = if remaining > 1 {
            (3 * board.empty).div_ceil(2 * remaining)
        } else {
            size.cell_count()
        };
        board.claim(start, color);
        let mut path = vec![start];
        while path.len() < limit {
            let Some(next) = next_step(&board, &path, color, lookahead, rng) else {
                break;
            };
            board.claim(next, color);
            path.push(next);
        }
        paths.push(path);
    }

    let mut layout = Layout::new(size, paths);
    layout.repair(
        &(target..=target),
        REPAIR_STEPS_PER_CELL * size.cell_count(),
        rng,
    )?;

    // Decouple the displayed color order from the generation order.
    let paths = layout.into_paths();
    let mut ids: Vec<usize> = (0..paths.len()).collect();
    ids.shuffle(rng);
    let mut ordered = vec![Path::default(); paths.len()];
    for (path, id) in paths.into_iter().zip(ids) {
        ordered[id] = Path::new(path);
    }
    Ok(Puzzle::from_paths(size, ordered))
}

/// Samples empty cells and returns the one with the fewest empty neighbors.
///
/// Ties go to the first sample. Returns `None` when the grid is full.
fn pick_start(board: &Board, samples: usize, rng: &mut LevelRng) -> Option<usize> {
    let empties: Vec<usize> = board
        .size
        .cells()
        .filter(|&cell| board.is_empty(cell))
        .collect();
    if empties.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for _ in 0..samples.max(1) {
        let cell = empties[rng.random_range(0..empties.len())];
        let free = board.free_neighbors(cell);
        if best.is_none_or(|(_, best_free)| free < best_free) {
            best = Some((cell, free));
        }
    }
    best.map(|(cell, _)| cell)
}

/// Picks a random valid cell to extend the path with.
fn next_step(
    board: &Board,
    path: &[usize],
    color: usize,
    lookahead: bool,
    rng: &mut LevelRng,
) -> Option<usize> {
    let tail = *path.last()?;
    let candidates: Vec<usize> = board
        .size
        .neighbors(tail)
        .into_iter()
        .filter(|&n| board.is_empty(n))
        .filter(|&n| !board.touches_path(n, tail, color))
        .filter(|&n| !(lookahead && board.strands_neighbor(n)))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}
