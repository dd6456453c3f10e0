//! Fallback generator: partition, then linearize.
//!
//! Used only when the primary generator runs out of attempts. Every puzzle it
//! returns satisfies [`flowline_core::validate`].
//!
//! 1. **Partition.** Regions of near-equal target size are grown one after another
//!    by a depth-first "snake" that prefers a random direction and re-rolls it now
//!    and then.
//! 2. **Remainder.** Cells the snakes missed join the region whose middle cell is
//!    nearest, preferring regions they already touch. Regions too small for a path
//!    are folded into a touching neighbor.
//! 3. **Linearization.** Each region is covered by chains that never touch
//!    themselves. A chain starts at a border cell and always moves to the neighbor
//!    with the fewest onward options; a new chain starts wherever the last one got
//!    stuck.
//! 4. **Repair.** The chains go through the [repair](crate::repair) stage until the
//!    color count is in range.
//!
//! A round whose repair fails is re-partitioned from scratch. After the last round
//! the grid is laid out in serpentine stripes, which are always valid, and shaken
//! up with repair moves that keep the color count.

use flowline_core::{GridSize, Path, Position, Puzzle};
use log::debug;
use rand::{RngExt as _, seq::SliceRandom as _};

use crate::{GenerationParams, LevelRng, params::MIN_PATH_CELLS, repair::Layout};

const REROLL_PROBABILITY: f64 = 0.3;

/// Partition rounds before falling back to stripes.
const ROUNDS: usize = 4;

/// Repair steps allowed per grid cell.
const REPAIR_STEPS_PER_CELL: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    fn random(rng: &mut LevelRng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Direction of the step from `from` to the adjacent cell `to`.
    fn between(size: GridSize, from: usize, to: usize) -> Self {
        let a = size.position(from);
        let b = size.position(to);
        if b.row < a.row {
            Self::Up
        } else if b.row > a.row {
            Self::Down
        } else if b.col < a.col {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Builds a valid puzzle.
///
/// Never fails. The color count is drawn from the requested range and lands in it
/// unless the grid cannot hold that many (or that few) paths.
pub fn generate(params: &GenerationParams, rng: &mut LevelRng) -> Puzzle {
    let size = params.size();
    let colors = rng
        .random_range(params.color_range())
        .min(size.cell_count() / MIN_PATH_CELLS)
        .max(1);
    let max_steps = REPAIR_STEPS_PER_CELL * size.cell_count();

    for round in 1..=ROUNDS {
        let mut owner = vec![None; size.cell_count()];
        let mut regions = partition(size, colors, &mut owner, rng);
        assign_remainder(size, &mut owner, &mut regions);
        absorb_small_regions(size, &mut owner, &mut regions);

        let chains = regions
            .iter()
            .enumerate()
            .flat_map(|(region, cells)| linearize(size, &owner, region, cells))
            .collect();
        let mut layout = Layout::new(size, chains);
        match layout.repair(&params.color_range(), max_steps, rng) {
            Ok(()) => {
                debug!(
                    "fallback generator built {size} with {} colors in round {round}",
                    layout.len()
                );
                return into_puzzle(size, layout);
            }
            Err(err) => debug!("fallback round {round} on {size} failed: {err}"),
        }
    }

    let mut layout = Layout::new(size, stripes(size, colors, rng));
    if let Err(err) = layout.split_until(colors, rng) {
        debug!("stripes on {size} stop at {} colors: {err}", layout.len());
    }
    layout.shake(2 * size.cell_count(), rng);
    if !params.color_range().contains(&layout.len()) {
        let mut repaired = layout.clone();
        match repaired.repair(&params.color_range(), max_steps, rng) {
            Ok(()) => layout = repaired,
            Err(err) => debug!("stripes on {size} keep {} colors: {err}", layout.len()),
        }
    }
    debug!(
        "fallback generator used stripes on {size} with {} colors",
        layout.len()
    );
    into_puzzle(size, layout)
}

fn into_puzzle(size: GridSize, layout: Layout) -> Puzzle {
    Puzzle::from_paths(size, layout.into_paths().into_iter().map(Path::new).collect())
}

/// Grows `colors` regions with the biased depth-first snake.
///
/// Region `r` aims for `cells / colors` cells, plus one for the first
/// `cells % colors` regions. Each region starts at the lowest unassigned cell.
fn partition(
    size: GridSize,
    colors: usize,
    owner: &mut [Option<usize>],
    rng: &mut LevelRng,
) -> Vec<Vec<usize>> {
    let base = size.cell_count() / colors;
    let extra = size.cell_count() % colors;
    let mut regions = Vec::with_capacity(colors);

    for region in 0..colors {
        let target = base + usize::from(region < extra);
        let Some(start) = owner.iter().position(Option::is_none) else {
            break;
        };
        owner[start] = Some(region);
        let mut cells = vec![start];
        let mut stack = vec![start];
        let mut direction = Direction::random(rng);

        while cells.len() < target {
            let Some(&top) = stack.last() else {
                break;
            };
            if rng.random_bool(REROLL_PROBABILITY) {
                direction = Direction::random(rng);
            }
            let mut free: Vec<usize> = size
                .neighbors(top)
                .into_iter()
                .filter(|&n| owner[n].is_none())
                .collect();
            if free.is_empty() {
                stack.pop();
                continue;
            }
            free.shuffle(rng);
            if let Some(i) = free
                .iter()
                .position(|&n| Direction::between(size, top, n) == direction)
            {
                free.swap(0, i);
            }
            let next = free[0];
            owner[next] = Some(region);
            cells.push(next);
            stack.push(next);
        }
        regions.push(cells);
    }
    regions
}

/// Hands every unassigned cell to a region.
///
/// A cell joins the touching region whose middle cell is nearest. Cells touching
/// no region join the globally nearest one.
fn assign_remainder(size: GridSize, owner: &mut [Option<usize>], regions: &mut [Vec<usize>]) {
    let centers: Vec<usize> = regions.iter().map(|cells| cells[cells.len() / 2]).collect();
    if centers.is_empty() {
        return;
    }

    for cell in size.cells() {
        if owner[cell].is_some() {
            continue;
        }
        let by_distance = |&region: &usize| (size.manhattan(cell, centers[region]), region);
        let region = size
            .neighbors(cell)
            .into_iter()
            .filter_map(|n| owner[n])
            .min_by_key(by_distance)
            .or_else(|| (0..centers.len()).min_by_key(by_distance))
            .unwrap_or(0);
        owner[cell] = Some(region);
        regions[region].push(cell);
    }
}

/// Folds regions smaller than a path into the touching region with the nearest
/// middle cell. Folded regions are left empty.
fn absorb_small_regions(size: GridSize, owner: &mut [Option<usize>], regions: &mut [Vec<usize>]) {
    let centers: Vec<usize> = regions.iter().map(|cells| cells[cells.len() / 2]).collect();

    for region in 0..regions.len() {
        let cells = &regions[region];
        if cells.is_empty() || cells.len() >= MIN_PATH_CELLS {
            continue;
        }
        let origin = cells[0];
        let target = cells
            .iter()
            .flat_map(|&cell| size.neighbors(cell))
            .filter_map(|n| owner[n])
            .filter(|&other| other != region)
            .min_by_key(|&other| (size.manhattan(origin, centers[other]), other));
        let Some(target) = target else {
            continue;
        };
        let cells = std::mem::take(&mut regions[region]);
        for &cell in &cells {
            owner[cell] = Some(target);
        }
        regions[target].extend(cells);
    }
}

/// Covers a region with chains that touch themselves only between consecutive
/// cells.
fn linearize(
    size: GridSize,
    owner: &[Option<usize>],
    region: usize,
    cells: &[usize],
) -> Vec<Vec<usize>> {
    let inside = |cell: usize| owner[cell] == Some(region);
    let mut chain_of: Vec<Option<usize>> = vec![None; size.cell_count()];
    let onward = |cell: usize, chain_of: &[Option<usize>]| {
        size.neighbors(cell)
            .into_iter()
            .filter(|&n| inside(n) && chain_of[n].is_none())
            .count()
    };

    let mut chains = vec![];
    loop {
        let start = cells
            .iter()
            .copied()
            .filter(|&cell| chain_of[cell].is_none())
            .min_by_key(|&cell| (!size.is_border(cell), onward(cell, &chain_of)));
        let Some(start) = start else {
            break;
        };
        let id = chains.len();
        chain_of[start] = Some(id);
        let mut chain = vec![start];

        while let Some(&tail) = chain.last() {
            let next = size
                .neighbors(tail)
                .into_iter()
                .filter(|&n| inside(n) && chain_of[n].is_none())
                .filter(|&n| {
                    size.neighbors(n)
                        .into_iter()
                        .all(|m| m == tail || chain_of[m] != Some(id))
                })
                .min_by_key(|&n| onward(n, &chain_of));
            let Some(next) = next else {
                break;
            };
            chain_of[next] = Some(id);
            chain.push(next);
        }
        chains.push(chain);
    }
    chains
}

/// Stripe layout used when every partition round failed.
///
/// Picks the orientation whose serpentine fits in `colors` paths (the one with
/// fewer paths if neither does) and mirrors it at random.
fn stripes(size: GridSize, colors: usize, rng: &mut LevelRng) -> Vec<Vec<usize>> {
    let (width, height) = (size.width(), size.height());
    let rows = serpentine(width, height);
    let columns = serpentine(height, width);
    let transposed = match (rows.len() <= colors, columns.len() <= colors) {
        (true, true) => rng.random_bool(0.5),
        (true, false) => false,
        (false, true) => true,
        (false, false) => columns.len() < rows.len(),
    };
    let frame = if transposed { columns } else { rows };
    let flip_rows = rng.random_bool(0.5);
    let flip_cols = rng.random_bool(0.5);

    frame
        .into_iter()
        .map(|path| {
            path.into_iter()
                .map(|(r, c)| {
                    let (mut row, mut col) = if transposed { (c, r) } else { (r, c) };
                    if flip_rows {
                        row = height - 1 - row;
                    }
                    if flip_cols {
                        col = width - 1 - col;
                    }
                    size.index(Position::new(row, col))
                })
                .collect()
        })
        .collect()
}

/// Covers a `width` x `height` frame with `(row, col)` paths.
///
/// Narrow frames get one path per row. From width 4 on, the even rows are joined
/// into one snake through a cell at alternating ends of the odd rows, and the rest
/// of each odd row is a path of its own.
fn serpentine(width: usize, height: usize) -> Vec<Vec<(usize, usize)>> {
    let row = |r: usize| (0..width).map(move |c| (r, c));
    if width < 4 {
        return (0..height).map(|r| row(r).collect()).collect();
    }

    let mut spine = vec![];
    let mut rest = vec![];
    let mut r = 0;
    let mut rightward = true;
    loop {
        if rightward {
            spine.extend(row(r));
        } else {
            spine.extend(row(r).rev());
        }
        if r + 2 >= height {
            break;
        }
        let link = if rightward { width - 1 } else { 0 };
        spine.push((r + 1, link));
        rest.push(row(r + 1).filter(|&(_, c)| c != link).collect());
        r += 2;
        rightward = !rightward;
    }

    let mut paths = vec![spine];
    paths.extend(rest);
    if r + 2 == height {
        paths.push(row(height - 1).collect());
    }
    paths
}
