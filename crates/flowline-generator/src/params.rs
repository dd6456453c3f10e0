//! Generation parameters and generator tunables.

use flowline_core::GridSize;

/// Number of distinct colors available when the caller does not specify a palette.
pub const DEFAULT_PALETTE_SIZE: usize = 20;

/// Smallest allowed grid width or height.
pub const MIN_GRID_SIDE: usize = 3;

/// Fewest cells a generated path may have.
pub const MIN_PATH_CELLS: usize = 3;

/// Malformed generation parameters.
///
/// These indicate a caller bug rather than a generation difficulty, so they are
/// reported immediately instead of being retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParameterError {
    /// Width or height below [`MIN_GRID_SIDE`].
    #[display(
        "grid {width}x{height} is too small, both sides must be at least {}",
        MIN_GRID_SIDE
    )]
    GridTooSmall {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// A palette with no colors.
    #[display("palette is empty")]
    EmptyPalette,
    /// `min_colors` is zero.
    #[display("at least one color is required")]
    NoColors,
    /// `min_colors > max_colors`.
    #[display("color range {min}..={max} is empty")]
    ColorRangeInverted {
        /// Requested minimum.
        min: usize,
        /// Requested maximum.
        max: usize,
    },
    /// `min_colors` exceeds the palette size.
    #[display("{min_colors} colors requested but the palette only has {palette}")]
    PaletteTooSmall {
        /// Requested minimum.
        min_colors: usize,
        /// Palette size.
        palette: usize,
    },
    /// The grid cannot hold `min_colors` paths of [`MIN_PATH_CELLS`] cells.
    #[display("{min_colors} colors do not fit in {cells} cells")]
    TooManyColors {
        /// Requested minimum.
        min_colors: usize,
        /// Cells in the grid.
        cells: usize,
    },
}

/// Validated parameters of a generation request.
///
/// # Examples
///
/// ```
/// use flowline_generator::{GenerationParams, ParameterError};
///
/// let params = GenerationParams::new(5, 5, 4, 30, None)?;
/// // The maximum is clamped to the default palette of 20 colors.
/// assert_eq!(params.color_range(), 4..=20);
///
/// assert_eq!(
///     GenerationParams::new(2, 5, 1, 2, None),
///     Err(ParameterError::GridTooSmall { width: 2, height: 5 })
/// );
/// # Ok::<(), ParameterError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    size: GridSize,
    min_colors: usize,
    max_colors: usize,
    palette_size: usize,
}

impl GenerationParams {
    /// Validates and creates generation parameters.
    ///
    /// `palette` is the number of distinct colors available; `None` selects
    /// [`DEFAULT_PALETTE_SIZE`]. `max_colors` may exceed the palette, in which case it
    /// is clamped.
    ///
    /// # Errors
    ///
    /// Returns a [`ParameterError`] describing the first malformed input.
    pub fn new(
        width: usize,
        height: usize,
        min_colors: usize,
        max_colors: usize,
        palette: Option<usize>,
    ) -> Result<Self, ParameterError> {
        if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
            return Err(ParameterError::GridTooSmall { width, height });
        }
        let palette_size = palette.unwrap_or(DEFAULT_PALETTE_SIZE);
        if palette_size == 0 {
            return Err(ParameterError::EmptyPalette);
        }
        if min_colors == 0 {
            return Err(ParameterError::NoColors);
        }
        if min_colors > max_colors {
            return Err(ParameterError::ColorRangeInverted {
                min: min_colors,
                max: max_colors,
            });
        }
        if min_colors > palette_size {
            return Err(ParameterError::PaletteTooSmall {
                min_colors,
                palette: palette_size,
            });
        }
        let size = GridSize::new(width, height);
        if min_colors * MIN_PATH_CELLS > size.cell_count() {
            return Err(ParameterError::TooManyColors {
                min_colors,
                cells: size.cell_count(),
            });
        }
        Ok(Self {
            size,
            min_colors,
            max_colors,
            palette_size,
        })
    }

    /// Parameters with the default color count for a grid size.
    ///
    /// With `side = (width + height) / 2`, the color count ranges over
    /// `max(2, side - 2)..=side`, bounded by the palette and by what the grid holds.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::GridTooSmall`] or [`ParameterError::EmptyPalette`].
    ///
    /// # Examples
    ///
    /// ```
    /// use flowline_generator::GenerationParams;
    ///
    /// let params = GenerationParams::for_grid(8, 8, None)?;
    /// assert_eq!(params.color_range(), 6..=8);
    /// # Ok::<(), flowline_generator::ParameterError>(())
    /// ```
    pub fn for_grid(
        width: usize,
        height: usize,
        palette: Option<usize>,
    ) -> Result<Self, ParameterError> {
        if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
            return Err(ParameterError::GridTooSmall { width, height });
        }
        let palette_size = palette.unwrap_or(DEFAULT_PALETTE_SIZE);
        let fits = width * height / MIN_PATH_CELLS;
        let side = (width + height) / 2;
        let max = side.min(fits);
        let min = side.saturating_sub(2).max(2).min(max).min(palette_size);
        Self::new(width, height, min, max, Some(palette_size))
    }

    /// Grid dimensions.
    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Minimum number of colors.
    #[must_use]
    pub fn min_colors(&self) -> usize {
        self.min_colors
    }

    /// Maximum number of colors, clamped to the palette.
    #[must_use]
    pub fn max_colors(&self) -> usize {
        self.max_colors.min(self.palette_size)
    }

    /// Number of distinct colors available.
    #[must_use]
    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    /// The inclusive range color counts are drawn from.
    #[must_use]
    pub fn color_range(&self) -> std::ops::RangeInclusive<usize> {
        self.min_colors..=self.max_colors()
    }
}

/// Tunables of the primary generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Attempts the primary generator makes before handing over to the fallback.
    pub attempt_budget: usize,
    /// Empty cells sampled when choosing where a new path starts.
    pub start_samples: usize,
    /// Grids with fewer cells than this use the one-step dead-end lookahead.
    pub lookahead_cell_limit: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            attempt_budget: 2000,
            start_samples: 15,
            lookahead_cell_limit: 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_parameters() {
        assert_eq!(
            GenerationParams::new(3, 2, 1, 1, None),
            Err(ParameterError::GridTooSmall { width: 3, height: 2 })
        );
        assert_eq!(
            GenerationParams::new(5, 5, 2, 3, Some(0)),
            Err(ParameterError::EmptyPalette)
        );
        assert_eq!(
            GenerationParams::new(5, 5, 0, 3, None),
            Err(ParameterError::NoColors)
        );
        assert_eq!(
            GenerationParams::new(5, 5, 4, 3, None),
            Err(ParameterError::ColorRangeInverted { min: 4, max: 3 })
        );
        assert_eq!(
            GenerationParams::new(10, 10, 6, 8, Some(5)),
            Err(ParameterError::PaletteTooSmall {
                min_colors: 6,
                palette: 5
            })
        );
        assert_eq!(
            GenerationParams::new(3, 3, 4, 4, None),
            Err(ParameterError::TooManyColors {
                min_colors: 4,
                cells: 9
            })
        );
    }

    #[test]
    fn test_max_colors_clamped_to_palette() {
        let params = GenerationParams::new(10, 10, 3, 12, Some(8)).unwrap();
        assert_eq!(params.max_colors(), 8);
        assert_eq!(params.color_range(), 3..=8);
    }

    #[test]
    fn test_for_grid_heuristic() {
        assert_eq!(
            GenerationParams::for_grid(5, 5, None).unwrap().color_range(),
            3..=5
        );
        assert_eq!(
            GenerationParams::for_grid(3, 3, None).unwrap().color_range(),
            2..=3
        );
        assert_eq!(
            GenerationParams::for_grid(12, 8, None).unwrap().color_range(),
            8..=10
        );
        // Large grids are limited by the palette.
        assert_eq!(
            GenerationParams::for_grid(40, 40, None).unwrap().color_range(),
            20..=20
        );
        assert_eq!(
            GenerationParams::for_grid(40, 40, Some(6)).unwrap().color_range(),
            6..=6
        );
    }

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.attempt_budget, 2000);
        assert_eq!(config.start_samples, 15);
        assert_eq!(config.lookahead_cell_limit, 400);
    }
}
