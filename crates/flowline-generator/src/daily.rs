//! The puzzle of the day.
//!
//! Every player gets the same 8x8 puzzle for a given calendar date. The date is
//! turned into a seed (`year * 10000 + month * 100 + day`) and fed to the regular
//! generator with the default color-count heuristic.

use crate::{GeneratedPuzzle, GenerationParams, ParameterError, PuzzleGenerator, PuzzleSeed};

/// Width and height of the daily puzzle.
pub const DAILY_GRID_SIDE: usize = 8;

/// Error returned for a date the daily puzzle cannot be built for.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DailyError {
    /// The input is not of the form `YYYY-MM-DD`.
    #[display("invalid date {input:?}: expected YYYY-MM-DD")]
    Malformed {
        /// The rejected input.
        input: String,
    },
    /// Month or day is out of range for the calendar.
    #[display("invalid date {input:?}: no such day")]
    NoSuchDay {
        /// The rejected input.
        input: String,
    },
    /// The daily grid parameters were rejected.
    #[display("daily puzzle parameters: {_0}")]
    Parameters(ParameterError),
}

/// Returns the seed of the daily puzzle for `date` (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`DailyError::Malformed`] if `date` is not `YYYY-MM-DD`, and
/// [`DailyError::NoSuchDay`] for dates like `2023-02-29`.
///
/// # Examples
///
/// ```
/// use flowline_generator::{PuzzleSeed, daily_seed};
///
/// assert_eq!(daily_seed("2024-01-15")?, PuzzleSeed::new(20_240_115));
/// assert!(daily_seed("2024-02-30").is_err());
/// # Ok::<(), flowline_generator::DailyError>(())
/// ```
pub fn daily_seed(date: &str) -> Result<PuzzleSeed, DailyError> {
    let malformed = || DailyError::Malformed {
        input: date.to_owned(),
    };

    let mut parts = date.trim().split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    let year = parse_digits(year, 4).ok_or_else(malformed)?;
    let month = parse_digits(month, 2).ok_or_else(malformed)?;
    let day = parse_digits(day, 2).ok_or_else(malformed)?;

    if year == 0 || !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(DailyError::NoSuchDay {
            input: date.to_owned(),
        });
    }
    Ok(PuzzleSeed::from_date(year, month, day))
}

/// Builds the daily puzzle for `date` (`YYYY-MM-DD`).
///
/// The result only depends on the date: every call, in every process, returns
/// the same puzzle.
///
/// # Errors
///
/// Returns a [`DailyError`] if `date` is not a valid calendar date.
///
/// # Examples
///
/// ```
/// use flowline_generator::daily_puzzle;
///
/// let today = daily_puzzle("2024-01-15")?;
/// assert_eq!(today, daily_puzzle("2024-01-15")?);
/// assert_eq!(today.puzzle.size().to_string(), "8x8");
/// # Ok::<(), flowline_generator::DailyError>(())
/// ```
pub fn daily_puzzle(date: &str) -> Result<GeneratedPuzzle, DailyError> {
    let seed = daily_seed(date)?;
    let params = GenerationParams::for_grid(DAILY_GRID_SIDE, DAILY_GRID_SIDE, None)
        .map_err(DailyError::Parameters)?;
    Ok(PuzzleGenerator::new(params).generate_with_seed(seed))
}

fn parse_digits(s: &str, len: usize) -> Option<u32> {
    if s.len() != len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
