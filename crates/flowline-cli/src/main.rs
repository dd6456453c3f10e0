//! Command-line front end for the flowline puzzle generator.
//!
//! ```sh
//! flowline generate --width 8 --height 8 --seed 42
//! flowline unique --width 10 --height 10 --seen ~/.flowline-seen
//! flowline daily 2024-01-15
//! flowline validate puzzle.txt
//! ```
//!
//! Set `RUST_LOG=debug` to watch the generators work.

use std::{
    fs,
    io::{self, Read as _},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use flowline_core::{Fingerprint, Puzzle, validate};
use flowline_generator::{
    GeneratedPuzzle, GenerationParams, GeneratorConfig, INTERACTIVE_MAX_ATTEMPTS, PuzzleGenerator,
    PuzzleSeed, UniqueSearch, daily_puzzle,
};
use log::{debug, info};

use crate::error::CliError;

mod error;
mod seen_file;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one puzzle.
    Generate {
        #[command(flatten)]
        grid: GridArgs,

        /// Seed to generate from; random if omitted.
        #[arg(long)]
        seed: Option<PuzzleSeed>,
    },
    /// Generate a puzzle that is not in the seen file, and record it there.
    Unique {
        #[command(flatten)]
        grid: GridArgs,

        /// Candidates to try before giving up on uniqueness.
        #[arg(long, value_name = "COUNT", default_value_t = INTERACTIVE_MAX_ATTEMPTS)]
        max_attempts: usize,

        /// File of seen fingerprints, one per line.
        #[arg(long, value_name = "FILE")]
        seen: PathBuf,
    },
    /// Print the puzzle of the day.
    Daily {
        /// Date as YYYY-MM-DD.
        date: String,
    },
    /// Check a puzzle drawn as a text grid.
    Validate {
        /// File holding the grid; reads standard input if omitted or `-`.
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct GridArgs {
    /// Grid width.
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Grid height.
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Fewest colors; derived from the grid size if omitted.
    #[arg(long)]
    min_colors: Option<usize>,

    /// Most colors; derived from the grid size if omitted.
    #[arg(long)]
    max_colors: Option<usize>,

    /// Number of distinct colors available.
    #[arg(long)]
    palette: Option<usize>,

    /// Primary generator attempts before the fallback takes over.
    #[arg(long, value_name = "COUNT", default_value_t = GeneratorConfig::default().attempt_budget)]
    attempt_budget: usize,
}

impl GridArgs {
    fn generator(&self) -> Result<PuzzleGenerator, CliError> {
        let derived = GenerationParams::for_grid(self.width, self.height, self.palette)
            .map_err(CliError::Parameters)?;
        let params = GenerationParams::new(
            self.width,
            self.height,
            self.min_colors.unwrap_or(derived.min_colors()),
            self.max_colors.unwrap_or(derived.max_colors()),
            self.palette,
        )
        .map_err(CliError::Parameters)?;
        let config = GeneratorConfig {
            attempt_budget: self.attempt_budget,
            ..GeneratorConfig::default()
        };
        Ok(PuzzleGenerator::new(params).with_config(config))
    }
}

fn main() -> ExitCode {
    better_panic::install();
    env_logger::init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Command) -> Result<ExitCode, CliError> {
    match command {
        Command::Generate { grid, seed } => {
            let generator = grid.generator()?;
            let generated = match seed {
                Some(seed) => generator.generate_with_seed(seed),
                None => generator.generate(),
            };
            print_generated(&generated);
            Ok(ExitCode::SUCCESS)
        }
        Command::Unique {
            grid,
            max_attempts,
            seen,
        } => {
            let generator = grid.generator()?;
            let known = seen_file::load(&seen)?;
            let outcome = UniqueSearch::new(generator, known, max_attempts).run(|report| {
                debug!(
                    "attempt {}/{} rejected: {}",
                    report.attempt, report.max_attempts, report.rejection
                );
            });
            if let Some(warning) = &outcome.warning {
                eprintln!("warning: {warning}");
            }
            let Some(generated) = &outcome.puzzle else {
                eprintln!("no puzzle generated");
                return Ok(ExitCode::FAILURE);
            };
            print_generated(generated);
            println!("Attempts:");
            println!("  {}", outcome.attempts_used);
            if outcome.is_unique {
                seen_file::save(&seen, &outcome.seen)?;
                info!("recorded {} seen puzzles in {}", outcome.seen.len(), seen.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Daily { date } => {
            let generated = daily_puzzle(&date).map_err(CliError::Daily)?;
            print_generated(&generated);
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { file } => {
            let (path, text) = read_input(file)?;
            let puzzle: Puzzle = text
                .parse()
                .map_err(|source| CliError::Puzzle { path, source })?;
            println!("Fingerprint:");
            println!("  {}", Fingerprint::of(&puzzle));
            match validate(&puzzle) {
                Ok(()) => {
                    println!("Valid");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("Invalid: {err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn read_input(file: Option<PathBuf>) -> Result<(PathBuf, String), CliError> {
    match file {
        Some(path) if path.as_os_str() != "-" => {
            let text = fs::read_to_string(&path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            Ok((path, text))
        }
        _ => {
            let path = PathBuf::from("<stdin>");
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?;
            Ok((path, text))
        }
    }
}

fn print_generated(generated: &GeneratedPuzzle) {
    let puzzle = &generated.puzzle;
    println!("Seed:");
    println!("  {}", generated.seed);
    println!();
    println!("Grid:");
    println!("  {} with {} colors", puzzle.size(), puzzle.difficulty());
    if generated.used_fallback {
        println!("  built by the fallback generator");
    }
    println!();
    println!("Fingerprint:");
    println!("  {}", Fingerprint::of(puzzle));
    println!();
    println!("Solution:");
    for line in puzzle.to_string().lines() {
        println!("  {line}");
    }
    println!();
    if let Err(err) = validate(puzzle) {
        println!("Invalid:");
        println!("  {err}");
        println!();
    }
}
