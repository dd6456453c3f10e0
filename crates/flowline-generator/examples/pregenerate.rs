//! Example demonstrating bulk puzzle pre-generation on worker threads.
//!
//! Every request runs an independent unique search against the same read-only
//! snapshot of the seen set. The extended sets are merged afterwards, and
//! puzzles that two workers happened to find at the same time are dropped.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example pregenerate
//! ```
//!
//! Choose the grid and the number of puzzles:
//!
//! ```sh
//! cargo run --example pregenerate -- --width 10 --height 8 --count 64
//! ```

use std::{collections::BTreeSet, process};

use clap::Parser;
use flowline_core::SeenFingerprints;
use flowline_generator::{BULK_MAX_ATTEMPTS, GenerationParams, generate_unique};
use rayon::prelude::*;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Grid width.
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Grid height.
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Number of puzzles to generate.
    #[arg(long, value_name = "COUNT", default_value_t = 32)]
    count: usize,

    /// Attempt bound of each request.
    #[arg(long, value_name = "COUNT", default_value_t = BULK_MAX_ATTEMPTS)]
    max_attempts: usize,
}

fn main() {
    let args = Args::parse();
    let params = match GenerationParams::for_grid(args.width, args.height, None) {
        Ok(params) => params,
        Err(err) => {
            eprintln!("{err}");
            process::exit(2);
        }
    };

    let snapshot = SeenFingerprints::new();
    let outcomes = (0..args.count)
        .into_par_iter()
        .map(|_| generate_unique(&params, snapshot.clone(), args.max_attempts))
        .collect::<Vec<_>>();

    let mut kept = BTreeSet::new();
    let mut seen = snapshot;
    let mut unique = 0;
    let mut warnings = 0;
    let mut fallbacks = 0;
    for outcome in outcomes {
        warnings += usize::from(outcome.warning.is_some());
        if let Some(generated) = &outcome.puzzle {
            fallbacks += usize::from(generated.used_fallback);
        }
        if outcome.is_unique {
            unique += 1;
            kept.extend(outcome.fingerprint.clone());
        }
        seen = seen.merge(outcome.seen);
    }

    println!("Grid:");
    println!("  {}", params.size());
    println!();
    println!("Results:");
    println!("  requested: {}", args.count);
    println!("  distinct: {}", kept.len());
    println!("  duplicates across workers: {}", unique - kept.len());
    println!("  with warnings: {warnings}");
    println!("  built by fallback: {fallbacks}");
    println!("  seen set size: {}", seen.len());
}
