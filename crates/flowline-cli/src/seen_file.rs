//! The seen-fingerprint file: one fingerprint per line.
//!
//! Blank lines and lines starting with `#` are ignored. A missing file is an
//! empty set.

use std::{fs, io, path::Path};

use flowline_core::SeenFingerprints;
use log::debug;

use crate::error::CliError;

pub(crate) fn load(path: &Path) -> Result<SeenFingerprints, CliError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist, starting with no seen puzzles", path.display());
            return Ok(SeenFingerprints::new());
        }
        Err(source) => {
            return Err(CliError::Io {
                path: path.to_owned(),
                source,
            });
        }
    };

    let seen = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, entry)| {
            entry.parse().map_err(|source| CliError::SeenEntry {
                path: path.to_owned(),
                line,
                source,
            })
        })
        .collect::<Result<SeenFingerprints, _>>()?;
    debug!("loaded {} seen puzzles from {}", seen.len(), path.display());
    Ok(seen)
}

pub(crate) fn save(path: &Path, seen: &SeenFingerprints) -> Result<(), CliError> {
    let mut text = String::new();
    for fingerprint in seen.iter() {
        text.push_str(fingerprint.as_str());
        text.push('\n');
    }
    fs::write(path, text).map_err(|source| CliError::Io {
        path: path.to_owned(),
        source,
    })
}
