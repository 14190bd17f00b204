use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::error::ExamplesError;

#[derive(Debug, Clone, Serialize)]
pub struct UnzipReport {
    pub directory: PathBuf,
    pub extracted: Vec<String>,
    pub skipped: Vec<String>,
}

/// Extracts `zip_path` into a sibling directory named after the archive
/// (`data/x_05.zip` -> `data/x_05/`), whatever the archive's inner layout.
///
/// Entries are flattened to their file names. Files already present in the
/// destination are left untouched and reported as skipped.
pub fn unzip_to_dir(zip_path: &Path) -> Result<UnzipReport, ExamplesError> {
    let directory = zip_path.with_extension("");
    info!("Unzipping to '{}'", directory.display());

    let file = fs::File::open(zip_path).map_err(|err| {
        ExamplesError::Filesystem(format!("open zip {}: {err}", zip_path.display()))
    })?;
    let mut archive =
        ZipArchive::new(file).map_err(|err| ExamplesError::Archive(err.to_string()))?;
    fs::create_dir_all(&directory).map_err(|err| ExamplesError::Filesystem(err.to_string()))?;

    let mut extracted = Vec::new();
    let mut skipped = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| ExamplesError::Archive(err.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = flat_name(entry.name()) else {
            continue;
        };

        let target = directory.join(&name);
        if target.exists() {
            warn!("No unzipping of '{name}': file already exists.");
            skipped.push(name);
            continue;
        }
        let mut outfile =
            fs::File::create(&target).map_err(|err| ExamplesError::Filesystem(err.to_string()))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|err| ExamplesError::Filesystem(err.to_string()))?;
        extracted.push(name);
    }

    Ok(UnzipReport {
        directory,
        extracted,
        skipped,
    })
}

fn flat_name(entry_name: &str) -> Option<String> {
    entry_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}
