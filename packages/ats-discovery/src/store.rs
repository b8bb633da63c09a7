//! Per-platform URL store.
//!
//! A CSV file with a header row and one canonical URL per row. Loaded once
//! at the start of a platform run and rewritten in full, sorted, at the end.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::matcher::CanonicalUrl;
use crate::merge::DiscoveredSet;

/// Column name used by stores written before per-platform columns existed.
pub const LEGACY_COLUMN: &str = "url";

/// Read the URLs stored at `path`.
///
/// A missing file is an empty set (first run). When `column` is absent the
/// legacy `url` column is tried; when neither exists the set is empty.
pub fn load(path: &Path, column: &str) -> StoreResult<DiscoveredSet> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(DiscoveredSet::new()),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers().map_err(csv_err)?.clone();
    let (index, legacy) = match headers.iter().position(|h| h == column) {
        Some(i) => (i, false),
        None => match headers.iter().position(|h| h == LEGACY_COLUMN) {
            Some(i) => (i, true),
            None => {
                warn!(
                    path = %path.display(),
                    column = %column,
                    "Store has neither the expected nor the legacy column, treating as empty"
                );
                return Ok(DiscoveredSet::new());
            }
        },
    };

    let mut urls = DiscoveredSet::new();
    for record in reader.records() {
        // One bad row must not cost the rest of the store
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(csv_err(e)),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    line = ?e.position().map(|p| p.line()),
                    error = %e,
                    "Skipping unreadable store row"
                );
                continue;
            }
        };
        if let Some(value) = record.get(index).filter(|v| !v.is_empty()) {
            urls.insert(CanonicalUrl::new(value));
        }
    }

    if legacy {
        info!(path = %path.display(), count = urls.len(), "Found existing URLs (legacy format)");
    } else {
        info!(path = %path.display(), count = urls.len(), "Found existing URLs");
    }

    Ok(urls)
}

/// Like [`load`], but an unreadable store degrades to an empty set.
///
/// The failure is logged as a warning; the run continues and may re-add
/// URLs the unreadable store already held.
pub fn load_or_empty(path: &Path, column: &str) -> DiscoveredSet {
    match load(path, column) {
        Ok(urls) => urls,
        Err(e) => {
            warn!(error = %e, "Could not read existing store, continuing with an empty set");
            DiscoveredSet::new()
        }
    }
}

/// Overwrite the store at `path` with `urls`, sorted, under header `column`.
///
/// Written to a sibling temp file and renamed into place, so a failed
/// write leaves the previous contents intact.
pub fn persist(urls: &DiscoveredSet, path: &Path, column: &str) -> StoreResult<()> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp = temp_path(path);
    let result = write_csv(urls, &tmp, column).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }

    Ok(())
}

fn write_csv(urls: &DiscoveredSet, path: &Path, column: &str) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;

    writer.write_record([column])?;
    for url in urls.iter() {
        writer.write_record([url.as_str()])?;
    }
    writer.flush()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
