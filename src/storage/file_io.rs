//! Ledger file I/O with atomic writes
//!
//! Each entry collection lives in one JSON document:
//!
//! ```json
//! { "version": 1, "entries": [ ... ] }
//! ```
//!
//! A missing file is an empty ledger. An unreadable or unparsable file is a
//! `Storage` error, never an empty result.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::TrackerError;

/// Current on-disk layout version
pub const LEDGER_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct LedgerFile<T> {
    version: u32,
    #[serde(default = "Vec::new")]
    entries: Vec<T>,
}

/// Read every entry from a ledger file
pub fn read_entries<T, P>(path: P) -> Result<Vec<T>, TrackerError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .map_err(|e| TrackerError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let ledger: LedgerFile<T> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| TrackerError::Storage(format!("Failed to parse {}: {}", path.display(), e)))?;

    if ledger.version > LEDGER_FILE_VERSION {
        return Err(TrackerError::Storage(format!(
            "{} was written by a newer version (layout {}, supported {})",
            path.display(),
            ledger.version,
            LEDGER_FILE_VERSION
        )));
    }

    Ok(ledger.entries)
}

/// Replace a ledger file's entries atomically
///
/// Writes to a sibling temp file, syncs it, then renames over the target, so
/// a crash leaves either the old or the new ledger on disk.
pub fn write_entries<T, P>(path: P, entries: &[T]) -> Result<(), TrackerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_err("Failed to create directory for", path, e))?;
    }

    #[derive(Serialize)]
    struct LedgerRef<'a, T> {
        version: u32,
        entries: &'a [T],
    }

    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| storage_err("Failed to create temp file for", path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(
        &mut writer,
        &LedgerRef {
            version: LEDGER_FILE_VERSION,
            entries,
        },
    )
    .map_err(|e| storage_err("Failed to serialize", path, e))?;
    writer.flush().map_err(|e| storage_err("Failed to flush", path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| storage_err("Failed to sync", path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_err("Failed to replace", path, e)
    })
}

fn storage_err(what: &str, path: &Path, e: impl std::fmt::Display) -> TrackerError {
    TrackerError::Storage(format!("{} {}: {}", what, path.display(), e))
}
