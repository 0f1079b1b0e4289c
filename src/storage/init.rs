//! Storage initialization
//!
//! Handles first-run setup: directories, default settings and empty ledgers.

use crate::config::paths::TrackerPaths;
use crate::config::settings::Settings;
use crate::error::TrackerError;
use crate::models::{Bill, Expense};

use super::file_io::write_entries;

/// Initialize storage for a fresh installation
///
/// Existing files are left alone, so running this twice is harmless.
/// Returns whether anything was created.
pub fn initialize_storage(paths: &TrackerPaths, settings: &Settings) -> Result<bool, TrackerError> {
    paths.ensure_directories()?;
    let mut created = false;

    if !paths.settings_file().exists() {
        settings.save(paths)?;
        created = true;
    }

    if !paths.expenses_file().exists() {
        write_entries::<Expense, _>(paths.expenses_file(), &[])?;
        created = true;
    }

    if !paths.bills_file().exists() {
        write_entries::<Bill, _>(paths.bills_file(), &[])?;
        created = true;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_files_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(initialize_storage(&paths, &Settings::default()).unwrap());
        assert!(paths.is_initialized());
        assert!(paths.expenses_file().exists());
        assert!(paths.bills_file().exists());

        assert!(!initialize_storage(&paths, &Settings::default()).unwrap());
    }
}
