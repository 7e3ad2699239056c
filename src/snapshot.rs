//! Persistence of the last known snapshot.
//!
//! The snapshot is stored as a pretty-printed JSON array and overwritten on
//! every poll, so a restarted process resumes diffing against it.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::flight::Snapshot;

/// Reads the persisted snapshot.
///
/// A missing or unreadable file yields an empty snapshot.
pub fn load_snapshot(path: &Path) -> Snapshot {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "No persisted snapshot, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Snapshot>(&content) {
        Ok(snapshot) => {
            debug!(path = %path.display(), flights = snapshot.len(), "Loaded persisted snapshot");
            snapshot
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Persisted snapshot is corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Replaces the persisted snapshot, creating parent directories as needed.
///
/// The JSON goes to a sibling `.tmp` file first and is renamed over `path`,
/// so readers see either the old snapshot or the new one, never a partial
/// write.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    let staging = staging_path(path);
    fs::write(&staging, json)
        .with_context(|| format!("writing snapshot to {}", staging.display()))?;
    fs::rename(&staging, path)
        .with_context(|| format!("moving snapshot into place at {}", path.display()))?;

    debug!(path = %path.display(), flights = snapshot.len(), "Saved snapshot");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::{Airport, FlightRecord};

    fn sample() -> Snapshot {
        vec![
            FlightRecord::departure(
                "LG4711",
                "Luxair",
                Airport::new(Some("CDG"), "Paris"),
                "10:00",
                "10:35",
            )
            .with_gate("A", "12"),
            FlightRecord::arrival(
                "LH390",
                "Lufthansa",
                Airport::new(None, "Frankfurt"),
                "09:10",
                "09:10",
            ),
        ]
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("state.json");

        save_snapshot(&path, &sample()).unwrap();

        assert_eq!(load_snapshot(&path), sample());
    }

    #[test]
    fn test_saved_file_is_pretty_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        save_snapshot(&path, &sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n"));
        assert!(content.contains("\"scheduledDeparture\": \"10:00\""));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        save_snapshot(&path, &sample()).unwrap();
        save_snapshot(&path, &Vec::new()).unwrap();

        assert!(load_snapshot(&path).is_empty());
    }

    #[test]
    fn test_save_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[]").unwrap();

        save_snapshot(&path, &sample()).unwrap();

        assert_eq!(load_snapshot(&path), sample());
        assert_eq!(staging_path(&path), dir.path().join("state.json.tmp"));
        assert!(!staging_path(&path).exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot(&dir.path().join("absent.json")).is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[{\"type\": \"departure\"").unwrap();

        assert!(load_snapshot(&path).is_empty());
    }
}
