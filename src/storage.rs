// Persistence adapter: one JSON document on disk

use crate::error::StoreError;
use crate::models::{SortKey, SortOrder, Task};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STORE_FILE_NAME: &str = "board.json";

/// Full persisted state: the record collection plus the view controls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    #[serde(default)]
    pub records: Vec<Task>,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub search_term: String,
}

/// Resolve the store file location.
///
/// `TASKBOARD_STORE_PATH` wins when set and non-blank, otherwise the
/// platform data directory is used.
pub fn default_store_path() -> PathBuf {
    if let Ok(path) = std::env::var("TASKBOARD_STORE_PATH")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskboard")
        .join(STORE_FILE_NAME)
}

/// Write the full state to `path`.
///
/// The document is written to a temp file in the same directory under an
/// exclusive lock, synced, then renamed over the target. A failed save
/// leaves the previous document in place.
pub fn save(path: &Path, state: &StoreState) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(state)?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.lock_exclusive()?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        // Lock is released when file is dropped
    }
    fs::rename(&tmp_path, path)?;

    debug!(file = ?path, records = state.records.len(), "Saved store state");
    Ok(())
}

/// Read the full state from `path`.
///
/// A missing file, an unreadable file, or a document that fails to decode
/// all degrade to the default empty state. This never returns an error:
/// a corrupt blob must not take the application down.
pub fn load(path: &Path) -> StoreState {
    if !path.exists() {
        return StoreState::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(file = ?path, error = ?e, "Failed to read store file, starting empty");
            return StoreState::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            warn!(file = ?path, error = ?e, "Failed to decode store file, starting empty");
            StoreState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Status};
    use tempfile::TempDir;

    fn sample_task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: Some("notes".to_string()),
            status: Status::Pending,
            priority: Priority::High,
            due_date: Some(1_700_000_000_000),
            assigned_to: None,
            created_at: 1000,
            updated_at: 2000,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("board.json");

        let state = StoreState {
            records: vec![sample_task("t1", "one"), sample_task("t2", "two")],
            sort_by: SortKey::Title,
            sort_order: SortOrder::Desc,
            search_term: "repo".to_string(),
        };

        save(&path, &state).unwrap();
        let loaded = load(&path);

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.json");

        let loaded = load(&path);
        assert_eq!(loaded, StoreState::default());
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.sort_by, SortKey::DueDate);
        assert_eq!(loaded.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_load_corrupt_file_returns_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("board.json");
        fs::write(&path, "{not json at all").unwrap();

        let loaded = load(&path);
        assert_eq!(loaded, StoreState::default());
    }

    #[test]
    fn test_load_wrong_shape_returns_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("board.json");
        fs::write(&path, r#"{"records": "not-a-list"}"#).unwrap();

        let loaded = load(&path);
        assert_eq!(loaded, StoreState::default());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("board.json");

        save(&path, &StoreState::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("board.json");

        save(&path, &StoreState::default()).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_persisted_layout_uses_camel_case_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("board.json");

        let state = StoreState {
            records: vec![sample_task("t1", "one")],
            ..Default::default()
        };
        save(&path, &state).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"sortBy\""));
        assert!(content.contains("\"sortOrder\""));
        assert!(content.contains("\"searchTerm\""));
        assert!(content.contains("\"dueDate\""));
    }
}
