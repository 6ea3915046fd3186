//! Persisted view history and last session
//!
//! Stored as one JSON document:
//!
//! ```json
//! {
//!   "history": [
//!     { "file_name": "/path/to/doc.pdf", "page": 20, "zoom": 1.25,
//!       "colorspace": "DeviceRGB", "location": [555, 77] }
//!   ],
//!   "session": ["/path/to/doc.pdf"]
//! }
//! ```
//!
//! Both lists are most-recently-used first and `history` holds at most one
//! record per `file_name`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::Colorspace;
use crate::error::{BrowseError, Result};

const BACKUP_TIMESTAMP: &str = "%Y-%m-%d-%H-%M-%S";

/// Saved state of one view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub file_name: String,
    pub page: usize,
    pub zoom: f32,
    pub colorspace: Colorspace,
    #[serde(default)]
    pub location: (i32, i32),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HistoryStore {
    /// Free-form application parameters, kept as found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    configuration: Option<serde_json::Value>,
    #[serde(default)]
    history: Vec<ViewSnapshot>,
    #[serde(default)]
    session: Vec<String>,
    #[serde(skip)]
    file_path: Option<PathBuf>,
    /// Set when the file on disk could not be parsed; the next write keeps a copy
    #[serde(skip)]
    backup_pending: bool,
}

impl HistoryStore {
    /// Store that lives only in memory
    pub fn ephemeral() -> Self {
        Self::default()
    }

    pub fn with_file(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ..Self::default()
        }
    }

    /// Read the store at `file_path`; a missing file gives an empty store
    pub fn load(file_path: impl Into<PathBuf>) -> Result<Self> {
        let path = file_path.into();
        if !path.exists() {
            debug!("No history file at {}", path.display());
            return Ok(Self::with_file(path));
        }

        let content = fs::read_to_string(&path).map_err(|source| BrowseError::HistoryIo {
            path: path.clone(),
            source,
        })?;
        let mut store: Self =
            serde_json::from_str(&content).map_err(|source| BrowseError::ConfigCorrupt {
                path: path.clone(),
                source,
            })?;
        info!(
            "Loaded {} history entries and {} session paths from {}",
            store.history.len(),
            store.session.len(),
            path.display()
        );
        store.file_path = Some(path);
        Ok(store)
    }

    /// [`HistoryStore::load`], falling back to an empty store on a corrupt file.
    ///
    /// The unreadable file is backed up before it is first overwritten.
    pub fn load_or_empty(file_path: impl Into<PathBuf>) -> Self {
        let path = file_path.into();
        match Self::load(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                warn!("Starting with empty history: {e}");
                let mut store = Self::with_file(path);
                store.backup_pending = true;
                store
            }
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Write the whole store, optionally moving the previous file aside first
    pub fn persist(&mut self, backup: bool) -> Result<()> {
        let Some(path) = self.file_path.clone() else {
            return Ok(());
        };
        let io_err = |source| BrowseError::HistoryIo {
            path: path.clone(),
            source,
        };

        if (backup || self.backup_pending) && path.exists() {
            let target = unused_backup_path(&path, Local::now());
            fs::rename(&path, &target).map_err(io_err)?;
            info!("Backed up {} to {}", path.display(), target.display());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(|source| {
            BrowseError::ConfigCorrupt {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, content).map_err(io_err)?;
        self.backup_pending = false;
        debug!("Saved history to {}", path.display());
        Ok(())
    }

    /// All records, most recent first
    pub fn history(&self) -> &[ViewSnapshot] {
        &self.history
    }

    pub fn most_recent(&self) -> Option<&ViewSnapshot> {
        self.history.first()
    }

    pub fn find(&self, path: &str) -> Option<&ViewSnapshot> {
        self.history.iter().find(|s| s.file_name == path)
    }

    /// Move `record` to the front, replacing any record for the same file, and save
    pub fn update(&mut self, record: ViewSnapshot) -> Result<()> {
        self.upsert(record);
        self.persist(false).inspect_err(|e| error!("Failed to save history: {e}"))
    }

    fn upsert(&mut self, record: ViewSnapshot) {
        self.history.retain(|s| s.file_name != record.file_name);
        self.history.insert(0, record);
    }

    /// Documents that were open when the application last closed all views
    pub fn session_paths(&self) -> &[String] {
        &self.session
    }

    /// Record the documents open at exit and their snapshots, then save with backup.
    ///
    /// Both arguments are most recent first. Snapshots are upserted from the
    /// oldest so the most recent view ends up at the front of the history.
    pub fn save_session(&mut self, paths: Vec<String>, snapshots: Vec<ViewSnapshot>) -> Result<()> {
        info!("Saving session with {} documents", paths.len());
        self.session = paths;
        for snapshot in snapshots.into_iter().rev() {
            self.upsert(snapshot);
        }
        self.persist(true)
            .inspect_err(|e| error!("Failed to save session: {e}"))
    }
}

/// `dir/name.ext` → `dir/name_YYYY-MM-DD-HH-MM-SS.ext`
pub fn backup_path(path: &Path, timestamp: DateTime<Local>) -> PathBuf {
    with_suffix(path, &timestamp.format(BACKUP_TIMESTAMP).to_string())
}

/// [`backup_path`], with `_1`, `_2`, ... appended while the name is taken
fn unused_backup_path(path: &Path, timestamp: DateTime<Local>) -> PathBuf {
    let stamp = timestamp.format(BACKUP_TIMESTAMP).to_string();
    std::iter::once(stamp.clone())
        .chain((1..).map(|n| format!("{stamp}_{n}")))
        .map(|suffix| with_suffix(path, &suffix))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| backup_path(path, timestamp))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_{suffix}{extension}"))
}
