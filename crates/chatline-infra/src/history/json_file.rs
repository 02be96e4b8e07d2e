//! JSON file history backend.
//!
//! The whole table lives in one JSON document:
//!
//! ```json
//! {"42":[{"role":"system","content":"..."},{"role":"user","content":"hola"}]}
//! ```
//!
//! Saves write a sibling temp file and rename it over the snapshot, so a
//! crash or a full disk never leaves a half-written file behind. Corrupt
//! snapshots are renamed to `<file>.corrupt-<UTC timestamp>`; earlier
//! quarantined files are never overwritten.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use chatline_core::history::backend::HistoryBackend;
use chatline_types::error::HistoryError;
use chatline_types::transcript::HistoryTable;

/// Snapshot stored as a single JSON file.
pub struct JsonFileHistoryBackend {
    path: PathBuf,
}

impl JsonFileHistoryBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".tmp")
    }

    /// Where a corrupt snapshot found at `at` is moved by
    /// [`HistoryBackend::quarantine`]. `attempt` disambiguates quarantines
    /// within the same millisecond.
    pub fn quarantine_path_at(&self, at: DateTime<Utc>, attempt: u32) -> PathBuf {
        let stamp = at.format("%Y%m%dT%H%M%S%.3fZ");
        let suffix = if attempt == 0 {
            format!(".corrupt-{stamp}")
        } else {
            format!(".corrupt-{stamp}-{attempt}")
        };
        sibling_with_suffix(&self.path, &suffix)
    }

    async fn free_quarantine_path(&self) -> Result<PathBuf, HistoryError> {
        let now = Utc::now();
        let mut attempt = 0;
        loop {
            let candidate = self.quarantine_path_at(now, attempt);
            let taken = tokio::fs::try_exists(&candidate)
                .await
                .map_err(|e| HistoryError::Write(format!("{}: {e}", candidate.display())))?;
            if !taken {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

impl HistoryBackend for JsonFileHistoryBackend {
    fn name(&self) -> &str {
        "json"
    }

    async fn load(&self) -> Result<HistoryTable, HistoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No history file yet");
                return Ok(HistoryTable::new());
            }
            Err(e) => {
                return Err(HistoryError::Read(format!("{}: {e}", self.path.display())));
            }
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| HistoryError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    async fn save(&self, table: &HistoryTable) -> Result<(), HistoryError> {
        let body = serde_json::to_vec(table)
            .map_err(|e| HistoryError::Write(format!("failed to serialize history: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HistoryError::Write(format!("{}: {e}", parent.display())))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| HistoryError::Write(format!("{}: {e}", tmp.display())))?;

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(HistoryError::Write(format!("{}: {e}", self.path.display())));
        }
        Ok(())
    }

    async fn quarantine(&self) -> Result<(), HistoryError> {
        let target = self.free_quarantine_path().await?;
        tokio::fs::rename(&self.path, &target)
            .await
            .map_err(|e| HistoryError::Write(format!("{}: {e}", target.display())))?;
        tracing::warn!(
            from = %self.path.display(),
            to = %target.display(),
            "Moved corrupt history aside"
        );
        Ok(())
    }
}
