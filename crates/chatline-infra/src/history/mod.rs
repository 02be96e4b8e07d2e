//! History backends and backend selection.

pub mod json_file;
pub mod sqlite;

use std::path::Path;

use chatline_core::history::backend::HistoryBackend;
use chatline_core::history::memory::InMemoryHistoryBackend;
use chatline_types::config::HistoryBackendKind;
use chatline_types::error::HistoryError;
use chatline_types::transcript::HistoryTable;

pub use json_file::JsonFileHistoryBackend;
pub use sqlite::SqliteHistoryBackend;

use crate::sqlite::pool::DatabasePool;

/// The backend chosen at startup.
///
/// `HistoryBackend` uses RPITIT and is not object-safe, so the concrete
/// backends are wrapped in an enum instead of a trait object.
pub enum AnyHistoryBackend {
    Json(JsonFileHistoryBackend),
    Sqlite(SqliteHistoryBackend),
    Memory(InMemoryHistoryBackend),
}

impl AnyHistoryBackend {
    /// A process-local backend that forgets everything on exit.
    pub fn ephemeral() -> Self {
        AnyHistoryBackend::Memory(InMemoryHistoryBackend::new())
    }
}

/// Open the configured backend at `path`.
pub async fn open_backend(
    kind: HistoryBackendKind,
    path: &Path,
) -> Result<AnyHistoryBackend, HistoryError> {
    match kind {
        HistoryBackendKind::Json => Ok(AnyHistoryBackend::Json(JsonFileHistoryBackend::new(path))),
        HistoryBackendKind::Sqlite => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| HistoryError::Write(format!("{}: {e}", parent.display())))?;
            }
            let pool = DatabasePool::open(path)
                .await
                .map_err(|e| HistoryError::Read(format!("{}: {e}", path.display())))?;
            Ok(AnyHistoryBackend::Sqlite(SqliteHistoryBackend::new(pool)))
        }
    }
}

impl HistoryBackend for AnyHistoryBackend {
    fn name(&self) -> &str {
        match self {
            AnyHistoryBackend::Json(b) => b.name(),
            AnyHistoryBackend::Sqlite(b) => b.name(),
            AnyHistoryBackend::Memory(b) => b.name(),
        }
    }

    async fn load(&self) -> Result<HistoryTable, HistoryError> {
        match self {
            AnyHistoryBackend::Json(b) => b.load().await,
            AnyHistoryBackend::Sqlite(b) => b.load().await,
            AnyHistoryBackend::Memory(b) => b.load().await,
        }
    }

    async fn save(&self, table: &HistoryTable) -> Result<(), HistoryError> {
        match self {
            AnyHistoryBackend::Json(b) => b.save(table).await,
            AnyHistoryBackend::Sqlite(b) => b.save(table).await,
            AnyHistoryBackend::Memory(b) => b.save(table).await,
        }
    }

    async fn quarantine(&self) -> Result<(), HistoryError> {
        match self {
            AnyHistoryBackend::Json(b) => b.quarantine().await,
            AnyHistoryBackend::Sqlite(b) => b.quarantine().await,
            AnyHistoryBackend::Memory(b) => b.quarantine().await,
        }
    }
}
