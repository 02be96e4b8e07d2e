//! HistoryBackend trait definition.
//!
//! A backend persists the whole history table as one snapshot. Implementations
//! live in chatline-infra (JSON file, SQLite) plus the in-memory backend in
//! this crate.

use chatline_types::error::HistoryError;
use chatline_types::transcript::HistoryTable;

/// Whole-table persistence for conversation history.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait HistoryBackend: Send + Sync {
    /// Short name for logs (e.g., "json", "sqlite").
    fn name(&self) -> &str;

    /// Load the persisted table.
    ///
    /// Absent state is not an error: return an empty table.
    fn load(&self) -> impl std::future::Future<Output = Result<HistoryTable, HistoryError>> + Send;

    /// Persist the entire table, replacing prior state.
    ///
    /// Must be all-or-nothing: after a failed save, `load` still returns the
    /// previous snapshot.
    fn save(
        &self,
        table: &HistoryTable,
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;

    /// Set aside unreadable state so the next save does not destroy it.
    ///
    /// Called by the store after `load` reports corruption. Default: no-op.
    fn quarantine(&self) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send {
        async { Ok(()) }
    }
}
