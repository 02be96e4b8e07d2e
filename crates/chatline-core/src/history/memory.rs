//! In-memory history backend.
//!
//! Keeps the snapshot in process memory. Used by tests and by `chatline say
//! --ephemeral`. `fail_writes` simulates a read-only disk and `fail_next_read`
//! a transiently locked one.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chatline_types::error::HistoryError;
use chatline_types::transcript::HistoryTable;

use super::backend::HistoryBackend;

#[derive(Default)]
pub struct InMemoryHistoryBackend {
    table: Mutex<HistoryTable>,
    fail_writes: AtomicBool,
    fail_next_read: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryHistoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_table(table: HistoryTable) -> Self {
        Self {
            table: Mutex::new(table),
            ..Self::default()
        }
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the next `load` fail once with a read error.
    pub fn fail_next_read(&self) {
        self.fail_next_read.store(true, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> HistoryTable {
        self.table.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl HistoryBackend for InMemoryHistoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<HistoryTable, HistoryError> {
        if self.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(HistoryError::Read("database is locked".to_string()));
        }
        self.table
            .lock()
            .map(|t| t.clone())
            .map_err(|e| HistoryError::Read(e.to_string()))
    }

    async fn save(&self, table: &HistoryTable) -> Result<(), HistoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(HistoryError::Write("writes disabled".to_string()));
        }
        let mut guard = self
            .table
            .lock()
            .map_err(|e| HistoryError::Write(e.to_string()))?;
        *guard = table.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
