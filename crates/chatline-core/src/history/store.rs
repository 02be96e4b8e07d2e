//! History store: read-modify-write cycles over a `HistoryBackend`.
//!
//! Every mutation loads the full table, changes one user's transcript, applies
//! the retention window, and saves the full table back. A cycle whose load
//! fails is aborted before anything is saved. Cycles are serialized
//! by an internal mutex so two concurrent cycles never load the same stale
//! snapshot. The mutex covers one cycle only; callers that need a user's
//! history held across several cycles use `UserLocks`.

use chatline_types::error::HistoryError;
use chatline_types::transcript::{HistoryTable, MessageRole, Transcript, Turn};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::backend::HistoryBackend;
use super::policy;

/// Bounded per-user transcripts persisted through a backend.
pub struct HistoryStore<B: HistoryBackend> {
    backend: B,
    cycle: Mutex<()>,
    window_size: usize,
    persona: String,
}

impl<B: HistoryBackend> HistoryStore<B> {
    /// Create a store that keeps `window_size` turns after the system turn
    /// carrying `persona`.
    pub fn new(backend: B, window_size: usize, persona: impl Into<String>) -> Self {
        Self {
            backend,
            cycle: Mutex::new(()),
            window_size,
            persona: persona.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Load the persisted table for reading.
    ///
    /// Missing state yields an empty table. Unreadable or corrupt state is
    /// logged and also yields an empty table; corrupt snapshots are first
    /// handed to the backend's quarantine so they survive the next save.
    pub async fn load(&self) -> HistoryTable {
        match self.load_for_update().await {
            Ok(table) => table,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "History unavailable, starting empty");
                HistoryTable::new()
            }
        }
    }

    /// Load the table a write cycle will save back.
    ///
    /// Only a quarantined corrupt snapshot becomes an empty table. Read
    /// errors and failed quarantines are returned so the caller never saves
    /// a partial table over state it could not see.
    async fn load_for_update(&self) -> Result<HistoryTable, HistoryError> {
        match self.backend.load().await {
            Ok(table) => Ok(table),
            Err(HistoryError::Corrupt(reason)) => {
                warn!(backend = self.backend.name(), %reason, "Corrupt history snapshot, starting empty");
                self.backend.quarantine().await?;
                Ok(HistoryTable::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Persist the entire table, replacing prior state.
    pub async fn save(&self, table: &HistoryTable) -> Result<(), HistoryError> {
        self.backend.save(table).await
    }

    /// The user's transcript, or a fresh system-only transcript if the user
    /// has no history. The fresh transcript is not persisted.
    pub async fn get_transcript(&self, user_id: &str) -> Transcript {
        self.load()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| policy::fresh(&self.persona))
    }

    /// Append a turn to the user's transcript and persist.
    ///
    /// Creates the system turn for unseen users and applies the retention
    /// window. Returns the transcript as saved.
    pub async fn append_turn(
        &self,
        user_id: &str,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<Transcript, HistoryError> {
        let _cycle = self.cycle.lock().await;

        let mut table = self.load_for_update().await?;
        let current = table.get(user_id).cloned().unwrap_or_default();
        let updated = policy::append(
            current,
            Turn::new(role, content),
            self.window_size,
            &self.persona,
        );
        table.insert(user_id, updated.clone());
        self.save(&table).await?;

        debug!(user_id, role = %role, turns = updated.len(), "Appended turn");
        Ok(updated)
    }

    /// Replace the user's transcript with a fresh system-only transcript and
    /// persist.
    pub async fn reset_transcript(&self, user_id: &str) -> Result<Transcript, HistoryError> {
        let _cycle = self.cycle.lock().await;

        let mut table = self.load_for_update().await?;
        let fresh = policy::fresh(&self.persona);
        table.insert(user_id, fresh.clone());
        self.save(&table).await?;

        debug!(user_id, "Reset transcript");
        Ok(fresh)
    }

    /// All user ids with stored history.
    pub async fn user_ids(&self) -> Vec<String> {
        self.load().await.user_ids().map(str::to_string).collect()
    }

    /// What `append_turn` would produce without persisting.
    ///
    /// Used to keep a conversation going when the backend rejects writes.
    pub fn preview_append(&self, current: Transcript, turn: Turn) -> Transcript {
        policy::append(current, turn, self.window_size, &self.persona)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::history::memory::InMemoryHistoryBackend;

    const PERSONA: &str = "Eres un asistente útil y amable.";

    fn store(window: usize) -> HistoryStore<InMemoryHistoryBackend> {
        HistoryStore::new(InMemoryHistoryBackend::new(), window, PERSONA)
    }

    /// Backend whose load always reports corruption.
    struct CorruptBackend {
        quarantined: std::sync::atomic::AtomicBool,
        quarantine_fails: bool,
    }

    impl CorruptBackend {
        fn new(quarantine_fails: bool) -> Self {
            Self {
                quarantined: std::sync::atomic::AtomicBool::new(false),
                quarantine_fails,
            }
        }
    }

    impl HistoryBackend for CorruptBackend {
        fn name(&self) -> &str {
            "corrupt"
        }

        async fn load(&self) -> Result<HistoryTable, HistoryError> {
            Err(HistoryError::Corrupt("expected value at line 1".to_string()))
        }

        async fn save(&self, _table: &HistoryTable) -> Result<(), HistoryError> {
            Ok(())
        }

        async fn quarantine(&self) -> Result<(), HistoryError> {
            if self.quarantine_fails {
                return Err(HistoryError::Write("permission denied".to_string()));
            }
            self.quarantined
                .store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_load_empty_backend() {
        let s = store(5);
        assert!(s.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_transcript_unknown_user_not_persisted() {
        let s = store(5);
        let t = s.get_transcript("42").await;
        assert_eq!(t.turns(), &[Turn::system(PERSONA)]);
        assert_eq!(s.backend().save_count(), 0);
        assert!(s.backend().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_append_first_turn_creates_system_turn() {
        let s = store(5);
        let t = s.append_turn("42", MessageRole::User, "hola").await.unwrap();
        assert_eq!(t.turns(), &[Turn::system(PERSONA), Turn::user("hola")]);
        assert_eq!(s.backend().snapshot().get("42"), Some(&t));
    }

    #[tokio::test]
    async fn test_nine_turns_window_five_drops_oldest_four() {
        let s = store(5);
        for i in 0..9 {
            let role = if i % 2 == 0 { MessageRole::User } else { MessageRole::Assistant };
            let t = s.append_turn("7", role, format!("t{i}")).await.unwrap();
            assert!(t.len() <= 6);
            assert_eq!(t.turns()[0], Turn::system(PERSONA));
        }
        let t = s.get_transcript("7").await;
        let contents: Vec<&str> = t.iter().skip(1).map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["t4", "t5", "t6", "t7", "t8"]);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let s = store(5);
        s.append_turn("1", MessageRole::User, "hi").await.unwrap();
        s.append_turn("1", MessageRole::Assistant, "hello").await.unwrap();

        let first = s.reset_transcript("1").await.unwrap();
        let second = s.reset_transcript("1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.turns(), &[Turn::system(PERSONA)]);
        assert_eq!(s.get_transcript("1").await, first);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let s = store(5);
        s.append_turn("a", MessageRole::User, "from a").await.unwrap();
        s.append_turn("b", MessageRole::User, "from b").await.unwrap();
        s.reset_transcript("b").await.unwrap();

        let a = s.get_transcript("a").await;
        assert_eq!(a.turns(), &[Turn::system(PERSONA), Turn::user("from a")]);
        let b = s.get_transcript("b").await;
        assert_eq!(b.turns(), &[Turn::system(PERSONA)]);
    }

    #[tokio::test]
    async fn test_write_failure_propagates_and_keeps_prior_state() {
        let s = store(5);
        s.append_turn("1", MessageRole::User, "kept").await.unwrap();
        s.backend().set_fail_writes(true);

        let err = s.append_turn("1", MessageRole::User, "lost").await.unwrap_err();
        assert!(matches!(err, HistoryError::Write(_)));
        assert!(s.reset_transcript("1").await.is_err());

        let t = s.get_transcript("1").await;
        assert_eq!(t.last(), Some(&Turn::user("kept")));
    }

    #[tokio::test]
    async fn test_concurrent_appends_lose_nothing() {
        let s = Arc::new(store(1_000));
        let mut handles = Vec::new();
        for user in ["x", "y"] {
            for i in 0..25 {
                let s = Arc::clone(&s);
                handles.push(tokio::spawn(async move {
                    s.append_turn(user, MessageRole::User, format!("{user}{i}"))
                        .await
                        .unwrap();
                }));
            }
        }
        for h in handles {
            h.await.unwrap();
        }

        let table = s.load().await;
        assert_eq!(table.get("x").unwrap().len(), 26);
        assert_eq!(table.get("y").unwrap().len(), 26);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_quarantined() {
        let s = HistoryStore::new(CorruptBackend::new(false), 5, PERSONA);
        assert!(s.load().await.is_empty());
        assert!(s
            .backend()
            .quarantined
            .load(std::sync::atomic::Ordering::SeqCst));

        let t = s.append_turn("1", MessageRole::User, "hola").await.unwrap();
        assert_eq!(t.turns(), &[Turn::system(PERSONA), Turn::user("hola")]);
    }

    #[tokio::test]
    async fn test_failed_quarantine_aborts_write_cycle() {
        let s = HistoryStore::new(CorruptBackend::new(true), 5, PERSONA);
        assert!(s.load().await.is_empty());

        let err = s.append_turn("1", MessageRole::User, "hola").await.unwrap_err();
        assert!(matches!(err, HistoryError::Write(_)));
        assert!(s.reset_transcript("1").await.is_err());
    }

    #[tokio::test]
    async fn test_transient_read_error_keeps_other_users() {
        let s = store(5);
        s.append_turn("alice", MessageRole::User, "hola").await.unwrap();
        s.append_turn("bob", MessageRole::User, "buenas").await.unwrap();
        let saves = s.backend().save_count();

        s.backend().fail_next_read();
        let err = s.append_turn("carol", MessageRole::User, "qué tal").await.unwrap_err();
        assert!(matches!(err, HistoryError::Read(_)));
        assert_eq!(s.backend().save_count(), saves);

        let table = s.backend().snapshot();
        assert_eq!(table.user_ids().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert_eq!(
            table.get("alice").unwrap().turns(),
            &[Turn::system(PERSONA), Turn::user("hola")]
        );

        s.backend().fail_next_read();
        assert!(matches!(
            s.reset_transcript("bob").await,
            Err(HistoryError::Read(_))
        ));
        assert_eq!(
            s.get_transcript("bob").await.last(),
            Some(&Turn::user("buenas"))
        );

        // The read error was one-shot; the next cycle goes through.
        s.append_turn("carol", MessageRole::User, "qué tal").await.unwrap();
        assert_eq!(s.user_ids().await, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_read_error_on_read_path_yields_fresh_transcript() {
        let s = store(5);
        s.append_turn("alice", MessageRole::User, "hola").await.unwrap();
        s.backend().fail_next_read();
        assert_eq!(s.get_transcript("alice").await.turns(), &[Turn::system(PERSONA)]);
        assert_eq!(s.get_transcript("alice").await.len(), 2);
    }

    #[tokio::test]
    async fn test_save_replaces_whole_table() {
        let s = store(5);
        s.append_turn("a", MessageRole::User, "x").await.unwrap();

        let mut table = HistoryTable::new();
        table.insert("b", policy::fresh(PERSONA));
        s.save(&table).await.unwrap();
        assert_eq!(s.load().await, table);
    }

    #[tokio::test]
    async fn test_user_ids() {
        let s = store(5);
        s.append_turn("b", MessageRole::User, "x").await.unwrap();
        s.append_turn("a", MessageRole::User, "y").await.unwrap();
        assert_eq!(s.user_ids().await, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_preview_append_applies_window() {
        let s = store(1);
        let t = s.preview_append(policy::fresh(PERSONA), Turn::user("one"));
        let t = s.preview_append(t, Turn::assistant("two"));
        assert_eq!(t.turns(), &[Turn::system(PERSONA), Turn::assistant("two")]);
    }
}
