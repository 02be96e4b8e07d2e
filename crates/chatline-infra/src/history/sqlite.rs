//! SQLite history backend.
//!
//! Stores one row per turn in `transcript_turns`. A save replaces every row in
//! a single transaction, keeping the whole-table snapshot semantics of the
//! JSON backend.

use std::str::FromStr;

use chatline_core::history::backend::HistoryBackend;
use chatline_types::error::HistoryError;
use chatline_types::transcript::{HistoryTable, MessageRole, Transcript, Turn};
use sqlx::Row;

use crate::sqlite::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryBackend`.
pub struct SqliteHistoryBackend {
    pool: DatabasePool,
}

impl SqliteHistoryBackend {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl HistoryBackend for SqliteHistoryBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self) -> Result<HistoryTable, HistoryError> {
        let rows = sqlx::query(
            "SELECT user_id, role, content FROM transcript_turns ORDER BY user_id, position",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| HistoryError::Read(e.to_string()))?;

        let mut grouped: Vec<(String, Vec<Turn>)> = Vec::new();
        for row in &rows {
            let user_id: String = row
                .try_get("user_id")
                .map_err(|e| HistoryError::Corrupt(e.to_string()))?;
            let role: String = row
                .try_get("role")
                .map_err(|e| HistoryError::Corrupt(e.to_string()))?;
            let content: String = row
                .try_get("content")
                .map_err(|e| HistoryError::Corrupt(e.to_string()))?;
            let role = MessageRole::from_str(&role).map_err(HistoryError::Corrupt)?;

            match grouped.last_mut() {
                Some((current, turns)) if *current == user_id => turns.push(Turn::new(role, content)),
                _ => grouped.push((user_id, vec![Turn::new(role, content)])),
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(user_id, turns)| (user_id, Transcript::new(turns)))
            .collect())
    }

    async fn save(&self, table: &HistoryTable) -> Result<(), HistoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| HistoryError::Write(e.to_string()))?;

        sqlx::query("DELETE FROM transcript_turns")
            .execute(&mut *tx)
            .await
            .map_err(|e| HistoryError::Write(e.to_string()))?;

        for (user_id, transcript) in table.iter() {
            for (position, turn) in transcript.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO transcript_turns (user_id, position, role, content) VALUES (?, ?, ?, ?)",
                )
                .bind(user_id)
                .bind(position as i64)
                .bind(turn.role.to_string())
                .bind(&turn.content)
                .execute(&mut *tx)
                .await
                .map_err(|e| HistoryError::Write(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| HistoryError::Write(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_backend() -> SqliteHistoryBackend {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        std::mem::forget(dir);
        SqliteHistoryBackend::new(DatabasePool::open(&db_path).await.unwrap())
    }

    #[tokio::test]
    async fn test_empty_database_loads_empty() {
        let backend = test_backend().await;
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_preserves_order() {
        let backend = test_backend().await;
        let mut table = HistoryTable::new();
        table.insert(
            "42",
            Transcript::new(vec![
                Turn::system("persona"),
                Turn::user("hola"),
                Turn::assistant("buenas"),
            ]),
        );
        table.insert("7", Transcript::new(vec![Turn::system("persona")]));

        backend.save(&table).await.unwrap();
        assert_eq!(backend.load().await.unwrap(), table);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_rows() {
        let backend = test_backend().await;
        let mut first = HistoryTable::new();
        first.insert("a", Transcript::new(vec![Turn::system("p"), Turn::user("x")]));
        backend.save(&first).await.unwrap();

        let mut second = HistoryTable::new();
        second.insert("b", Transcript::new(vec![Turn::system("p")]));
        backend.save(&second).await.unwrap();

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded, second);
        assert!(!loaded.contains("a"));
    }

    #[tokio::test]
    async fn test_more_than_ten_turns_stay_ordered() {
        let backend = test_backend().await;
        let mut turns = vec![Turn::system("p")];
        for i in 0..12 {
            turns.push(Turn::user(format!("m{i}")));
        }
        let mut table = HistoryTable::new();
        table.insert("1", Transcript::new(turns));

        backend.save(&table).await.unwrap();
        assert_eq!(backend.load().await.unwrap(), table);
    }
}
