//! Turn, transcript, and history table types for Chatline.
//!
//! A `Transcript` is the linear conversation kept for one user. A
//! `HistoryTable` maps user ids to transcripts and is the unit the history
//! backends persist. Both serialize to the on-disk snapshot layout:
//!
//! ```json
//! { "<user_id>": [ {"role": "system", "content": "..."}, ... ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use crate::llm::MessageRole;

/// A single conversation turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    pub content: String,
}

impl Turn {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Ordered turns belonging to one user.
///
/// Index 0 is the system persona turn once the user has interacted.
/// Windowing is applied by the transcript policy in `chatline-core`, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Turn>);

impl Transcript {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self(turns)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }

    /// The leading system turn, if the transcript has one.
    pub fn system_turn(&self) -> Option<&Turn> {
        self.0.first().filter(|t| t.role == MessageRole::System)
    }

    /// Turns after the leading system turn.
    pub fn conversation(&self) -> &[Turn] {
        match self.system_turn() {
            Some(_) => &self.0[1..],
            None => &self.0,
        }
    }

    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }

    pub fn push(&mut self, turn: Turn) {
        self.0.push(turn);
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Mapping from user id to transcript.
///
/// Ordered so that persisted snapshots are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryTable(BTreeMap<String, Transcript>);

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&Transcript> {
        self.0.get(user_id)
    }

    /// Replace a user's transcript, returning the previous one.
    pub fn insert(&mut self, user_id: impl Into<String>, transcript: Transcript) -> Option<Transcript> {
        self.0.insert(user_id.into(), transcript)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.0.contains_key(user_id)
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Transcript)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Transcript)> for HistoryTable {
    fn from_iter<I: IntoIterator<Item = (String, Transcript)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_serializes_with_lowercase_role() {
        let turn = Turn::user("hola");
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hola"}"#);
    }

    #[test]
    fn test_history_table_snapshot_layout() {
        let mut table = HistoryTable::new();
        table.insert(
            "42",
            Transcript::new(vec![Turn::system("persona"), Turn::user("hola")]),
        );
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"{"42":[{"role":"system","content":"persona"},{"role":"user","content":"hola"}]}"#
        );

        let parsed: HistoryTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_history_table_rejects_unknown_role() {
        let json = r#"{"1":[{"role":"narrator","content":"x"}]}"#;
        assert!(serde_json::from_str::<HistoryTable>(json).is_err());
    }

    #[test]
    fn test_conversation_skips_system_turn() {
        let transcript = Transcript::new(vec![
            Turn::system("persona"),
            Turn::user("hi"),
            Turn::assistant("hello"),
        ]);
        assert_eq!(transcript.conversation().len(), 2);
        assert_eq!(transcript.conversation()[0], Turn::user("hi"));
        assert_eq!(transcript.system_turn().unwrap().content, "persona");
    }

    #[test]
    fn test_conversation_without_system_turn() {
        let transcript = Transcript::new(vec![Turn::user("hi")]);
        assert!(transcript.system_turn().is_none());
        assert_eq!(transcript.conversation().len(), 1);
    }
}
