use thiserror::Error;

/// Errors from history persistence.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The snapshot exists but could not be read.
    #[error("failed to read history: {0}")]
    Read(String),

    /// The snapshot was read but is not a valid history table.
    #[error("corrupt history snapshot: {0}")]
    Corrupt(String),

    /// The snapshot could not be written. Prior state is left intact.
    #[error("failed to write history: {0}")]
    Write(String),
}

/// Errors from prompt extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    /// The backend output does not start with the prompt it was given.
    #[error("backend output does not echo the prompt")]
    EchoMismatch,
}

/// Errors surfaced by the conversation engine.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// The reply was produced but history could not be saved.
    #[error("reply produced but history was not persisted: {source}")]
    NotPersisted {
        reply: String,
        #[source]
        source: HistoryError,
    },

    /// A history write failed and there is no reply to deliver.
    #[error("history error: {0}")]
    History(#[from] HistoryError),
}

impl ConversationError {
    /// The reply text that can still be delivered, if any.
    pub fn reply(&self) -> Option<&str> {
        match self {
            ConversationError::NotPersisted { reply, .. } => Some(reply),
            ConversationError::History(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_error_display() {
        let err = HistoryError::Write("permission denied".to_string());
        assert_eq!(err.to_string(), "failed to write history: permission denied");
    }

    #[test]
    fn test_not_persisted_keeps_reply() {
        let err = ConversationError::NotPersisted {
            reply: "buenas".to_string(),
            source: HistoryError::Write("disk full".to_string()),
        };
        assert_eq!(err.reply(), Some("buenas"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_history_variant_has_no_reply() {
        let err = ConversationError::from(HistoryError::Write("ro fs".to_string()));
        assert!(err.reply().is_none());
    }
}
