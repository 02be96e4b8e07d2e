//! Configuration loader for Chatline.
//!
//! Reads `config.toml` from the data directory (`~/.chatline/` in production)
//! and deserializes it into [`ChatlineConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use chatline_types::config::ChatlineConfig;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ChatlineConfig::default()`].
/// - Unreadable or unparsable file: a warning, then the default.
pub async fn load_config(data_dir: &Path) -> ChatlineConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ChatlineConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ChatlineConfig::default();
        }
    };

    match toml::from_str::<ChatlineConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ChatlineConfig::default()
        }
    }
}

/// Resolve where the history lives.
///
/// Relative `history_file` values are joined onto the data directory.
pub fn resolve_history_path(data_dir: &Path, config: &ChatlineConfig) -> PathBuf {
    let name = Path::new(config.history_file_name());
    if name.is_absolute() {
        name.to_path_buf()
    } else {
        data_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatline_types::config::HistoryBackendKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.history_backend, HistoryBackendKind::Json);
        assert_eq!(config.conversation.window_size, 5);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
history_backend = "sqlite"

[conversation]
window_size = 8
temperature = 0.2

[generation]
model = "local-model"
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.history_backend, HistoryBackendKind::Sqlite);
        assert_eq!(config.conversation.window_size, 8);
        assert_eq!(config.conversation.temperature, 0.2);
        assert_eq!(config.conversation.max_response_tokens, 100);
        assert_eq!(config.generation.model, "local-model");
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.conversation.window_size, 5);
    }

    #[test]
    fn history_path_relative_and_absolute() {
        let data_dir = PathBuf::from("/srv/chatline");
        let mut config = ChatlineConfig::default();
        assert_eq!(
            resolve_history_path(&data_dir, &config),
            PathBuf::from("/srv/chatline/historial.json")
        );

        config.history_backend = HistoryBackendKind::Sqlite;
        assert_eq!(
            resolve_history_path(&data_dir, &config),
            PathBuf::from("/srv/chatline/historial.db")
        );

        config.history_file = Some("/var/lib/chat/h.json".to_string());
        assert_eq!(
            resolve_history_path(&data_dir, &config),
            PathBuf::from("/var/lib/chat/h.json")
        );
    }
}
