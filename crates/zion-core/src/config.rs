use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ZionError};

/// Top-level configuration for Zion.
///
/// Loaded from `~/.zion/config.toml` by default. Each section corresponds
/// to one part of the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZionConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl ZionConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ZionConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check the values that would otherwise fail late at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.cache.slot_key.trim().is_empty() {
            return Err(ZionError::Config("cache.slot_key must not be empty".into()));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ZionError::Config("cache.ttl_secs must be positive".into()));
        }
        if self.chat.request_timeout_secs == 0 {
            return Err(ZionError::Config(
                "chat.request_timeout_secs must be positive".into(),
            ));
        }
        if self.chat.max_message_length == 0 {
            return Err(ZionError::Config(
                "chat.max_message_length must be positive".into(),
            ));
        }
        for (field, url) in [
            ("chat.primary_url", &self.chat.primary_url),
            ("chat.secondary_url", &self.chat.secondary_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ZionError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    field, url
                )));
            }
        }
        if self.voice.enabled && self.voice.command.is_empty() {
            return Err(ZionError::Config(
                "voice.command is required when voice.enabled is true".into(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the SQLite slot store.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.zion/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GeneralConfig {
    /// The data directory with a leading `~` expanded to the home directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }
}

/// Chat dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Primary webhook that receives every message first.
    pub primary_url: String,
    /// Backup REST endpoint used when the webhook fails.
    pub secondary_url: String,
    /// Identifier sent to the primary endpoint as `user_id`.
    pub user_id: String,
    /// Platform tag sent to the primary endpoint.
    pub platform: String,
    /// Per-attempt request timeout.
    pub request_timeout_secs: u64,
    /// Longer input is truncated before dispatch.
    pub max_message_length: usize,
    /// First assistant message of a session.
    pub welcome_message: String,
    /// Reply used when both endpoints fail.
    pub fallback_reply: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            primary_url: "http://localhost:5678/webhook/zion-chat".to_string(),
            secondary_url: "http://localhost:3001/api/chat".to_string(),
            user_id: "zion-user".to_string(),
            platform: "zion".to_string(),
            request_timeout_secs: 15,
            max_message_length: 2000,
            welcome_message: "Zion AI systems online. Neural networks synchronized. \
                How may I assist your digital consciousness today?"
                .to_string(),
            fallback_reply: "[offline] Neural pathways are unreachable right now. \
                Your message is logged locally; try again shortly."
                .to_string(),
        }
    }
}

/// Freshness cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Key of the persisted slot holding the data snapshot.
    pub slot_key: String,
    /// Snapshots at least this old are stale.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            slot_key: "zion_data".to_string(),
            ttl_secs: 300,
        }
    }
}

/// Voice input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Whether voice input is offered at all.
    pub enabled: bool,
    /// Speech-to-text command; its stdout is the transcript.
    pub command: Vec<String>,
    /// Recognition language, exported to the command as `ZION_VOICE_LANG`.
    pub language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: Vec::new(),
            language: "en-US".to_string(),
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ZionConfig::default();
        assert_eq!(config.general.data_dir, "~/.zion/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.cache.slot_key, "zion_data");
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.chat.request_timeout_secs, 15);
        assert!(!config.voice.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/custom/data"
log_level = "debug"

[chat]
primary_url = "https://hooks.example.com/zion"
secondary_url = "https://api.example.com/chat"
request_timeout_secs = 5

[cache]
ttl_secs = 60
"#;
        let file = create_temp_config(content);
        let config = ZionConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.chat.primary_url, "https://hooks.example.com/zion");
        assert_eq!(config.chat.request_timeout_secs, 5);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.slot_key, "zion_data");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = ZionConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.data_dir, "~/.zion/data");
        assert_eq!(config.chat.platform, "zion");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ZionConfig::load_or_default(Path::new("/nonexistent/zion.toml"));
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = create_temp_config("[cache]\nttl_secs = 0\n");
        let err = ZionConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("ttl_secs"));

        let file = create_temp_config("[chat]\nprimary_url = \"ftp://nope\"\n");
        let err = ZionConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("chat.primary_url"));
    }

    #[test]
    fn test_load_or_default_invalid_toml() {
        let file = create_temp_config("this is [not valid");
        let config = ZionConfig::load_or_default(file.path());
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_validate_voice_requires_command() {
        let mut config = ZionConfig::default();
        config.voice.enabled = true;
        assert!(config.validate().is_err());
        config.voice.command = vec!["stt".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ZionConfig::default();
        config.chat.user_id = "neo".to_string();
        config.save(&path).unwrap();

        let reloaded = ZionConfig::load(&path).unwrap();
        assert_eq!(reloaded.chat.user_id, "neo");
        assert_eq!(reloaded.cache.slot_key, config.cache.slot_key);
    }

    #[test]
    fn test_expand_home_passthrough() {
        assert_eq!(expand_home("/var/lib/zion"), PathBuf::from("/var/lib/zion"));
        assert!(expand_home("~/data").ends_with("data"));
    }
}
