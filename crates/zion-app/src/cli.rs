//! CLI argument definitions for the Zion application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use zion_core::config::ZionConfig;
use zion_core::PortalId;
use zion_core::Result;

/// Zion: a chat assistant over your personal subscriptions and tasks.
#[derive(Parser, Debug)]
#[command(name = "zion", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Data directory holding the SQLite database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Primary chat webhook URL.
    #[arg(long = "primary-url")]
    pub primary_url: Option<String>,

    /// Secondary chat endpoint URL.
    #[arg(long = "secondary-url")]
    pub secondary_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat session (the default).
    Chat,
    /// Send one message and print the reply.
    Send {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show the cached data without contacting the feed.
    Status,
    /// Fetch fresh data and update the cache.
    Refresh,
    /// Enter a portal and optionally run one of its actions.
    Portal {
        id: PortalId,
        action: Vec<String>,
    },
}

impl CliArgs {
    /// The subcommand to run.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ZION_CONFIG env var > platform default (~/.zion/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ZION_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory path.
    ///
    /// Priority: --data-dir flag > ZION_DATA_DIR env var.
    /// Returns `None` if neither is set (use config value).
    pub fn resolve_data_dir(&self) -> Option<String> {
        if let Some(ref p) = self.data_dir {
            return Some(p.to_string_lossy().to_string());
        }
        std::env::var("ZION_DATA_DIR").ok().filter(|p| !p.is_empty())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Load the configuration file and apply overrides.
    ///
    /// A missing file is created with defaults. An unreadable or invalid file
    /// is logged and replaced by defaults; only the overridden values can
    /// still fail validation.
    pub fn load_config(&self) -> Result<ZionConfig> {
        let path = self.resolve_config_path();
        if !path.exists() {
            match ZionConfig::default().save(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "Wrote default configuration"),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Could not write default configuration"
                ),
            }
        }
        let mut config = ZionConfig::load_or_default(&path);
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Write command-line overrides into `config`.
    pub fn apply_overrides(&self, config: &mut ZionConfig) {
        if let Some(dir) = self.resolve_data_dir() {
            config.general.data_dir = dir;
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(ref url) = self.primary_url {
            config.chat.primary_url = url.clone();
        }
        if let Some(ref url) = self.secondary_url {
            config.chat.secondary_url = url.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".zion").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".zion").join("config.toml");
    }
    PathBuf::from("config.toml")
}

// =============================================================================
// Tests
// =============================================================================
