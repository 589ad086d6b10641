use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use lingo_core::Config;

/// Client configuration: the core sections plus a `[client]` table.
///
/// ```toml
/// [session]
/// timer_budget_secs = 90
///
/// [client]
/// offline = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(flatten)]
    pub core: Config,

    #[serde(default)]
    pub client: ClientSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSection {
    /// Store directory. `None` means `~/.lingo`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Serve only downloaded lessons.
    #[serde(default)]
    pub offline: bool,

    /// Serve the static fallback lesson when generation fails.
    #[serde(default)]
    pub allow_fallback: bool,

    #[serde(default = "default_speech_timeout_ms")]
    pub speech_timeout_ms: u64,

    /// Countdown period. One second outside of demos and tests.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_speech_timeout_ms() -> u64 {
    10_000
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            data_dir: None,
            offline: false,
            allow_fallback: false,
            speech_timeout_ms: default_speech_timeout_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl ClientSection {
    pub fn speech_timeout(&self) -> Duration {
        Duration::from_millis(self.speech_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl ClientConfig {
    /// Load from a TOML file, or defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: ClientConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        config
            .core
            .validate()
            .with_context(|| format!("invalid config at {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }
}
