use std::path::{Path, PathBuf};

use anyhow::Context;
use keyscribe_core::TranscribeConfig;

/// Contents of `config.toml`
#[derive(Debug, serde::Serialize, serde::Deserialize, Default)]
pub(crate) struct CliConfig {
    #[serde(default)]
    pub transcribe: TranscribeConfig,
}

pub(crate) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keyscribe")
        .join("config.toml")
}

/// Load an explicitly named config file. Missing or invalid files are errors.
pub(crate) fn load_config_from(path: &Path) -> anyhow::Result<CliConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

/// Load the user config, falling back to defaults when it is absent or unreadable.
pub(crate) fn load_config() -> CliConfig {
    let path = config_path();
    let Ok(text) = std::fs::read_to_string(&path) else {
        return CliConfig::default();
    };
    match toml::from_str(&text) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
            CliConfig::default()
        }
    }
}

pub(crate) fn save_config(config: &CliConfig) -> anyhow::Result<PathBuf> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = toml::to_string_pretty(config)?;
    std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
