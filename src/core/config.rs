use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use directories::ProjectDirs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data: DataSettings,
    pub models: ModelSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSettings {
    /// Source files loaded in order; later duplicates of the key column lose.
    pub sources: Vec<PathBuf>,
    /// Column used for deduplication and exact name matching.
    pub key_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Directory holding the persisted regressors and scaler.
    pub dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data: DataSettings {
                sources: vec![
                    PathBuf::from("data/All_Players.csv"),
                    PathBuf::from("data/Season.csv"),
                ],
                key_column: "Player".to_string(),
            },
            models: ModelSettings {
                dir: PathBuf::from("models"),
            },
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the per-user config file when present, defaults otherwise.
    pub fn load_or_default() -> Self {
        if let Some(dirs) = ProjectDirs::from("com", "player-scout", "scout") {
            let path = dirs.config_dir().join("scout.toml");
            if path.exists() {
                if let Ok(settings) = Self::load(&path.to_string_lossy()) {
                    return settings;
                }
                log::warn!("Failed to parse {}, using defaults", path.display());
            }
        }
        Self::default()
    }
}
