use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use poem_core::{GeneratorConfig, RolloverPolicy};
use serde::{Deserialize, Serialize};

pub const STUDIO_DIR: &str = ".poem-studio";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_HOST: &str = "0.0.0.0";
const CACHE_FILE: &str = "daily.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub model: String,
    pub inspire_lines: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            model: generator.model,
            inspire_lines: generator.inspire_lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    /// Daily cache file; the user data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
    pub rollover: RolloverRule,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: format!("http://localhost:{}", DEFAULT_PORT),
            cache_path: None,
            rollover: RolloverRule::default(),
        }
    }
}

/// Which zone offset rule places the daily boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RolloverRule {
    #[default]
    ObserverHeuristic,
    ZoneDatabase,
}

impl RolloverRule {
    pub fn policy(self) -> RolloverPolicy {
        match self {
            RolloverRule::ObserverHeuristic => RolloverPolicy::observer_heuristic(),
            RolloverRule::ZoneDatabase => RolloverPolicy::zone_database(),
        }
    }
}

impl StudioConfig {
    pub fn studio_dir(root: &Path) -> PathBuf {
        root.join(STUDIO_DIR)
    }

    pub fn config_path(root: &Path) -> PathBuf {
        Self::studio_dir(root).join(CONFIG_FILE)
    }

    /// Loads `.poem-studio/config.toml` under `root`, or defaults when absent.
    pub async fn load(root: &Path) -> Result<Self> {
        let path = Self::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub async fn save(&self, root: &Path) -> Result<PathBuf> {
        let studio_dir = Self::studio_dir(root);
        tokio::fs::create_dir_all(&studio_dir).await?;

        let path = studio_dir.join(CONFIG_FILE);
        tokio::fs::write(&path, toml::to_string_pretty(self)?).await?;
        Ok(path)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            model: self.server.model.clone(),
            inspire_lines: self.server.inspire_lines,
        }
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.client.cache_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir().context("Could not determine the user data directory")?;
        Ok(data_dir.join("poem-studio").join(CACHE_FILE))
    }
}
