use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::links::DEFAULT_LINK_COLUMN;

/// Root configuration, loaded from `~/.config/pmcharvest/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub harvest: HarvestConfig,
    pub entrez: EntrezConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub link_column: String,
    pub tidy: bool,
}

/// NCBI E-utilities settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrezConfig {
    pub base_url: String,
    pub tool: String,
    /// Contact address NCBI asks clients to send; omitted when empty.
    pub email: String,
    pub api_key: String,
    /// Minimum spacing between consecutive requests.
    pub request_interval_ms: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/raw/articles.csv"),
            output: PathBuf::from("data/parsed/articles.json"),
            link_column: DEFAULT_LINK_COLUMN.to_string(),
            tidy: false,
        }
    }
}

impl Default for EntrezConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            tool: "pmcharvest".to_string(),
            email: String::new(),
            api_key: String::new(),
            request_interval_ms: 1000,
            max_attempts: 3,
            retry_delay_ms: 2000,
            timeout_secs: 30,
        }
    }
}

impl EntrezConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/pmcharvest/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PMCHARVEST_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pmcharvest")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't
    /// exist. `NCBI_EMAIL` and `NCBI_API_KEY` override the file.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(email) = std::env::var("NCBI_EMAIL") {
            self.entrez.email = email;
        }
        if let Ok(key) = std::env::var("NCBI_API_KEY") {
            self.entrez.api_key = key;
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
