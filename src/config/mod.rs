//! Application configuration

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONFIG_FILE: &str = "unicore-cms.json";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config schema version
    pub version: u32,

    /// Data directory path
    pub data_dir: PathBuf,

    /// Working copy of the content repository
    pub repo_path: PathBuf,

    /// Remote to clone from / push to, if any
    pub repo_url: Option<String>,

    /// Name of the push remote
    pub remote_name: String,

    /// Prefix for search index directories
    pub index_prefix: String,

    /// Where the search index lives
    pub index_dir: PathBuf,

    /// Base URL of the asset host used for image fields
    pub asset_host: Option<String>,

    /// SSH credentials for the push remote
    pub ssh_pubkey_path: Option<PathBuf>,
    pub ssh_privkey_path: Option<PathBuf>,
    pub ssh_passphrase: Option<String>,

    /// Recreate documents that went missing out-of-band on the next save.
    /// When false a missing document is a hard error instead.
    pub recreate_missing_documents: bool,

    /// Logging level
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from a specific data directory
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            info!("Loading config from {:?}", config_path);
            let json = fs::read_to_string(&config_path)?;
            let config: AppConfig = serde_json::from_str(&json)?;
            Ok(config)
        } else {
            warn!("No config found, creating default at {:?}", config_path);
            let config = Self::default_with_dir(data_dir.to_path_buf());
            config.save()?;
            Ok(config)
        }
    }

    /// Create default configuration with a specific data directory
    pub fn default_with_dir(data_dir: PathBuf) -> Self {
        Self {
            version: 1,
            repo_path: data_dir.join("repo"),
            index_dir: data_dir.join("index"),
            data_dir,
            repo_url: None,
            remote_name: "origin".to_string(),
            index_prefix: "unicore".to_string(),
            asset_host: None,
            ssh_pubkey_path: None,
            ssh_privkey_path: None,
            ssh_passphrase: None,
            recreate_missing_documents: true,
            log_level: "info".to_string(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let config_path = self.data_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, json)?;
        Ok(())
    }
}

/// Default data directory for the CMS
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("unicore-cms"))
        .ok_or_else(|| anyhow!("Could not determine data directory"))
}
