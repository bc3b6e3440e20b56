use std::{fs, path::Path};

use serde::Deserialize;

use crate::attacks::selector::SelectionMode;
use crate::core::error::TrainerError;
use crate::core::store::Store;
use crate::sources::bundled::DEFAULT_URLS;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: String,
    /// JSON file acting as the remote progress store; none disables sync.
    pub remote_store_path: Option<String>,
    pub remote_slot: u32,
    pub remote_timeout_ms: u64,
    /// HTTP phish-list feed; the bundled list is used when it runs dry.
    pub phish_list_url: Option<String>,
    pub http_timeout_ms: u64,
    pub user_agent: String,
    pub refetch_interval_ms: u64,
    pub selection: SelectionMode,
    /// Chance, in percent, that a round shows an attacked URL.
    pub phish_percent: u8,
    pub points_per_level: u32,
    pub max_resamples: usize,
    pub bundled_urls: Vec<String>,
    /// One URL per line; replaces `bundled_urls` when set.
    pub url_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: Store::default_path().display().to_string(),
            remote_store_path: None,
            remote_slot: 0,
            remote_timeout_ms: 5_000,
            phish_list_url: None,
            http_timeout_ms: 5_000,
            user_agent: "phish-trainer/1.0".to_string(),
            refetch_interval_ms: 60_000,
            selection: SelectionMode::Level,
            phish_percent: 50,
            points_per_level: 10,
            max_resamples: 8,
            bundled_urls: DEFAULT_URLS.iter().map(|u| u.to_string()).collect(),
            url_file: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.phish_percent > 100 {
            return Err(TrainerError::Config(format!(
                "phish_percent must be 0..=100, got {}",
                self.phish_percent
            )));
        }
        if self.points_per_level == 0 {
            return Err(TrainerError::Config("points_per_level must be positive".into()));
        }
        if self.max_resamples == 0 {
            return Err(TrainerError::Config("max_resamples must be positive".into()));
        }
        if self.bundled_urls.is_empty() && self.url_file.is_none() && self.phish_list_url.is_none()
        {
            return Err(TrainerError::Config(
                "no url source: set bundled_urls, url_file or phish_list_url".into(),
            ));
        }
        Ok(())
    }
}

pub fn load_config(path: Option<&str>) -> Result<AppConfig, TrainerError> {
    let default_path = Path::new("config/phish-trainer.toml");
    let path = path.map(Path::new).unwrap_or(default_path);

    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| TrainerError::Config(e.to_string()))?;
    let cfg: AppConfig =
        toml::from_str(&content).map_err(|e| TrainerError::Config(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}
