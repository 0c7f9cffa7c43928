use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{DEFAULT_OPENF1_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::circuits::DEFAULT_CIRCUITS_URL;
use crate::errors::PaddockError;
use crate::session::provider::DEFAULT_QUICK_LAP_THRESHOLD;
use crate::session::repository::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_LOAD_TIMEOUT};

const APP_DIR_NAME: &str = "paddock";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub openf1_base_url: String,
    pub circuits_geojson_url: String,
    pub archive_dir: PathBuf,
    pub request_timeout_s: u64,
    pub session_load_timeout_s: u64,
    pub cache_ttl_s: u64,
    pub cache_capacity: usize,
    pub quick_lap_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openf1_base_url: DEFAULT_OPENF1_URL.to_string(),
            circuits_geojson_url: DEFAULT_CIRCUITS_URL.to_string(),
            archive_dir: Self::default_archive_dir(),
            request_timeout_s: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            session_load_timeout_s: DEFAULT_LOAD_TIMEOUT.as_secs(),
            cache_ttl_s: DEFAULT_CACHE_TTL.as_secs(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            quick_lap_threshold: DEFAULT_QUICK_LAP_THRESHOLD,
        }
    }
}

impl AppConfig {
    /// Archive under the application data directory, or `./archive` when the
    /// platform has none
    pub fn default_archive_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join("archive"))
            .unwrap_or_else(|| PathBuf::from("archive"))
    }

    pub fn config_path() -> Result<PathBuf, PaddockError> {
        Ok(dirs::config_dir()
            .ok_or(PaddockError::NoConfigDir)?
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Load the user's config file, `None` when it does not exist yet
    pub fn from_local_file() -> Result<Option<Self>, PaddockError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Option<Self>, PaddockError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = File::open(config_path).map_err(|e| PaddockError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| PaddockError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), PaddockError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), PaddockError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| PaddockError::ConfigIOError { source: e })?;
            }
        }

        let file =
            File::create(config_path).map_err(|e| PaddockError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| PaddockError::ConfigSerializeError { source: e })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s)
    }

    pub fn session_load_timeout(&self) -> Duration {
        Duration::from_secs(self.session_load_timeout_s)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_s)
    }
}
