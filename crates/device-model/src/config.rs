//! Runtime Configuration (C8, §4.8). `device_model.toml`, loaded once at
//! boot and optionally hot-reloaded the way the teacher's `ConfigManager`
//! watches its own config file — a background thread re-parses on every
//! filesystem modify event and swaps an `Arc<RwLock<Config>>` snapshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, RwLock};
use std::thread;
use std::time::Duration;

use device_model_types::{ConfigError, OCPP_VALUE_ABSOLUTE_MAX_LENGTH};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;

/// Full `device_model.toml` contents.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[limits]` — feeds C7's per-message gates and the absolute read/write cap.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub absolute_max_value_length: i64,
    pub get_items_per_message: u32,
    pub get_bytes_per_message: u32,
    pub set_items_per_message: u32,
    pub set_bytes_per_message: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            absolute_max_value_length: OCPP_VALUE_ABSOLUTE_MAX_LENGTH as i64,
            get_items_per_message: 0,
            get_bytes_per_message: 0,
            set_items_per_message: 0,
            set_bytes_per_message: 0,
        }
    }
}

/// `[store]` — selects the `ConfigurationKeyStore` backend (C9).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub sqlite_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: StoreBackend::Memory, sqlite_path: "device_model.sqlite3".to_string() }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

/// `[logging]` — level and destination for C11.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), directory: "logs".to_string() }
    }
}

impl Config {
    /// Loads and validates `path`. A missing file falls back to the
    /// documented defaults; a malformed one is a hard error (§4.8).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default_values());
        }
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io { path: path.to_path_buf(), source: e })?;
        let cfg: Config = toml::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn default_values() -> Self {
        Config { limits: LimitsConfig::default(), store: StoreConfig::default(), logging: LoggingConfig::default() }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.absolute_max_value_length <= 0 {
            return Err(ConfigError::Validation("limits.absolute_max_value_length must be > 0".to_string()));
        }
        if self.store.backend == StoreBackend::Sqlite && self.store.sqlite_path.trim().is_empty() {
            return Err(ConfigError::Validation("store.sqlite_path must be set when store.backend = \"sqlite\"".to_string()));
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Live-updating view over `Config`. Only `[limits]`/`[logging]` are
/// meaningfully "live" — changing `[store].backend` after boot requires a
/// fresh manager, since the backend owns its own connection (§4.8).
pub struct ConfigManager {
    inner: Arc<RwLock<Config>>,
    _watcher: RecommendedWatcher,
}

impl ConfigManager {
    pub fn new(path: &Path, on_reload: impl Fn(&Config) + Send + 'static) -> Result<Self, ConfigError> {
        let cfg = Config::load(path)?;
        let shared = Arc::new(RwLock::new(cfg));
        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(tx, notify::Config::default().with_poll_interval(Duration::from_secs(1)))
            .map_err(|e| ConfigError::Validation(format!("watcher error: {e}")))?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::Validation(format!("watch error: {e}")))?;

        let cfg_path: PathBuf = path.to_path_buf();
        let shared_clone = Arc::clone(&shared);
        thread::Builder::new()
            .name("device_model_config_watcher".to_string())
            .spawn(move || {
                for evt in rx {
                    let Ok(event) = evt else { continue };
                    if !matches!(event.kind, EventKind::Modify(_)) {
                        continue;
                    }
                    match Config::load(&cfg_path) {
                        Ok(new_cfg) => {
                            on_reload(&new_cfg);
                            *shared_clone.write().expect("config lock poisoned") = new_cfg;
                            log::info!("device_model.toml reloaded");
                        }
                        Err(e) => log::error!("failed to reload device_model.toml: {e}"),
                    }
                }
            })
            .expect("failed to spawn config watcher thread");

        Ok(ConfigManager { inner: shared, _watcher: watcher })
    }

    pub fn get(&self) -> Config {
        self.inner.read().expect("config lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unspecified() {
        let cfg = Config::from_str("").unwrap();
        assert_eq!(cfg.limits.absolute_max_value_length, OCPP_VALUE_ABSOLUTE_MAX_LENGTH as i64);
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = Config::from_str("limits.absolute_max_value_length = \"oops\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_absolute_max_is_rejected() {
        let err = Config::from_str("[limits]\nabsolute_max_value_length = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn sqlite_backend_requires_path() {
        let err = Config::from_str("[store]\nbackend = \"sqlite\"\nsqlite_path = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
