use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("catalog.page_size must be greater than zero")]
    ZeroPageSize,
    #[error("catalog.min_release_year {0} is in the future")]
    MinYearInFuture(i32),
    #[error("catalog.release_year_lead {0} must be between 0 and {max}", max = MAX_RELEASE_YEAR_LEAD)]
    ReleaseYearLeadOutOfRange(i32),
    #[error("logging.level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Upper bound for `catalog.release_year_lead`
pub const MAX_RELEASE_YEAR_LEAD: i32 = 100;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Documents live in memory for the lifetime of the process
    Memory,
    /// One JSON file per collection under the store directory
    #[default]
    Json,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Overrides the platform data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_min_release_year")]
    pub min_release_year: i32,
    /// How many years past the current one an announced title may be dated
    #[serde(default = "default_release_year_lead")]
    pub release_year_lead: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_page_size() -> usize {
    10
}

fn default_min_release_year() -> i32 {
    1900
}

fn default_release_year_lead() -> i32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            min_release_year: default_min_release_year(),
            release_year_lead: default_release_year_lead(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl CatalogConfig {
    /// Inclusive range of release years accepted for new or edited movies
    pub fn release_year_bounds(&self) -> (i32, i32) {
        let current_year = chrono::Utc::now().year();
        (
            self.min_release_year,
            current_year.saturating_add(self.release_year_lead.clamp(0, MAX_RELEASE_YEAR_LEAD)),
        )
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults when the file does not exist yet
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }

        let current_year = chrono::Utc::now().year();
        if self.catalog.min_release_year > current_year {
            return Err(ConfigError::MinYearInFuture(self.catalog.min_release_year));
        }

        if !(0..=MAX_RELEASE_YEAR_LEAD).contains(&self.catalog.release_year_lead) {
            return Err(ConfigError::ReleaseYearLeadOutOfRange(self.catalog.release_year_lead));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                data_dir: Some(PathBuf::from("/tmp/cinerate-data")),
            },
            catalog: CatalogConfig {
                page_size: 25,
                ..CatalogConfig::default()
            },
            logging: LoggingConfig::default(),
        };

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.storage.backend, StorageBackend::Memory);
        assert_eq!(loaded.storage.data_dir, Some(PathBuf::from("/tmp/cinerate-data")));
        assert_eq!(loaded.catalog.page_size, 25);
        assert_eq!(loaded.catalog.min_release_year, 1900);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.catalog.page_size, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section() {
        let config: Config = toml::from_str("[catalog]\nmin_release_year = 1920\n").unwrap();
        assert_eq!(config.catalog.min_release_year, 1920);
        assert_eq!(config.catalog.page_size, 10);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        config.catalog.page_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPageSize));

        config.catalog.page_size = 10;
        config.catalog.min_release_year = 9999;
        assert_eq!(config.validate(), Err(ConfigError::MinYearInFuture(9999)));

        config.catalog.min_release_year = 1900;
        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.catalog.page_size, 10);
    }

    #[test]
    fn test_release_year_bounds_include_lead() {
        let catalog = CatalogConfig::default();
        let (min, max) = catalog.release_year_bounds();
        assert_eq!(min, 1900);
        assert_eq!(max, chrono::Utc::now().year() + 5);
    }

    #[test]
    fn test_huge_release_year_lead_is_rejected_and_bounded() {
        let mut config = Config::default();
        config.catalog.release_year_lead = i32::MAX;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ReleaseYearLeadOutOfRange(i32::MAX))
        );

        config.catalog.release_year_lead = -3;
        assert_eq!(config.validate(), Err(ConfigError::ReleaseYearLeadOutOfRange(-3)));

        config.catalog.release_year_lead = i32::MAX;
        let (_, max) = config.catalog.release_year_bounds();
        assert_eq!(max, chrono::Utc::now().year() + MAX_RELEASE_YEAR_LEAD);
    }
}
