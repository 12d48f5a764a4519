pub mod config;
pub mod paths;

pub use config::{MAX_RELEASE_YEAR_LEAD, CatalogConfig, Config, ConfigError, LoggingConfig, StorageBackend, StorageConfig};
pub use paths::{PathManager, container_base_path};
