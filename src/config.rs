//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

/// Largest page size the detail table accepts.
pub const MAX_PAGE_SIZE: usize = 500;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Backend connection
    pub api: ApiConfig,

    /// Endpoint prefixes per analytics module
    pub modules: ModulesConfig,

    /// Table and filter defaults
    pub view: ViewConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulesConfig {
    pub outpatient: String,
    pub inpatient: String,
    pub workload: String,
    pub drug_cost: String,
    pub prescription: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub page_size: usize,
    /// Length of the default window ending today; 0 means today only.
    pub default_window_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_pretty: bool,
    pub currency_symbol: String,
    pub show_bed_metrics: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
    pub session_file: PathBuf,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            outpatient: "/api/outpatient-revenue".to_string(),
            inpatient: "/api/inpatient-revenue".to_string(),
            workload: "/api/department-workload".to_string(),
            drug_cost: "/api/drug-cost".to_string(),
            prescription: "/api/prescription".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "WARN".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_secs: 60,
            },
            modules: ModulesConfig::default(),
            view: ViewConfig {
                page_size: 20,
                default_window_days: 0,
            },
            output: OutputConfig {
                json_pretty: true,
                currency_symbol: "¥".to_string(),
                show_bed_metrics: true,
            },
            paths: PathsConfig {
                log_directory: PathBuf::from("logs"),
                session_file: dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("hospital-analytics")
                    .join("session.json"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file if it exists
        let config_paths = [
            PathBuf::from("hospital-analytics.toml"),
            PathBuf::from(".hospital-analytics.toml"),
            dirs::config_dir()
                .map(|d| d.join("hospital-analytics").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load from an explicit file, then apply env overrides and validate.
    pub fn load_with_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Backend overrides
        if let Ok(val) = env::var("HOSPITAL_ANALYTICS_BASE_URL") {
            self.api.base_url = val;
        }
        if let Ok(val) = env::var("HOSPITAL_ANALYTICS_TIMEOUT_SECS") {
            self.api.timeout_secs = val
                .parse()
                .context("Invalid HOSPITAL_ANALYTICS_TIMEOUT_SECS")?;
        }

        // View overrides
        if let Ok(val) = env::var("HOSPITAL_ANALYTICS_PAGE_SIZE") {
            self.view.page_size = val.parse().context("Invalid HOSPITAL_ANALYTICS_PAGE_SIZE")?;
        }
        if let Ok(val) = env::var("HOSPITAL_ANALYTICS_WINDOW_DAYS") {
            self.view.default_window_days = val
                .parse()
                .context("Invalid HOSPITAL_ANALYTICS_WINDOW_DAYS")?;
        }

        // Path overrides
        if let Ok(val) = env::var("HOSPITAL_ANALYTICS_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }
        if let Ok(val) = env::var("HOSPITAL_ANALYTICS_SESSION_FILE") {
            self.paths.session_file = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Request timeout must be greater than 0"));
        }
        if self.api.timeout_secs > 600 {
            warn!(
                timeout_secs = self.api.timeout_secs,
                "Request timeout is very long, a stalled backend will block the page"
            );
        }

        reqwest::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api.base_url))?;

        if self.view.page_size == 0 || self.view.page_size > MAX_PAGE_SIZE {
            return Err(anyhow::anyhow!(
                "Page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                self.view.page_size
            ));
        }

        for prefix in [
            &self.modules.outpatient,
            &self.modules.inpatient,
            &self.modules.workload,
            &self.modules.drug_cost,
            &self.modules.prescription,
        ] {
            if !prefix.starts_with('/') {
                return Err(anyhow::anyhow!("Endpoint prefix must start with '/': {}", prefix));
            }
        }

        // File logging needs its directory up front
        if self.logging.output != "console" && !self.paths.log_directory.exists() {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Install `config` as the global instance; later calls keep the first value.
pub fn init_config(config: Config) -> &'static Config {
    CONFIG.get_or_init(|| config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.api.timeout_secs, 60);
        assert_eq!(config.view.page_size, 20);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.view.page_size = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.modules.drug_cost = "api/drug".to_string();
        assert!(config.validate().is_err());
    }
}
