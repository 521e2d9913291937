//! Configuration management for Samarth.
//!
//! Configuration is merged from several layers, later layers winning:
//! - Built-in defaults
//! - Config file (`.samarth/config.yaml` or `SAMARTH_CONFIG`)
//! - Environment variables
//! - Command-line flags (`with_overrides`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Data sources understood by the data crate's factory.
pub const KNOWN_SOURCES: [&str; 3] = ["synthetic", "file", "datagov"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains .samarth/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active data source ("synthetic", "file", "datagov")
    pub source: String,

    /// Directory holding crop.json / rainfall.json for the file source
    pub data_dir: Option<PathBuf>,

    /// data.gov.in API key
    pub api_key: Option<String>,

    /// Directory for cached API responses
    pub cache_dir: Option<PathBuf>,

    /// Maximum age of a cached response before it is refetched
    pub cache_max_age_hours: u64,

    /// Engine configuration file (vocabulary and analysis settings)
    pub engine_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// data.gov.in resource settings
    pub datagov: Option<DataGovConfig>,
}

/// data.gov.in settings from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataGovConfig {
    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv", default = "default_api_key_env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(default = "default_datagov_endpoint")]
    pub endpoint: String,

    /// Resource id of the crop production dataset
    #[serde(rename = "cropResource", skip_serializing_if = "Option::is_none")]
    pub crop_resource: Option<String>,

    /// Resource id of the rainfall dataset
    #[serde(rename = "rainfallResource", skip_serializing_if = "Option::is_none")]
    pub rainfall_resource: Option<String>,

    /// Records requested per call
    #[serde(default = "default_page_limit")]
    pub limit: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_api_key_env() -> String {
    "DATA_GOV_API_KEY".to_string()
}

fn default_datagov_endpoint() -> String {
    "https://api.data.gov.in/resource".to_string()
}

fn default_page_limit() -> u32 {
    1000
}

fn default_timeout() -> u64 {
    30
}

impl Default for DataGovConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            endpoint: default_datagov_endpoint(),
            crop_resource: None,
            rainfall_resource: None,
            limit: default_page_limit(),
            timeout: default_timeout(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    data: Option<DataConfig>,
    datagov: Option<DataGovConfig>,
    engine: Option<EngineFileConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataConfig {
    source: Option<String>,
    #[serde(rename = "dataDir")]
    data_dir: Option<String>,
    #[serde(rename = "cacheDir")]
    cache_dir: Option<String>,
    #[serde(rename = "cacheMaxAgeHours")]
    cache_max_age_hours: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineFileConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            source: "synthetic".to_string(),
            data_dir: None,
            api_key: None,
            cache_dir: None,
            cache_max_age_hours: 24,
            engine_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            datagov: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the config file and defaults.
    ///
    /// Environment variables:
    /// - `SAMARTH_WORKSPACE`: Override workspace path
    /// - `SAMARTH_CONFIG`: Path to config file
    /// - `SAMARTH_SOURCE`: Data source name
    /// - `SAMARTH_DATA_DIR`: Directory for the file source
    /// - `SAMARTH_API_KEY`: data.gov.in API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], but an explicit workspace or config file
    /// (usually from CLI flags) wins over `SAMARTH_WORKSPACE` / `SAMARTH_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| std::env::var("SAMARTH_WORKSPACE").ok().map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| std::env::var("SAMARTH_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.samarth_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(source) = std::env::var("SAMARTH_SOURCE") {
            config.source = source;
        }

        if let Ok(data_dir) = std::env::var("SAMARTH_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(data_dir));
        }

        if let Ok(key) = std::env::var("SAMARTH_API_KEY") {
            config.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(data) = config_file.data {
            if let Some(source) = data.source {
                result.source = source;
            }
            if let Some(dir) = data.data_dir {
                result.data_dir = Some(result.resolve(&dir));
            }
            if let Some(dir) = data.cache_dir {
                result.cache_dir = Some(result.resolve(&dir));
            }
            if let Some(hours) = data.cache_max_age_hours {
                result.cache_max_age_hours = hours;
            }
        }

        if let Some(engine) = config_file.engine {
            if let Some(path) = engine.path {
                result.engine_file = Some(result.resolve(&path));
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(datagov) = config_file.datagov {
            result.datagov = Some(datagov);
        }

        Ok(result)
    }

    /// Resolve a config-relative path against the workspace.
    fn resolve(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.workspace.join(path)
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        source: Option<String>,
        data_dir: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(source) = source {
            self.source = source;
        }

        if let Some(data_dir) = data_dir {
            self.data_dir = Some(data_dir);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .samarth directory.
    pub fn samarth_dir(&self) -> PathBuf {
        self.workspace.join(".samarth")
    }

    /// Directory used for cached API responses.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| self.samarth_dir().join("cache"))
    }

    /// Engine configuration file, defaulting to `.samarth/engine.yaml`.
    pub fn engine_path(&self) -> PathBuf {
        self.engine_file
            .clone()
            .unwrap_or_else(|| self.samarth_dir().join("engine.yaml"))
    }

    /// Resolve the data.gov.in API key: explicit key first, then the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = self
            .datagov
            .as_ref()
            .map(|d| d.api_key_env.clone())
            .unwrap_or_else(default_api_key_env);

        std::env::var(env_var).ok()
    }

    /// Validate configuration for the active source.
    pub fn validate(&self) -> AppResult<()> {
        let source = self.source.as_str();

        if !KNOWN_SOURCES.contains(&source) {
            return Err(AppError::Config(format!(
                "Unknown data source: {}. Supported: {}",
                source,
                KNOWN_SOURCES.join(", ")
            )));
        }

        match source {
            "file" => match self.data_dir {
                Some(ref dir) if dir.is_dir() => {}
                Some(ref dir) => {
                    return Err(AppError::Config(format!(
                        "Data directory does not exist: {:?}",
                        dir
                    )))
                }
                None => {
                    return Err(AppError::Config(
                        "The file source requires a data directory (--data-dir or SAMARTH_DATA_DIR)"
                            .to_string(),
                    ))
                }
            },
            "datagov" => {
                if self.resolve_api_key().is_none() {
                    return Err(AppError::Config(
                        "The datagov source requires an API key (SAMARTH_API_KEY or datagov.apiKeyEnv)"
                            .to_string(),
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> AppConfig {
        AppConfig {
            workspace: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.source, "synthetic");
        assert_eq!(config.cache_max_age_hours, 24);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_default_paths() {
        let config = AppConfig::default();
        assert!(config.samarth_dir().ends_with(".samarth"));
        assert!(config.cache_path().ends_with(".samarth/cache"));
        assert!(config.engine_path().ends_with(".samarth/engine.yaml"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            None,
            Some("file".to_string()),
            Some(PathBuf::from("/tmp/data")),
            None,
            true,
            false,
        );

        assert_eq!(config.source, "file");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/data")));
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            "data:\n  source: file\n  dataDir: data\n  cacheMaxAgeHours: 6\nlogging:\n  level: info\n  color: false\ndatagov:\n  cropResource: abc-123\n",
        )
        .unwrap();

        let merged = config_in(temp.path()).merge_yaml(&path).unwrap();

        assert_eq!(merged.source, "file");
        assert_eq!(merged.data_dir, Some(temp.path().join("data")));
        assert_eq!(merged.cache_max_age_hours, 6);
        assert_eq!(merged.log_level, Some("info".to_string()));
        assert!(merged.no_color);

        let datagov = merged.datagov.unwrap();
        assert_eq!(datagov.crop_resource, Some("abc-123".to_string()));
        assert_eq!(datagov.limit, 1000);
        assert_eq!(datagov.api_key_env, "DATA_GOV_API_KEY");
    }

    #[test]
    fn test_merge_yaml_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "data: [unterminated").unwrap();

        let result = config_in(temp.path()).merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_from_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        std::fs::write(&path, "data:\n  cacheMaxAgeHours: 2\n").unwrap();

        let config = AppConfig::load_from(Some(temp.path().to_path_buf()), Some(path)).unwrap();
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.cache_max_age_hours, 2);
    }

    #[test]
    fn test_load_from_missing_workspace() {
        let result = AppConfig::load_from(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_source() {
        let mut config = AppConfig::default();
        config.source = "spreadsheet".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_synthetic() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_file_source_needs_dir() {
        let mut config = AppConfig::default();
        config.source = "file".to_string();
        assert!(config.validate().is_err());

        let temp = TempDir::new().unwrap();
        config.data_dir = Some(temp.path().to_path_buf());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_api_key_resolves() {
        let mut config = AppConfig::default();
        config.api_key = Some("secret".to_string());
        assert_eq!(config.resolve_api_key(), Some("secret".to_string()));
    }
}
