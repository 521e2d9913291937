//! Data source factory.
//!
//! Resolves a source name plus options (usually derived from [`AppConfig`])
//! into a ready [`DataSource`].

use crate::cache::ResponseCache;
use crate::providers::{DataGovSource, FileSource, SyntheticSource};
use crate::source::DataSource;
use samarth_core::AppConfig;
use samarth_engine::DatasetKind;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a provider may need.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Directory with crop.json / rainfall.json (file source)
    pub data_dir: Option<PathBuf>,

    /// data.gov.in API key
    pub api_key: Option<String>,

    /// Custom API endpoint
    pub endpoint: Option<String>,

    /// Resource id overrides
    pub crop_resource: Option<String>,
    pub rainfall_resource: Option<String>,

    /// Records requested per call
    pub limit: Option<u32>,

    /// Request timeout in seconds
    pub timeout: Option<u64>,

    /// Response cache directory; no caching when absent
    pub cache_dir: Option<PathBuf>,
    pub cache_max_age_hours: u64,

    /// Seed for the synthetic generator
    pub seed: Option<u64>,
}

impl SourceOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let datagov = config.datagov.clone().unwrap_or_default();
        Self {
            data_dir: config.data_dir.clone(),
            api_key: config.resolve_api_key(),
            endpoint: Some(datagov.endpoint),
            crop_resource: datagov.crop_resource,
            rainfall_resource: datagov.rainfall_resource,
            limit: Some(datagov.limit),
            timeout: Some(datagov.timeout),
            cache_dir: Some(config.cache_path()),
            cache_max_age_hours: config.cache_max_age_hours,
            seed: None,
        }
    }
}

/// Create a data source by name ("synthetic", "file", "datagov").
///
/// # Errors
/// Returns error if:
/// - Source is unknown
/// - The file source has no data directory
/// - The datagov source has no API key
pub fn create_source(source: &str, options: &SourceOptions) -> Result<Arc<dyn DataSource>, String> {
    match source.to_lowercase().as_str() {
        "synthetic" | "demo" => {
            let generator = match options.seed {
                Some(seed) => SyntheticSource::with_seed(seed),
                None => SyntheticSource::new(),
            };
            Ok(Arc::new(generator))
        }
        "file" | "local" => {
            let dir = options
                .data_dir
                .as_ref()
                .ok_or_else(|| "File source requires a data directory".to_string())?;
            Ok(Arc::new(FileSource::new(dir)))
        }
        "datagov" | "data.gov.in" => {
            let api_key = options
                .api_key
                .as_ref()
                .ok_or_else(|| "datagov source requires API key".to_string())?;

            let mut client = DataGovSource::new(api_key.clone());
            if let Some(endpoint) = &options.endpoint {
                client = client.with_endpoint(endpoint.clone());
            }
            if let Some(limit) = options.limit {
                client = client.with_limit(limit);
            }
            if let Some(timeout) = options.timeout {
                client = client.with_timeout(timeout);
            }
            if let Some(id) = &options.crop_resource {
                client = client.with_resource_id(DatasetKind::Crop, id.clone());
            }
            if let Some(id) = &options.rainfall_resource {
                client = client.with_resource_id(DatasetKind::Rainfall, id.clone());
            }
            if let Some(dir) = &options.cache_dir {
                client = client.with_cache(ResponseCache::new(dir), options.cache_max_age_hours);
            }
            Ok(Arc::new(client))
        }
        _ => Err(format!("Unknown data source: {}", source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_synthetic_source() {
        let source = create_source("synthetic", &SourceOptions::default()).unwrap();
        assert_eq!(source.name(), "synthetic");
    }

    #[test]
    fn test_file_source_requires_dir() {
        match create_source("file", &SourceOptions::default()) {
            Err(err) => assert!(err.contains("requires a data directory")),
            Ok(_) => panic!("Expected error for file source without directory"),
        }

        let options = SourceOptions {
            data_dir: Some(PathBuf::from("/tmp")),
            ..SourceOptions::default()
        };
        assert_eq!(create_source("file", &options).unwrap().name(), "file");
    }

    #[test]
    fn test_datagov_requires_api_key() {
        match create_source("datagov", &SourceOptions::default()) {
            Err(err) => assert!(err.contains("requires API key")),
            Ok(_) => panic!("Expected error for datagov without API key"),
        }
    }

    #[test]
    fn test_datagov_from_config() {
        let mut config = AppConfig::default();
        config.source = "datagov".to_string();
        config.api_key = Some("secret".to_string());

        let options = SourceOptions::from_config(&config);
        assert_eq!(options.endpoint.as_deref(), Some("https://api.data.gov.in/resource"));
        assert_eq!(create_source(&config.source, &options).unwrap().name(), "datagov");
    }

    #[test]
    fn test_unknown_source() {
        match create_source("spreadsheet", &SourceOptions::default()) {
            Err(err) => assert!(err.contains("Unknown data source")),
            Ok(_) => panic!("Expected error for unknown source"),
        }
    }
}
