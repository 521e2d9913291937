//! On-disk cache for API responses.
//!
//! Each response is stored as `<sha256>.json` under the cache directory,
//! keyed by dataset id plus request filters. Freshness is judged from the
//! `fetched_at` timestamp recorded inside the file.

use chrono::{DateTime, Duration, Utc};
use samarth_core::{AppError, AppResult};
use samarth_engine::RawRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Stale entries older than this are never served, even on API failure.
pub const STALE_LIMIT_HOURS: i64 = 30 * 24;

/// One cached API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub dataset_id: String,
    pub filters: BTreeMap<String, String>,
    pub records: Vec<RawRecord>,
    /// Total matching records reported by the API
    #[serde(default)]
    pub total: u64,
    pub fetched_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.fetched_at)
    }
}

/// Directory of cached responses.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for a request: hex SHA-256 of the dataset id and the sorted filters.
    pub fn key(dataset_id: &str, filters: &BTreeMap<String, String>) -> String {
        let filter_str = serde_json::to_string(filters).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(dataset_id.as_bytes());
        hasher.update(b"_");
        hasher.update(filter_str.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Load an entry no older than `max_age_hours`.
    ///
    /// Missing, expired and unreadable entries all yield `None`; a corrupt
    /// file is logged and treated as a miss.
    pub async fn load(&self, key: &str, max_age_hours: i64) -> Option<CachedResponse> {
        let path = self.path_for(key);
        let contents = tokio::fs::read_to_string(&path).await.ok()?;

        let cached: CachedResponse = match serde_json::from_str(&contents) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry {:?}: {}", path, e);
                return None;
            }
        };

        if cached.age() > Duration::hours(max_age_hours) {
            tracing::debug!("Cache entry {} expired ({}h old)", key, cached.age().num_hours());
            return None;
        }

        Some(cached)
    }

    pub async fn store(&self, key: &str, response: &CachedResponse) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Data(format!("Failed to create cache directory {:?}: {}", self.dir, e))
        })?;

        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(response)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::Data(format!("Failed to write cache entry {:?}: {}", path, e)))?;

        tracing::debug!("Cached {} records at {:?}", response.records.len(), path);
        Ok(())
    }
}
