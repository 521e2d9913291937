//! data.gov.in resource API.
//!
//! API: `GET {endpoint}/{resource_id}?api-key=..&format=json&limit=..&offset=..&filters[field]=value`
//!
//! Responses are cached on disk (see [`ResponseCache`]). A fresh entry is
//! served without a request; when the API fails, an entry up to
//! [`STALE_LIMIT_HOURS`] old is served instead with a warning.

use crate::cache::{CachedResponse, ResponseCache, STALE_LIMIT_HOURS};
use crate::source::DataSource;
use crate::types::{FetchFilters, ResourceInfo};
use chrono::Utc;
use samarth_core::{AppError, AppResult};
use samarth_engine::{DatasetKind, RawBatch, RawRecord};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.data.gov.in/resource";
const DEFAULT_LIMIT: u32 = 1000;
const MAX_PAGES: u32 = 5;

/// Resource API response format.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    records: Vec<RawRecord>,
    #[serde(default)]
    total: Option<serde_json::Value>,
}

impl ApiResponse {
    /// `total` arrives as a number or a numeric string depending on the resource.
    fn total(&self) -> Option<u64> {
        let total = self.total.as_ref()?;
        total.as_u64().or_else(|| total.as_str()?.parse().ok())
    }
}

/// Whether another page should be requested. A short page ends the listing;
/// without a reported total, full pages keep the paging going.
fn more_pages(received: usize, fetched: usize, limit: u32, total: Option<u64>) -> bool {
    if received < limit as usize {
        return false;
    }
    total.map_or(true, |total| (fetched as u64) < total)
}

/// data.gov.in client for the crop and rainfall resources.
pub struct DataGovSource {
    endpoint: String,
    api_key: String,
    limit: u32,
    crop: ResourceInfo,
    rainfall: ResourceInfo,
    cache: Option<ResponseCache>,
    max_age_hours: i64,
    client: reqwest::Client,
}

impl DataGovSource {
    /// Client for the published resources with default settings and no cache.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            limit: DEFAULT_LIMIT,
            crop: ResourceInfo::crop_production(),
            rainfall: ResourceInfo::state_rainfall(),
            cache: None,
            max_age_hours: 24,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        match reqwest::Client::builder().timeout(Duration::from_secs(seconds)).build() {
            Ok(client) => self.client = client,
            Err(e) => tracing::warn!("Keeping default HTTP client: {}", e),
        }
        self
    }

    /// Override the resource id used for one dataset; the label is kept.
    pub fn with_resource_id(mut self, kind: DatasetKind, dataset_id: impl Into<String>) -> Self {
        let resource = match kind {
            DatasetKind::Crop => &mut self.crop,
            DatasetKind::Rainfall => &mut self.rainfall,
        };
        resource.dataset_id = dataset_id.into();
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache, max_age_hours: u64) -> Self {
        self.cache = Some(cache);
        self.max_age_hours = i64::try_from(max_age_hours).unwrap_or(i64::MAX);
        self
    }

    pub fn resource(&self, kind: DatasetKind) -> &ResourceInfo {
        match kind {
            DatasetKind::Crop => &self.crop,
            DatasetKind::Rainfall => &self.rainfall,
        }
    }

    /// Filter parameters for each request needed to cover `filters`.
    ///
    /// The API takes one value per filter field, so several states mean
    /// several requests. Years are only pushed down when exactly one is named.
    pub fn request_filters(kind: DatasetKind, filters: &FetchFilters) -> Vec<BTreeMap<String, String>> {
        let (state_field, year_field) = match kind {
            DatasetKind::Crop => ("state_name", "crop_year"),
            DatasetKind::Rainfall => ("state", "year"),
        };

        let mut base = BTreeMap::new();
        if kind == DatasetKind::Crop {
            if let Some(crop) = &filters.crop {
                base.insert("filters[crop]".to_string(), crop.clone());
            }
        }
        if let [year] = filters.years.as_slice() {
            base.insert(format!("filters[{}]", year_field), year.to_string());
        }

        if filters.states.is_empty() {
            return vec![base];
        }

        filters
            .states
            .iter()
            .map(|state| {
                let mut params = base.clone();
                params.insert(format!("filters[{}]", state_field), state.clone());
                params
            })
            .collect()
    }

    async fn request_page(&self, dataset_id: &str, filters: &BTreeMap<String, String>, offset: u64) -> AppResult<ApiResponse> {
        let url = format!("{}/{}", self.endpoint, dataset_id);
        let limit = self.limit.to_string();
        let offset = offset.to_string();

        let mut query: Vec<(&str, &str)> = vec![
            ("api-key", self.api_key.as_str()),
            ("format", "json"),
            ("limit", limit.as_str()),
            ("offset", offset.as_str()),
        ];
        query.extend(filters.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Data(format!("Failed to send request to data.gov.in: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Data(format!(
                "data.gov.in API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Data(format!("Failed to parse data.gov.in response: {}", e)))
    }

    /// All pages for one filter set, up to [`MAX_PAGES`].
    async fn request_all(&self, dataset_id: &str, filters: &BTreeMap<String, String>) -> AppResult<CachedResponse> {
        let mut records = Vec::new();
        let mut total = None;
        let mut exhausted = false;

        for page in 0..MAX_PAGES {
            let offset = u64::from(page) * u64::from(self.limit);
            let response = self.request_page(dataset_id, filters, offset).await?;
            total = response.total().or(total);
            let received = response.records.len();
            records.extend(response.records);

            if !more_pages(received, records.len(), self.limit, total) {
                exhausted = true;
                break;
            }
        }

        match total {
            Some(total) if (records.len() as u64) < total => tracing::warn!(
                "Fetched {} of {} records from {}; later pages were not requested",
                records.len(),
                total,
                dataset_id
            ),
            None if !exhausted => tracing::warn!(
                "Fetched {} records from {} without a reported total; later pages were not requested",
                records.len(),
                dataset_id
            ),
            _ => {}
        }

        Ok(CachedResponse {
            dataset_id: dataset_id.to_string(),
            filters: filters.clone(),
            total: total.unwrap_or(records.len() as u64),
            records,
            fetched_at: Utc::now(),
        })
    }

    /// One filter set, through the cache.
    async fn fetch_cached(&self, dataset_id: &str, filters: &BTreeMap<String, String>) -> AppResult<Vec<RawRecord>> {
        let key = ResponseCache::key(dataset_id, filters);

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.load(&key, self.max_age_hours).await {
                tracing::info!("Using cached data for dataset {}", dataset_id);
                return Ok(hit.records);
            }
        }

        tracing::info!("Fetching data from data.gov.in: {}", dataset_id);
        match self.request_all(dataset_id, filters).await {
            Ok(response) => {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.store(&key, &response).await {
                        tracing::warn!("Could not cache response: {}", e);
                    }
                }
                Ok(response.records)
            }
            Err(e) => {
                tracing::error!("Error fetching data: {}", e);
                if let Some(cache) = &self.cache {
                    if let Some(stale) = cache.load(&key, STALE_LIMIT_HOURS).await {
                        tracing::warn!(
                            "Using stale cached data for {} ({}h old) due to API error",
                            dataset_id,
                            stale.age().num_hours()
                        );
                        return Ok(stale.records);
                    }
                }
                Err(e)
            }
        }
    }
}

#[async_trait::async_trait]
impl DataSource for DataGovSource {
    fn name(&self) -> &str {
        "datagov"
    }

    async fn fetch(&self, kind: DatasetKind, filters: &FetchFilters) -> AppResult<RawBatch> {
        let resource = self.resource(kind);
        let mut records = Vec::new();

        for params in Self::request_filters(kind, filters) {
            records.extend(self.fetch_cached(&resource.dataset_id, &params).await?);
        }

        tracing::debug!("Received {} {} records", records.len(), kind);
        Ok(RawBatch::new(
            kind,
            resource.label.clone(),
            resource.dataset_id.clone(),
            records,
        ))
    }
}
