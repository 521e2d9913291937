//! Data source request and response types.

use samarth_engine::{EntitySet, QueryIntent, QueryType, RawBatch};
use serde::{Deserialize, Serialize};

/// Narrowing applied by a source before rows are handed to the engine.
///
/// Filters are a hint: a source may return more than asked for, never less.
/// The engine re-filters everything it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFilters {
    /// Canonical state names; empty means all states
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,

    /// Canonical crop name (crop dataset only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,

    /// Explicit years; empty means all years
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub years: Vec<i32>,
}

impl FetchFilters {
    /// Build filters from extracted entities.
    ///
    /// Only a single named crop narrows the request. "Last N years" windows
    /// are resolved against the data itself, so they never become filters.
    pub fn from_entities(entities: &EntitySet) -> Self {
        let crop = match entities.crops.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };

        Self {
            states: entities.states.clone(),
            crop,
            years: entities.years.clone(),
        }
    }

    /// Filters for an intent. Trend questions read every year between the
    /// first and last named year, so the request covers the whole span.
    pub fn for_intent(intent: &QueryIntent) -> Self {
        let mut filters = Self::from_entities(intent.entities());
        if intent.query_type() == QueryType::TrendAnalysis {
            if let (Some(&lo), Some(&hi)) = (filters.years.iter().min(), filters.years.iter().max()) {
                filters.years = (lo..=hi).collect();
            }
        }
        filters
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.crop.is_none() && self.years.is_empty()
    }

    pub fn allows_state(&self, state: &str) -> bool {
        self.states.is_empty() || self.states.iter().any(|s| s == state)
    }

    pub fn allows_crop(&self, crop: &str) -> bool {
        self.crop.as_deref().map_or(true, |c| c.eq_ignore_ascii_case(crop))
    }

    pub fn allows_year(&self, year: i32) -> bool {
        self.years.is_empty() || self.years.contains(&year)
    }
}

/// Provenance of one dataset at a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Human-readable label shown in citations
    pub label: String,

    /// Dataset identifier at the source
    pub dataset_id: String,
}

impl ResourceInfo {
    pub fn new(label: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            dataset_id: dataset_id.into(),
        }
    }

    /// Published crop production dataset on data.gov.in.
    pub fn crop_production() -> Self {
        Self::new(
            "District-wise, Season-wise Crop Production Statistics (Ministry of Agriculture & Farmers Welfare)",
            "9ef84268-d588-465a-a308-a864a43d0070",
        )
    }

    /// Published state-wise rainfall dataset on data.gov.in.
    pub fn state_rainfall() -> Self {
        Self::new(
            "State-wise Annual Rainfall (India Meteorological Department)",
            "b4c3e882-15d4-4a2e-89e0-ff56f19e9f88",
        )
    }
}

/// Batches fetched for one question, split by dataset.
#[derive(Debug, Clone, Default)]
pub struct FetchedData {
    pub crop: Vec<RawBatch>,
    pub rainfall: Vec<RawBatch>,
}

impl FetchedData {
    pub fn record_count(&self) -> usize {
        self.crop
            .iter()
            .chain(self.rainfall.iter())
            .map(|b| b.records.len())
            .sum()
    }
}
