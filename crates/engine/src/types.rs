//! Engine type definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The two tabular datasets the engine reasons over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Crop,
    Rainfall,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Crop => "crop",
            DatasetKind::Rainfall => "rainfall",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crop" | "crops" | "crop_production" => Ok(DatasetKind::Crop),
            "rainfall" | "rain" => Ok(DatasetKind::Rainfall),
            other => Err(format!("Unknown dataset kind: {}", other)),
        }
    }
}

/// Closed set of analyses a question can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    RainfallComparison,
    DistrictRanking,
    StateRanking,
    TrendAnalysis,
    PolicySupport,
    General,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::RainfallComparison => "rainfall_comparison",
            QueryType::DistrictRanking => "district_ranking",
            QueryType::StateRanking => "state_ranking",
            QueryType::TrendAnalysis => "trend_analysis",
            QueryType::PolicySupport => "policy_support",
            QueryType::General => "general",
        }
    }

    /// Datasets each analysis reads. Both rankings only need crop data.
    pub fn data_sources(&self) -> BTreeSet<DatasetKind> {
        match self {
            QueryType::DistrictRanking | QueryType::StateRanking => BTreeSet::from([DatasetKind::Crop]),
            QueryType::RainfallComparison
            | QueryType::TrendAnalysis
            | QueryType::PolicySupport
            | QueryType::General => BTreeSet::from([DatasetKind::Crop, DatasetKind::Rainfall]),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative crop grouping used by policy questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropCategory {
    DroughtResistant,
    WaterIntensive,
}

impl CropCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CropCategory::DroughtResistant => "drought-resistant",
            CropCategory::WaterIntensive => "water-intensive",
        }
    }

    /// The opposing category a policy argument is weighed against.
    pub fn complement(&self) -> CropCategory {
        match self {
            CropCategory::DroughtResistant => CropCategory::WaterIntensive,
            CropCategory::WaterIntensive => CropCategory::DroughtResistant,
        }
    }
}

impl fmt::Display for CropCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which end of a ranking the question asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingFocus {
    #[default]
    Highest,
    Lowest,
}

impl RankingFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingFocus::Highest => "highest",
            RankingFocus::Lowest => "lowest",
        }
    }
}

impl fmt::Display for RankingFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity kinds a question can be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    State,
    Crop,
    Year,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::State => "state",
            EntityKind::Crop => "crop",
            EntityKind::Year => "year",
        }
    }
}

/// Structured values pulled out of a question.
///
/// Every field may be empty or absent; downstream code checks presence
/// explicitly and falls back to [`crate::config::AnalysisSettings`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    /// Canonical state names in order of first mention
    pub states: Vec<String>,

    /// District names in order of first mention
    pub districts: Vec<String>,

    /// Canonical crop names in order of first mention
    pub crops: Vec<String>,

    /// Explicit calendar years, ascending
    pub years: Vec<i32>,

    /// "last N years" window length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_n_years: Option<usize>,

    /// "top M" count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_m: Option<usize>,

    /// Qualitative crop category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_category: Option<CropCategory>,

    /// "highest" or "lowest" wording
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_focus: Option<RankingFocus>,
}

impl EntitySet {
    /// True when a state or crop was recognised.
    pub fn has_subject(&self) -> bool {
        !self.states.is_empty() || !self.crops.is_empty()
    }

    /// True when nothing at all was recognised.
    pub fn is_empty(&self) -> bool {
        self == &EntitySet::default()
    }
}

/// The parsed understanding of a question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryIntent {
    query_type: QueryType,
    entities: EntitySet,
    data_sources_needed: BTreeSet<DatasetKind>,
}

impl QueryIntent {
    pub fn new(query_type: QueryType, entities: EntitySet) -> Self {
        Self {
            data_sources_needed: query_type.data_sources(),
            query_type,
            entities,
        }
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn data_sources_needed(&self) -> &BTreeSet<DatasetKind> {
        &self.data_sources_needed
    }

    pub fn needs(&self, kind: DatasetKind) -> bool {
        self.data_sources_needed.contains(&kind)
    }
}

/// A loosely-typed record as delivered by a data source.
pub type RawRecord = Map<String, Value>;

/// A batch of raw records sharing one provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBatch {
    /// Schema hint: which dataset shape the records follow
    pub kind: DatasetKind,

    /// Human-readable source label (e.g., "IMD Rainfall Data")
    pub source_label: String,

    /// Dataset identifier at the source
    pub dataset_id: String,

    /// The records themselves
    pub records: Vec<RawRecord>,
}

impl RawBatch {
    pub fn new(
        kind: DatasetKind,
        source_label: impl Into<String>,
        dataset_id: impl Into<String>,
        records: Vec<RawRecord>,
    ) -> Self {
        Self {
            kind,
            source_label: source_label.into(),
            dataset_id: dataset_id.into(),
            records,
        }
    }
}

/// A record rewritten into the shared schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall_mm: Option<f64>,
    pub source_label: String,
    pub dataset_id: String,
}

/// Provenance record tying a derived fact to its source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub claim: String,
    pub source_label: String,
    pub dataset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The entities an analysis actually worked with after defaults were applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scope {
    pub states: Vec<String>,
    pub crops: Vec<String>,
    pub years: Vec<i32>,
}

impl Scope {
    pub fn add_state(&mut self, state: &str) {
        if !self.states.iter().any(|s| s == state) {
            self.states.push(state.to_string());
        }
    }

    pub fn add_crop(&mut self, crop: &str) {
        if !self.crops.iter().any(|c| c == crop) {
            self.crops.push(crop.to_string());
        }
    }

    pub fn add_years(&mut self, years: &[i32]) {
        for year in years {
            if let Err(pos) = self.years.binary_search(year) {
                self.years.insert(pos, *year);
            }
        }
    }
}

/// A year-indexed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}
