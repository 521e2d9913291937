//! Result bundle and type-specific payloads.

use crate::types::{Citation, CropCategory, EntityKind, QueryType, RankingFocus, Scope, YearValue};
use serde::Serialize;

/// Everything an analysis produced for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBundle {
    pub query_type: QueryType,

    /// Entities the analysis actually used, after defaults
    pub scope: Scope,

    /// Normalized rows that fed the analysis
    pub data_points: usize,

    pub payload: Payload,

    /// Numbered in order; payload items refer to them by 1-based position
    pub citations: Vec<Citation>,
}

/// The final output handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub formatted_text: String,
    pub bundle: ResultBundle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    RainfallComparison(ComparisonTable),
    DistrictRanking(DistrictRanking),
    StateRanking(StateRanking),
    TrendAnalysis(TrendReport),
    PolicySupport(PolicyBrief),
    General(GeneralSummary),
}

impl Payload {
    pub fn notes(&self) -> &[String] {
        match self {
            Payload::RainfallComparison(p) => &p.notes,
            Payload::DistrictRanking(p) => &p.notes,
            Payload::StateRanking(p) => &p.notes,
            Payload::TrendAnalysis(p) => &p.notes,
            Payload::PolicySupport(p) => &p.notes,
            Payload::General(p) => &p.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    /// Window length asked for (explicitly or by default)
    pub years_requested: usize,
    pub top_m: usize,
    pub states: Vec<StateComparison>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateComparison {
    pub state: String,
    /// Years actually used for this state
    pub years: Vec<i32>,
    pub mean_rainfall_mm: Option<f64>,
    pub rainfall_years: usize,
    pub top_crops: Vec<CropTotal>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropTotal {
    pub crop: String,
    pub total_production: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictRanking {
    pub crop: Option<String>,
    pub years: Vec<i32>,
    pub groups: Vec<StateDistricts>,
    pub overall_highest: Option<DistrictTotal>,
    pub overall_lowest: Option<DistrictTotal>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDistricts {
    /// A state, or "All states" when none was named
    pub region: String,
    pub highest: Option<DistrictTotal>,
    pub lowest: Option<DistrictTotal>,
    /// Every district with data, highest production first
    pub districts: Vec<DistrictTotal>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictTotal {
    pub state: String,
    pub district: String,
    pub production: f64,
}

/// States ordered from the requested end of the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRanking {
    pub crop: Option<String>,
    pub focus: RankingFocus,
    pub years: Vec<i32>,
    /// At most the requested number of states, best match first
    pub states: Vec<StateTotal>,
    /// States with data before the list was cut
    pub states_ranked: usize,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTotal {
    pub state: String,
    pub production: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub crop: Option<String>,
    pub window: Vec<i32>,
    pub series: Vec<RegionTrend>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTrend {
    pub region: String,
    pub production_by_year: Vec<YearValue>,
    pub trend: Option<Trend>,
    pub rainfall_by_year: Vec<YearValue>,
    pub mean_rainfall_mm: Option<f64>,
    pub correlation: Option<Correlation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Flat => "flat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub first: YearValue,
    pub last: YearValue,
    /// `None` when a zero endpoint makes the change undefined
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationLabel {
    SameDirection,
    OppositeDirection,
    NoClearRelationship,
    InsufficientOverlap,
}

impl CorrelationLabel {
    pub fn describe(&self) -> &'static str {
        match self {
            CorrelationLabel::SameDirection => "production and rainfall move in the same direction",
            CorrelationLabel::OppositeDirection => {
                "production and rainfall move in opposite directions"
            }
            CorrelationLabel::NoClearRelationship => "no clear relationship",
            CorrelationLabel::InsufficientOverlap => "too few overlapping years to compare",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    /// Pearson r over the overlapping years
    pub coefficient: Option<f64>,
    pub overlap_years: usize,
    pub label: CorrelationLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyBrief {
    pub region: String,
    pub category: CropCategory,
    pub complement: CropCategory,
    pub window: Vec<i32>,
    pub arguments: Vec<Argument>,
    pub in_category_crops: Vec<CropTotal>,
    pub complement_crops: Vec<CropTotal>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub rank: usize,
    pub title: String,
    pub statement: String,
    pub evidence: Vec<String>,
    /// 1-based positions in [`ResultBundle::citations`]
    pub citations: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralSummary {
    pub production: Vec<ProductionSummary>,
    pub rainfall: Vec<RainfallSummary>,
    pub insufficient: Option<InsufficientInfo>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionSummary {
    /// `None` means all states
    pub state: Option<String>,
    /// `None` means all crops
    pub crop: Option<String>,
    pub years: Vec<i32>,
    pub total: f64,
    pub mean_annual: f64,
    pub by_year: Vec<YearValue>,
    /// Largest producing state, for crop-only questions
    pub top_state: Option<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallSummary {
    pub state: String,
    pub years: Vec<i32>,
    pub mean_mm: f64,
    pub by_year: Vec<YearValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsufficientInfo {
    /// Entity kinds the question should name
    pub needed: Vec<EntityKind>,
    pub message: String,
    pub suggestions: Vec<String>,
}
