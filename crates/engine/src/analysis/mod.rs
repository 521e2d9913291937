//! Analysis processors, one per query type.
//!
//! Each processor is a pure function of the normalized rows and the intent.
//! None of them fail: missing entities and missing data become notes in the
//! payload.

mod comparison;
mod general;
mod policy;
mod ranking;
mod state_ranking;
pub mod stats;
mod trend;

pub use trend::trend_of;

use crate::citation::CitationLog;
use crate::config::AnalysisSettings;
use crate::payload::Payload;
use crate::types::{NormalizedRow, QueryIntent, QueryType, Scope};
use crate::vocabulary::Vocabulary;

/// Region label used when no state narrows the analysis.
pub const ALL_STATES: &str = "All states";

/// Inputs shared by every processor.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub intent: &'a QueryIntent,
    pub crop_rows: &'a [NormalizedRow],
    pub rainfall_rows: &'a [NormalizedRow],
    pub settings: &'a AnalysisSettings,
    pub vocab: &'a Vocabulary,
}

impl<'a> AnalysisContext<'a> {
    /// Crop rows for one state, or all rows for [`ALL_STATES`].
    pub fn crop_in(&self, region: &str) -> Vec<&'a NormalizedRow> {
        in_region(self.crop_rows, region)
    }

    /// Rainfall rows for one state, or all rows for [`ALL_STATES`].
    pub fn rainfall_in(&self, region: &str) -> Vec<&'a NormalizedRow> {
        in_region(self.rainfall_rows, region)
    }

    /// Named states, or the single national region when none was named.
    pub fn regions(&self) -> Vec<String> {
        let states = &self.intent.entities().states;
        if states.is_empty() {
            vec![ALL_STATES.to_string()]
        } else {
            states.clone()
        }
    }
}

fn in_region<'a>(rows: &'a [NormalizedRow], region: &str) -> Vec<&'a NormalizedRow> {
    rows.iter()
        .filter(|r| region == ALL_STATES || r.state == region)
        .collect()
}

/// What a processor hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub scope: Scope,
    pub data_points: usize,
    pub payload: Payload,
    pub citations: CitationLog,
}

/// Run the processor matching the intent's query type.
pub fn run(ctx: &AnalysisContext<'_>) -> Analysis {
    match ctx.intent.query_type() {
        QueryType::RainfallComparison => comparison::compare_rainfall(ctx),
        QueryType::DistrictRanking => ranking::rank_districts(ctx),
        QueryType::StateRanking => state_ranking::rank_states(ctx),
        QueryType::TrendAnalysis => trend::analyze_trend(ctx),
        QueryType::PolicySupport => policy::support_policy(ctx),
        QueryType::General => general::summarize(ctx),
    }
}
