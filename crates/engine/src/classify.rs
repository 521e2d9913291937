//! Query classification.
//!
//! An ordered decision table of (predicate, query type) rules evaluated top
//! to bottom; the first rule that holds wins and `general` is the fallback.
//!
//! Rule order:
//! 1. two or more states with a rainfall keyword, or with a comparison
//!    keyword when the question is not a district ranking
//!    -> `rainfall_comparison`
//! 2. at least one state with both comparison and rainfall keywords
//!    -> `rainfall_comparison`
//! 3. policy keywords -> `policy_support`
//! 4. ranking keywords with a district keyword or a named district
//!    -> `district_ranking`
//! 5. ranking keywords with a named crop or a state keyword
//!    -> `state_ranking`
//! 6. trend or correlation keywords -> `trend_analysis`

use crate::extract::EntityExtractor;
use crate::types::{EntitySet, QueryIntent, QueryType};
use tracing::debug;

const COMPARE: &[&str] = &["compare", "compared", "comparing", "comparison", "versus", "vs"];

const RAIN: &[&str] = &["rain", "rainfall", "rainfalls", "precipitation", "monsoon"];

const POLICY: &[&str] = &[
    "policy",
    "policies",
    "should we",
    "recommend",
    "recommendation",
    "strategy",
    "scheme",
    "promote",
    "promoting",
    "advise",
    "arguments",
    "plan",
];

const RANKING: &[&str] = &[
    "highest", "lowest", "top", "rank", "ranking", "most", "least", "best", "worst", "leading",
    "maximum", "minimum", "largest", "smallest",
];

const DISTRICT: &[&str] = &["district", "districts"];

const STATE: &[&str] = &["state", "states", "statewise", "state-wise"];

const TREND: &[&str] = &[
    "trend",
    "trends",
    "trajectory",
    "over time",
    "year-over-year",
    "growth",
    "decline",
    "correlate",
    "correlation",
    "correlated",
    "impact",
    "relationship",
    "pattern",
    "patterns",
];

/// Keyword and entity evidence a rule predicate can inspect.
#[derive(Debug, Clone)]
pub struct Signals<'a> {
    text: String,
    pub entities: &'a EntitySet,
}

impl<'a> Signals<'a> {
    pub fn new(question: &str, entities: &'a EntitySet) -> Self {
        Self {
            text: keyword_text(question),
            entities,
        }
    }

    /// True when any of the phrases occurs as whole words.
    pub fn any(&self, phrases: &[&str]) -> bool {
        phrases
            .iter()
            .any(|p| self.text.contains(&format!(" {} ", p)))
    }

    fn compare(&self) -> bool {
        self.any(COMPARE)
    }

    fn rain(&self) -> bool {
        self.any(RAIN)
    }

    fn district_ranking(&self) -> bool {
        self.any(RANKING) && (self.any(DISTRICT) || !self.entities.districts.is_empty())
    }
}

/// Lower-case, strip punctuation other than `-`, and pad with spaces so
/// phrase checks can use `" phrase "`.
fn keyword_text(question: &str) -> String {
    let cleaned: String = question
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// One row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub query_type: QueryType,
    pub predicate: fn(&Signals) -> bool,
}

/// The fixed, ordered rule set.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule {
            name: "multi-state comparison",
            query_type: QueryType::RainfallComparison,
            predicate: |s| {
                s.entities.states.len() >= 2 && (s.rain() || (s.compare() && !s.district_ranking()))
            },
        },
        ClassificationRule {
            name: "state rainfall comparison",
            query_type: QueryType::RainfallComparison,
            predicate: |s| !s.entities.states.is_empty() && s.compare() && s.rain(),
        },
        ClassificationRule {
            name: "policy support",
            query_type: QueryType::PolicySupport,
            predicate: |s| s.any(POLICY),
        },
        ClassificationRule {
            name: "district ranking",
            query_type: QueryType::DistrictRanking,
            predicate: |s| s.district_ranking(),
        },
        ClassificationRule {
            name: "state ranking",
            query_type: QueryType::StateRanking,
            predicate: |s| s.any(RANKING) && (!s.entities.crops.is_empty() || s.any(STATE)),
        },
        ClassificationRule {
            name: "trend or correlation",
            query_type: QueryType::TrendAnalysis,
            predicate: |s| s.any(TREND),
        },
    ]
}

/// Turns question text into a [`QueryIntent`].
#[derive(Debug, Clone)]
pub struct QueryClassifier {
    extractor: EntityExtractor,
    rules: Vec<ClassificationRule>,
}

impl QueryClassifier {
    pub fn new(extractor: EntityExtractor) -> Self {
        Self {
            extractor,
            rules: default_rules(),
        }
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Pick a query type for already-extracted entities.
    pub fn classify(&self, question: &str, entities: &EntitySet) -> QueryType {
        let signals = Signals::new(question, entities);
        for rule in &self.rules {
            if (rule.predicate)(&signals) {
                debug!(rule = rule.name, query_type = %rule.query_type, "Classified question");
                return rule.query_type;
            }
        }
        debug!("No rule matched, falling back to general");
        QueryType::General
    }

    /// Extract entities and classify in one step.
    pub fn intent(&self, question: &str) -> QueryIntent {
        let entities = self.extractor.extract(question);
        let query_type = self.classify(question, &entities);
        QueryIntent::new(query_type, entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;

    fn classifier() -> QueryClassifier {
        QueryClassifier::new(EntityExtractor::new(&Vocabulary::default()).unwrap())
    }

    fn kind(question: &str) -> QueryType {
        classifier().intent(question).query_type()
    }

    #[test]
    fn test_keyword_text() {
        assert_eq!(keyword_text("Compare, Punjab's RAIN?"), " compare punjab s rain ");
        assert_eq!(keyword_text("year-over-year"), " year-over-year ");
    }

    #[test]
    fn test_rainfall_comparison() {
        let intent = classifier().intent(
            "Compare the average annual rainfall in Punjab and Haryana for the last 5 years",
        );
        assert_eq!(intent.query_type(), QueryType::RainfallComparison);
        assert_eq!(intent.entities().states, vec!["Punjab", "Haryana"]);
    }

    #[test]
    fn test_comparison_beats_trend() {
        assert_eq!(
            kind("Compare the rainfall trend of Kerala versus Karnataka"),
            QueryType::RainfallComparison
        );
        assert_eq!(kind("Compare rainfall in Kerala since 2015"), QueryType::RainfallComparison);
    }

    #[test]
    fn test_district_ranking_with_two_states() {
        assert_eq!(
            kind(
                "Identify the district in Punjab with the highest production of Rice in 2023 \
                 and compare that with the district with the lowest production in Haryana"
            ),
            QueryType::DistrictRanking
        );
    }

    #[test]
    fn test_state_ranking() {
        assert_eq!(
            kind("Which state has the lowest Rice production? List the top 3 states"),
            QueryType::StateRanking
        );
        assert_eq!(kind("Which states grow the most Wheat?"), QueryType::StateRanking);
        // A district keyword keeps the finer ranking.
        assert_eq!(
            kind("Which district in Punjab has the highest Rice production?"),
            QueryType::DistrictRanking
        );
        // Ranking words with neither a crop nor states are not a ranking.
        assert_eq!(kind("What is the best season to visit?"), QueryType::General);
    }

    #[test]
    fn test_policy() {
        assert_eq!(
            kind("What are three arguments to promote drought-resistant crops in Maharashtra?"),
            QueryType::PolicySupport
        );
    }

    #[test]
    fn test_trend() {
        assert_eq!(
            kind("Analyze the production trend of Wheat in Punjab over the last decade"),
            QueryType::TrendAnalysis
        );
        assert_eq!(
            kind("How does rainfall impact Rice production in Odisha?"),
            QueryType::TrendAnalysis
        );
    }

    #[test]
    fn test_general_fallback() {
        assert_eq!(kind("Tell me about Bajra"), QueryType::General);
        assert_eq!(kind(""), QueryType::General);
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<_> = default_rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "multi-state comparison",
                "state rainfall comparison",
                "policy support",
                "district ranking",
                "state ranking",
                "trend or correlation",
            ]
        );
    }
}
