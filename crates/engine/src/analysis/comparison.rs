//! Rainfall comparison across states, with each state's top crops.

use super::stats::{mean, rank_desc, select_years, sum_production_by, yearly_mean_rainfall, years_of};
use super::{Analysis, AnalysisContext};
use crate::citation::{coverage_detail, describe_years, CitationLog};
use crate::payload::{ComparisonTable, CropTotal, Payload, StateComparison};
use crate::types::{NormalizedRow, Scope};
use tracing::debug;

pub(super) fn compare_rainfall(ctx: &AnalysisContext<'_>) -> Analysis {
    let entities = ctx.intent.entities();
    let explicit = &entities.years;
    let last_n = entities.last_n_years.unwrap_or(ctx.settings.default_last_n_years);
    let top_m = entities.top_m.unwrap_or(ctx.settings.default_top_m);
    let years_requested = if explicit.is_empty() { last_n } else { explicit.len() };

    let mut citations = CitationLog::new();
    let mut scope = Scope::default();
    let mut notes = Vec::new();
    let mut data_points = 0;

    if entities.last_n_years.is_none() && explicit.is_empty() {
        notes.push(format!(
            "No period given; using the {} most recent years available per state.",
            last_n
        ));
    }
    if entities.top_m.is_none() {
        notes.push(format!("No crop count given; listing the top {} crops.", top_m));
    }
    if entities.states.is_empty() {
        notes.push("No state was recognised in the question; nothing to compare.".to_string());
    }

    let mut states = Vec::new();
    for state in &entities.states {
        scope.add_state(state);

        let rain_rows = ctx.rainfall_in(state);
        let crop_rows: Vec<&NormalizedRow> = ctx
            .crop_in(state)
            .into_iter()
            .filter(|r| {
                entities.crops.is_empty()
                    || r.crop.as_ref().is_some_and(|c| entities.crops.contains(c))
            })
            .collect();

        let mut available = years_of(rain_rows.iter().copied());
        available.extend(years_of(crop_rows.iter().copied()));
        let years = select_years(&available, explicit, last_n);
        scope.add_years(&years);

        let mut state_notes = Vec::new();

        let rain_window: Vec<&NormalizedRow> = rain_rows
            .into_iter()
            .filter(|r| years.contains(&r.year))
            .collect();
        let yearly = yearly_mean_rainfall(rain_window.iter().copied());
        let yearly_values: Vec<f64> = yearly.values().copied().collect();
        let mean_rainfall_mm = mean(&yearly_values);
        let rain_years: Vec<i32> = yearly.keys().copied().collect();

        if mean_rainfall_mm.is_some() {
            citations.cite(
                format!("Mean annual rainfall in {}", state),
                rain_window.iter().copied(),
                Some(coverage_detail(
                    "Mean of yearly rainfall",
                    &rain_years,
                    Some(years_requested),
                    rain_window.len(),
                )),
            );
        } else {
            state_notes.push(format!(
                "No rainfall data for {} in {}.",
                state,
                describe_years(&years)
            ));
        }
        if mean_rainfall_mm.is_some() && rain_years.len() < years_requested {
            state_notes.push(format!(
                "Rainfall covers {} of {} requested years for {}.",
                rain_years.len(),
                years_requested,
                state
            ));
        }

        let crop_window: Vec<&NormalizedRow> = crop_rows
            .into_iter()
            .filter(|r| years.contains(&r.year) && r.production.is_some())
            .collect();
        let ranked = rank_desc(sum_production_by(crop_window.iter().copied(), |r| r.crop.clone()));
        let distinct = ranked.len();
        let top_crops: Vec<CropTotal> = ranked
            .into_iter()
            .take(top_m)
            .map(|(crop, total_production)| CropTotal {
                crop,
                total_production,
            })
            .collect();

        if top_crops.is_empty() {
            state_notes.push(format!(
                "No crop production data for {} in {}.",
                state,
                describe_years(&years)
            ));
        } else {
            let crop_years: Vec<i32> = years_of(crop_window.iter().copied()).into_iter().collect();
            citations.cite(
                format!("Top crops by total production in {}", state),
                crop_window.iter().copied(),
                Some(coverage_detail(
                    "Production summed by crop",
                    &crop_years,
                    Some(years_requested),
                    crop_window.len(),
                )),
            );
            if distinct < top_m {
                state_notes.push(format!(
                    "Only {} distinct crop{} recorded for {}; all are listed.",
                    distinct,
                    if distinct == 1 { "" } else { "s" },
                    state
                ));
            }
            for crop in &top_crops {
                scope.add_crop(&crop.crop);
            }
        }

        debug!(
            state = %state,
            years = years.len(),
            rain_rows = rain_window.len(),
            crop_rows = crop_window.len(),
            "Compared state"
        );
        data_points += rain_window.len() + crop_window.len();

        states.push(StateComparison {
            state: state.clone(),
            years,
            mean_rainfall_mm,
            rainfall_years: rain_years.len(),
            top_crops,
            notes: state_notes,
        });
    }

    Analysis {
        scope,
        data_points,
        payload: Payload::RainfallComparison(ComparisonTable {
            years_requested,
            top_m,
            states,
            notes,
        }),
        citations,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{crop, rain, CROP_ID, RAIN_ID};
    use super::*;
    use crate::config::AnalysisSettings;
    use crate::types::{EntitySet, QueryIntent, QueryType};
    use crate::vocabulary::Vocabulary;

    fn run(entities: EntitySet, crops: &[NormalizedRow], rains: &[NormalizedRow]) -> Analysis {
        let intent = QueryIntent::new(QueryType::RainfallComparison, entities);
        let settings = AnalysisSettings::default();
        let vocab = Vocabulary::default();
        let ctx = AnalysisContext {
            intent: &intent,
            crop_rows: crops,
            rainfall_rows: rains,
            settings: &settings,
            vocab: &vocab,
        };
        compare_rainfall(&ctx)
    }

    fn table(analysis: &Analysis) -> &ComparisonTable {
        match &analysis.payload {
            Payload::RainfallComparison(t) => t,
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_two_state_comparison() {
        let rains = vec![
            rain("Punjab", 2021, 600.0),
            rain("Punjab", 2022, 700.0),
            rain("Haryana", 2021, 500.0),
            rain("Haryana", 2022, 520.0),
            rain("Haryana", 2022, 480.0),
        ];
        let crops = vec![
            crop("Punjab", "", "Wheat", 2021, 100.0),
            crop("Punjab", "", "Rice", 2022, 150.0),
            crop("Punjab", "", "Maize", 2022, 10.0),
            crop("Haryana", "", "Wheat", 2022, 80.0),
        ];
        let entities = EntitySet {
            states: vec!["Punjab".to_string(), "Haryana".to_string()],
            last_n_years: Some(2),
            top_m: Some(2),
            ..EntitySet::default()
        };

        let analysis = run(entities, &crops, &rains);
        let t = table(&analysis);

        assert_eq!(t.states[0].mean_rainfall_mm, Some(650.0));
        // Haryana 2022 has two readings averaged first: (500 + 500) / 2.
        assert_eq!(t.states[1].mean_rainfall_mm, Some(500.0));
        let punjab_crops: Vec<_> = t.states[0].top_crops.iter().map(|c| c.crop.as_str()).collect();
        assert_eq!(punjab_crops, vec!["Rice", "Wheat"]);
        assert_eq!(t.states[1].top_crops.len(), 1);
        assert!(t.states[1].notes.iter().any(|n| n.contains("all are listed")));

        let citations = analysis.citations.into_vec();
        assert_eq!(citations.len(), 4);
        assert!(citations.iter().all(|c| c.dataset_id == CROP_ID || c.dataset_id == RAIN_ID));
        assert_eq!(analysis.data_points, 9);
    }

    #[test]
    fn test_fewer_years_than_requested() {
        let rains = vec![rain("Kerala", 2023, 3000.0)];
        let entities = EntitySet {
            states: vec!["Kerala".to_string()],
            last_n_years: Some(5),
            ..EntitySet::default()
        };

        let analysis = run(entities, &[], &rains);
        let t = table(&analysis);
        assert_eq!(t.states[0].years, vec![2023]);
        assert!(t.states[0].notes.iter().any(|n| n.contains("1 of 5")));

        let citations = analysis.citations.into_vec();
        let detail = citations[0].detail.as_deref().unwrap();
        assert!(detail.contains("only 1 available"));
    }

    #[test]
    fn test_no_states_is_not_an_error() {
        let analysis = run(EntitySet::default(), &[], &[]);
        assert!(table(&analysis).states.is_empty());
        assert!(analysis.citations.is_empty());
    }
}
