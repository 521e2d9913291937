//! Best-effort summary for questions no specialised analysis claimed.

use super::stats::{mean, rank_desc, select_years, sum_production_by, to_series, yearly_mean_rainfall, years_of};
use super::{Analysis, AnalysisContext};
use crate::citation::{coverage_detail, describe_years, CitationLog};
use crate::payload::{GeneralSummary, InsufficientInfo, Payload, ProductionSummary, RainfallSummary};
use crate::types::{EntityKind, NormalizedRow, Scope};

const SUGGESTIONS: [&str; 4] = [
    "Show Wheat production trends in Punjab over the last 5 years",
    "Compare rainfall between Maharashtra and Karnataka for the last 3 years",
    "Which districts in Telangana had the highest Cotton production?",
    "Give three arguments to promote drought-resistant crops in Karnataka",
];

pub(super) fn summarize(ctx: &AnalysisContext<'_>) -> Analysis {
    let entities = ctx.intent.entities();

    if !entities.has_subject() {
        let mut needed = vec![EntityKind::State, EntityKind::Crop];
        if entities.years.is_empty() && entities.last_n_years.is_none() {
            needed.push(EntityKind::Year);
        }
        let kinds: Vec<&str> = needed.iter().map(|k| k.as_str()).collect();
        let mut scope = Scope::default();
        scope.add_years(&entities.years);
        return Analysis {
            scope,
            data_points: 0,
            payload: Payload::General(GeneralSummary {
                production: Vec::new(),
                rainfall: Vec::new(),
                insufficient: Some(InsufficientInfo {
                    message: format!(
                        "The question does not name a state or a crop. Please mention at least one {}.",
                        kinds.join(", or a ")
                    ),
                    needed,
                    suggestions: SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
                }),
                notes: Vec::new(),
            }),
            citations: CitationLog::new(),
        };
    }

    let mut notes = Vec::new();
    let mut citations = CitationLog::new();
    let mut scope = Scope::default();
    let mut data_points = 0;

    let states = &entities.states;
    let crops = &entities.crops;
    for state in states {
        scope.add_state(state);
    }
    for crop in crops {
        scope.add_crop(crop);
    }
    let n = entities.last_n_years.unwrap_or(ctx.settings.general_window_years);
    if entities.years.is_empty() && entities.last_n_years.is_none() {
        notes.push(format!("No period given; summarising the {} most recent years with data.", n));
    }

    let in_states = |r: &&NormalizedRow| states.is_empty() || states.contains(&r.state);
    let in_crops = |r: &&NormalizedRow| crops.is_empty() || r.crop.as_ref().is_some_and(|c| crops.contains(c));

    let crop_rows: Vec<&NormalizedRow> = ctx
        .crop_rows
        .iter()
        .filter(in_states)
        .filter(in_crops)
        .filter(|r| r.production.is_some())
        .collect();
    let rain_rows: Vec<&NormalizedRow> = if states.is_empty() {
        Vec::new()
    } else {
        ctx.rainfall_rows.iter().filter(in_states).collect()
    };

    let mut available = years_of(crop_rows.iter().copied());
    available.extend(years_of(rain_rows.iter().copied()));
    let window = select_years(&available, &entities.years, n);
    scope.add_years(&window);

    let crop_window: Vec<&NormalizedRow> = crop_rows
        .into_iter()
        .filter(|r| window.contains(&r.year))
        .collect();

    // (state, crop) pairs to summarise; `None` widens to all.
    let targets: Vec<(Option<&String>, Option<&String>)> = match (states.is_empty(), crops.is_empty()) {
        (false, false) => states
            .iter()
            .flat_map(|s| crops.iter().map(move |c| (Some(s), Some(c))))
            .collect(),
        (false, true) => states.iter().map(|s| (Some(s), None)).collect(),
        (true, _) => crops.iter().map(|c| (None, Some(c))).collect(),
    };

    let mut production = Vec::new();
    for (state, crop) in targets {
        let rows: Vec<&NormalizedRow> = crop_window
            .iter()
            .copied()
            .filter(|r| state.map_or(true, |s| r.state == *s))
            .filter(|r| crop.map_or(true, |c| r.crop.as_ref() == Some(c)))
            .collect();

        let label = match (state, crop) {
            (Some(s), Some(c)) => format!("{} in {}", c, s),
            (Some(s), None) => format!("all crops in {}", s),
            (None, Some(c)) => format!("{} across all states", c),
            (None, None) => "all crops".to_string(),
        };

        if rows.is_empty() {
            notes.push(format!(
                "No production data for {} in {}.",
                label,
                describe_years(&window)
            ));
            continue;
        }

        let by_year = sum_production_by(rows.iter().copied(), |r| Some(r.year));
        let total: f64 = by_year.values().sum();
        let mean_annual = total / by_year.len() as f64;
        let years: Vec<i32> = by_year.keys().copied().collect();

        let top_state = if state.is_none() {
            rank_desc(sum_production_by(rows.iter().copied(), |r| Some(r.state.clone())))
                .into_iter()
                .next()
        } else {
            None
        };

        citations.cite(
            format!("Production of {}", label),
            rows.iter().copied(),
            Some(coverage_detail(
                "Production summed by year",
                &years,
                Some(window.len()),
                rows.len(),
            )),
        );

        if crop.is_none() {
            for row in &rows {
                if let Some(c) = &row.crop {
                    scope.add_crop(c);
                }
            }
        }
        data_points += rows.len();

        production.push(ProductionSummary {
            state: state.cloned(),
            crop: crop.cloned(),
            years,
            total,
            mean_annual,
            by_year: to_series(&by_year),
            top_state,
        });
    }

    let mut rainfall = Vec::new();
    for state in states {
        let rows: Vec<&NormalizedRow> = rain_rows
            .iter()
            .copied()
            .filter(|r| r.state == *state && window.contains(&r.year))
            .collect();
        let yearly = yearly_mean_rainfall(rows.iter().copied());
        let values: Vec<f64> = yearly.values().copied().collect();
        let Some(mean_mm) = mean(&values) else {
            notes.push(format!(
                "No rainfall data for {} in {}.",
                state,
                describe_years(&window)
            ));
            continue;
        };
        let years: Vec<i32> = yearly.keys().copied().collect();

        citations.cite(
            format!("Annual rainfall in {}", state),
            rows.iter().copied(),
            Some(coverage_detail(
                "Mean of yearly rainfall",
                &years,
                Some(window.len()),
                rows.len(),
            )),
        );
        data_points += rows.len();

        rainfall.push(RainfallSummary {
            state: state.clone(),
            years,
            mean_mm,
            by_year: to_series(&yearly),
        });
    }

    Analysis {
        scope,
        data_points,
        payload: Payload::General(GeneralSummary {
            production,
            rainfall,
            insufficient: None,
            notes,
        }),
        citations,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{crop, rain};
    use super::*;
    use crate::config::AnalysisSettings;
    use crate::types::{EntitySet, QueryIntent, QueryType};
    use crate::vocabulary::Vocabulary;

    fn run(entities: EntitySet, crops: &[NormalizedRow], rains: &[NormalizedRow]) -> Analysis {
        let intent = QueryIntent::new(QueryType::General, entities);
        let settings = AnalysisSettings::default();
        let vocab = Vocabulary::default();
        let ctx = AnalysisContext {
            intent: &intent,
            crop_rows: crops,
            rainfall_rows: rains,
            settings: &settings,
            vocab: &vocab,
        };
        summarize(&ctx)
    }

    fn summary(analysis: &Analysis) -> &GeneralSummary {
        match &analysis.payload {
            Payload::General(g) => g,
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_empty_entities_ask_for_more() {
        let analysis = run(EntitySet::default(), &[crop("Goa", "", "Rice", 2020, 1.0)], &[]);
        let g = summary(&analysis);
        let info = g.insufficient.as_ref().unwrap();
        assert_eq!(
            info.needed,
            vec![EntityKind::State, EntityKind::Crop, EntityKind::Year]
        );
        assert!(!info.suggestions.is_empty());
        assert!(analysis.citations.is_empty());
    }

    #[test]
    fn test_state_and_crop_summary() {
        let crops = vec![
            crop("Goa", "", "Rice", 2021, 10.0),
            crop("Goa", "", "Rice", 2022, 30.0),
            crop("Goa", "", "Cotton", 2022, 99.0),
        ];
        let rains = vec![rain("Goa", 2021, 3000.0), rain("Goa", 2022, 3200.0)];
        let entities = EntitySet {
            states: vec!["Goa".to_string()],
            crops: vec!["Rice".to_string()],
            ..EntitySet::default()
        };

        let analysis = run(entities, &crops, &rains);
        let g = summary(&analysis);
        assert_eq!(g.production.len(), 1);
        assert_eq!(g.production[0].total, 40.0);
        assert_eq!(g.production[0].mean_annual, 20.0);
        assert_eq!(g.rainfall[0].mean_mm, 3100.0);
        assert_eq!(analysis.citations.len(), 2);
    }

    #[test]
    fn test_crop_only_reports_top_state() {
        let crops = vec![
            crop("Punjab", "", "Wheat", 2022, 500.0),
            crop("Haryana", "", "Wheat", 2022, 300.0),
        ];
        let entities = EntitySet {
            crops: vec!["Wheat".to_string()],
            ..EntitySet::default()
        };
        let analysis = run(entities, &crops, &[]);
        let g = summary(&analysis);
        assert_eq!(g.production[0].top_state, Some(("Punjab".to_string(), 500.0)));
        assert!(g.rainfall.is_empty());
    }

    #[test]
    fn test_scope_names_entities_without_matching_rows() {
        let entities = EntitySet {
            states: vec!["Goa".to_string()],
            crops: vec!["Rice".to_string()],
            ..EntitySet::default()
        };
        let analysis = run(entities, &[crop("Punjab", "", "Wheat", 2022, 10.0)], &[]);
        assert_eq!(analysis.scope.states, vec!["Goa"]);
        assert_eq!(analysis.scope.crops, vec!["Rice"]);
        assert_eq!(analysis.data_points, 0);
    }

    #[test]
    fn test_unknown_state_yields_notes_not_errors() {
        let entities = EntitySet {
            states: vec!["Atlantis".to_string()],
            ..EntitySet::default()
        };
        let analysis = run(entities, &[crop("Goa", "", "Rice", 2020, 1.0)], &[]);
        let g = summary(&analysis);
        assert!(g.production.is_empty());
        assert!(g.notes.iter().any(|n| n.contains("Atlantis")));
    }
}
