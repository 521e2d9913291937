//! Highest and lowest producing districts for a crop.

use super::stats::{rank_desc, sum_production_by};
use super::{Analysis, AnalysisContext, ALL_STATES};
use crate::citation::{describe_years, CitationLog};
use crate::payload::{DistrictRanking, DistrictTotal, Payload, StateDistricts};
use crate::types::{NormalizedRow, Scope};
use std::collections::BTreeMap;
use tracing::debug;

pub(super) fn rank_districts(ctx: &AnalysisContext<'_>) -> Analysis {
    let entities = ctx.intent.entities();
    let regions = ctx.regions();
    let mut notes = Vec::new();
    let mut citations = CitationLog::new();
    let mut scope = Scope::default();

    let in_scope: Vec<&NormalizedRow> = regions
        .iter()
        .flat_map(|region| ctx.crop_in(region))
        .filter(|r| r.district.is_some() && r.production.is_some())
        .collect();

    if entities.states.is_empty() {
        notes.push("No state named; ranking districts across all states.".to_string());
    }

    let crop = match entities.crops.first() {
        Some(crop) => Some(crop.clone()),
        None => {
            let largest = rank_desc(sum_production_by(in_scope.iter().copied(), |r| r.crop.clone()))
                .into_iter()
                .next()
                .map(|(crop, _)| crop);
            if let Some(crop) = &largest {
                notes.push(format!(
                    "No crop named; using {}, the largest crop by production in scope.",
                    crop
                ));
            }
            largest
        }
    };

    let Some(crop) = crop else {
        notes.push("No crop production records with district detail are available.".to_string());
        return Analysis {
            scope,
            data_points: 0,
            payload: Payload::DistrictRanking(DistrictRanking {
                crop: None,
                years: Vec::new(),
                groups: Vec::new(),
                overall_highest: None,
                overall_lowest: None,
                notes,
            }),
            citations,
        };
    };
    scope.add_crop(&crop);

    let crop_rows: Vec<&NormalizedRow> = in_scope
        .into_iter()
        .filter(|r| r.crop.as_deref() == Some(crop.as_str()))
        .collect();

    // Most recent year present in the filtered data, never the wall clock.
    let years: Vec<i32> = if entities.years.is_empty() {
        match crop_rows.iter().map(|r| r.year).max() {
            Some(latest) => {
                notes.push(format!("No year given; using {}, the most recent year with data.", latest));
                vec![latest]
            }
            None => Vec::new(),
        }
    } else {
        entities.years.clone()
    };
    scope.add_years(&years);

    let mut groups = Vec::new();
    let mut data_points = 0;

    for region in &regions {
        if region != ALL_STATES {
            scope.add_state(region);
        }

        let rows: Vec<&NormalizedRow> = crop_rows
            .iter()
            .copied()
            .filter(|r| (region == ALL_STATES || r.state == *region) && years.contains(&r.year))
            .collect();
        data_points += rows.len();

        // Keyed by (district, state) so iteration order is alphabetical by district.
        let totals: BTreeMap<(String, String), f64> = sum_production_by(rows.iter().copied(), |r| {
            r.district.clone().map(|d| (d, r.state.clone()))
        });

        let mut highest: Option<DistrictTotal> = None;
        let mut lowest: Option<DistrictTotal> = None;
        for ((district, state), production) in &totals {
            let entry = DistrictTotal {
                state: state.clone(),
                district: district.clone(),
                production: *production,
            };
            if highest.as_ref().map_or(true, |h| *production > h.production) {
                highest = Some(entry.clone());
            }
            if lowest.as_ref().map_or(true, |l| *production < l.production) {
                lowest = Some(entry);
            }
        }

        let mut districts: Vec<DistrictTotal> = totals
            .into_iter()
            .map(|((district, state), production)| DistrictTotal {
                state,
                district,
                production,
            })
            .collect();
        districts.sort_by(|a, b| b.production.total_cmp(&a.production));

        let note = if districts.is_empty() {
            Some(format!(
                "No {} production records with district detail for {} in {}.",
                crop,
                region,
                describe_years(&years)
            ))
        } else {
            citations.cite(
                format!("District-wise {} production in {}", crop, region),
                rows.iter().copied(),
                Some(format!(
                    "Production summed by district for {} ({} districts, {} records)",
                    describe_years(&years),
                    districts.len(),
                    rows.len()
                )),
            );
            None
        };

        debug!(region = %region, districts = districts.len(), "Ranked districts");

        groups.push(StateDistricts {
            region: region.clone(),
            highest,
            lowest,
            districts,
            note,
        });
    }

    let overall_highest = pick(&groups, |g| g.highest.as_ref(), |a, b| a > b);
    let overall_lowest = pick(&groups, |g| g.lowest.as_ref(), |a, b| a < b);

    Analysis {
        scope,
        data_points,
        payload: Payload::DistrictRanking(DistrictRanking {
            crop: Some(crop),
            years,
            groups,
            overall_highest,
            overall_lowest,
            notes,
        }),
        citations,
    }
}

/// First extreme across groups; later groups win only on a strict improvement.
fn pick<F, C>(groups: &[StateDistricts], field: F, better: C) -> Option<DistrictTotal>
where
    F: Fn(&StateDistricts) -> Option<&DistrictTotal>,
    C: Fn(f64, f64) -> bool,
{
    let mut best: Option<&DistrictTotal> = None;
    for candidate in groups.iter().filter_map(|g| field(g)) {
        if best.map_or(true, |b| better(candidate.production, b.production)) {
            best = Some(candidate);
        }
    }
    best.cloned()
}

#[cfg(test)]
mod tests {
    use super::super::testing::{crop, CROP_ID};
    use super::*;
    use crate::config::AnalysisSettings;
    use crate::types::{EntitySet, QueryIntent, QueryType};
    use crate::vocabulary::Vocabulary;

    fn run(entities: EntitySet, rows: &[NormalizedRow]) -> Analysis {
        let intent = QueryIntent::new(QueryType::DistrictRanking, entities);
        let settings = AnalysisSettings::default();
        let vocab = Vocabulary::default();
        let ctx = AnalysisContext {
            intent: &intent,
            crop_rows: rows,
            rainfall_rows: &[],
            settings: &settings,
            vocab: &vocab,
        };
        rank_districts(&ctx)
    }

    fn ranking(analysis: &Analysis) -> &DistrictRanking {
        match &analysis.payload {
            Payload::DistrictRanking(r) => r,
            other => panic!("unexpected payload {:?}", other),
        }
    }

    fn punjab_rice() -> EntitySet {
        EntitySet {
            states: vec!["Punjab".to_string()],
            crops: vec!["Rice".to_string()],
            ..EntitySet::default()
        }
    }

    #[test]
    fn test_most_recent_year_is_selected() {
        let rows = vec![
            crop("Punjab", "Amritsar", "Rice", 2023, 500.0),
            crop("Punjab", "Ludhiana", "Rice", 2023, 900.0),
            crop("Punjab", "Patiala", "Rice", 2020, 5000.0),
        ];
        let analysis = run(punjab_rice(), &rows);
        let r = ranking(&analysis);

        assert_eq!(r.years, vec![2023]);
        let group = &r.groups[0];
        assert_eq!(group.highest.as_ref().unwrap().district, "Ludhiana");
        assert_eq!(group.lowest.as_ref().unwrap().district, "Amritsar");
        assert_eq!(analysis.citations.len(), 1);
        assert_eq!(analysis.citations.into_vec()[0].dataset_id, CROP_ID);
    }

    #[test]
    fn test_ties_go_to_first_sorted_district() {
        let rows = vec![
            crop("Punjab", "Sangrur", "Rice", 2022, 100.0),
            crop("Punjab", "Bathinda", "Rice", 2022, 100.0),
        ];
        let analysis = run(punjab_rice(), &rows);
        let group = &ranking(&analysis).groups[0];
        assert_eq!(group.highest.as_ref().unwrap().district, "Bathinda");
        assert_eq!(group.lowest.as_ref().unwrap().district, "Bathinda");
    }

    #[test]
    fn test_two_states_and_overall_extremes() {
        let rows = vec![
            crop("Punjab", "Ludhiana", "Rice", 2023, 900.0),
            crop("Punjab", "Amritsar", "Rice", 2023, 500.0),
            crop("Haryana", "Karnal", "Rice", 2023, 700.0),
            crop("Haryana", "Sirsa", "Rice", 2023, 50.0),
        ];
        let entities = EntitySet {
            states: vec!["Punjab".to_string(), "Haryana".to_string()],
            crops: vec!["Rice".to_string()],
            ..EntitySet::default()
        };
        let analysis = run(entities, &rows);
        let r = ranking(&analysis);

        assert_eq!(r.groups.len(), 2);
        assert_eq!(r.groups[1].lowest.as_ref().unwrap().district, "Sirsa");
        assert_eq!(r.overall_highest.as_ref().unwrap().district, "Ludhiana");
        assert_eq!(r.overall_lowest.as_ref().unwrap().district, "Sirsa");
    }

    #[test]
    fn test_missing_crop_defaults_to_largest() {
        let rows = vec![
            crop("Punjab", "Ludhiana", "Wheat", 2023, 900.0),
            crop("Punjab", "Ludhiana", "Rice", 2023, 100.0),
        ];
        let entities = EntitySet {
            states: vec!["Punjab".to_string()],
            ..EntitySet::default()
        };
        let analysis = run(entities, &rows);
        let r = ranking(&analysis);
        assert_eq!(r.crop.as_deref(), Some("Wheat"));
        assert!(r.notes.iter().any(|n| n.contains("No crop named")));
    }

    #[test]
    fn test_empty_data_is_reported() {
        let analysis = run(punjab_rice(), &[]);
        let r = ranking(&analysis);
        assert!(r.groups[0].highest.is_none());
        assert!(r.groups[0].note.is_some());
        assert!(analysis.citations.is_empty());
    }
}
