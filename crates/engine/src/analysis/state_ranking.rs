//! States ranked by total production of one crop.

use super::stats::{rank_desc, select_years, sum_production_by, years_of};
use super::{Analysis, AnalysisContext};
use crate::citation::{coverage_detail, describe_years, CitationLog};
use crate::payload::{Payload, StateRanking, StateTotal};
use crate::types::{NormalizedRow, RankingFocus, Scope};
use tracing::debug;

pub(super) fn rank_states(ctx: &AnalysisContext<'_>) -> Analysis {
    let entities = ctx.intent.entities();
    let focus = entities.ranking_focus.unwrap_or_default();
    let top_n = entities.top_m.unwrap_or(ctx.settings.state_ranking_top_n);
    let mut notes = Vec::new();
    let mut citations = CitationLog::new();
    let mut scope = Scope::default();
    for state in &entities.states {
        scope.add_state(state);
    }

    let in_scope: Vec<&NormalizedRow> = ctx
        .crop_rows
        .iter()
        .filter(|r| r.production.is_some())
        .filter(|r| entities.states.is_empty() || entities.states.contains(&r.state))
        .collect();

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

    let empty = |scope: Scope, notes: Vec<String>, crop: Option<String>, years: Vec<i32>| Analysis {
        scope,
        data_points: 0,
        payload: Payload::StateRanking(StateRanking {
            crop,
            focus,
            years,
            states: Vec::new(),
            states_ranked: 0,
            notes,
        }),
        citations: CitationLog::new(),
    };

    let Some(crop) = crop else {
        notes.push("No crop production records are available to rank.".to_string());
        return empty(scope, notes, None, Vec::new());
    };
    scope.add_crop(&crop);

    let crop_rows: Vec<&NormalizedRow> = in_scope
        .into_iter()
        .filter(|r| r.crop.as_deref() == Some(crop.as_str()))
        .collect();

    let n = entities.last_n_years.unwrap_or(ctx.settings.default_last_n_years);
    if entities.years.is_empty() && entities.last_n_years.is_none() {
        notes.push(format!("No period given; ranking over the {} most recent years with data.", n));
    }
    let years = select_years(&years_of(crop_rows.iter().copied()), &entities.years, n);
    scope.add_years(&years);

    let rows: Vec<&NormalizedRow> = crop_rows
        .into_iter()
        .filter(|r| years.contains(&r.year))
        .collect();
    if rows.is_empty() {
        notes.push(format!(
            "No {} production records for {}.",
            crop,
            if years.is_empty() {
                "any year".to_string()
            } else {
                describe_years(&years)
            }
        ));
        return empty(scope, notes, Some(crop), years);
    }

    let mut ranked = rank_desc(sum_production_by(rows.iter().copied(), |r| Some(r.state.clone())));
    if focus == RankingFocus::Lowest {
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    }
    let states_ranked = ranked.len();
    if states_ranked < top_n {
        notes.push(format!(
            "Only {} state{} report {} production; {} were requested.",
            states_ranked,
            if states_ranked == 1 { "" } else { "s" },
            crop,
            top_n
        ));
    }

    let states: Vec<StateTotal> = ranked
        .into_iter()
        .take(top_n)
        .map(|(state, production)| StateTotal { state, production })
        .collect();
    if entities.states.is_empty() {
        for s in &states {
            scope.add_state(&s.state);
        }
    }

    citations.cite(
        format!("State-wise {} production", crop),
        rows.iter().copied(),
        Some(coverage_detail(
            "Production summed by state",
            &years_of(rows.iter().copied()).into_iter().collect::<Vec<_>>(),
            Some(years.len()),
            rows.len(),
        )),
    );
    debug!(crop = %crop, focus = %focus, states = states_ranked, "Ranked states");

    Analysis {
        scope,
        data_points: rows.len(),
        payload: Payload::StateRanking(StateRanking {
            crop: Some(crop),
            focus,
            years,
            states,
            states_ranked,
            notes,
        }),
        citations,
    }
}
