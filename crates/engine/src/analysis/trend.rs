//! Production trend with rainfall alongside, and their correlation.

use super::stats::{mean, pearson, select_years, sum_production_by, to_series, yearly_mean_rainfall, years_of};
use super::{Analysis, AnalysisContext, ALL_STATES};
use crate::citation::{coverage_detail, describe_years, CitationLog};
use crate::config::AnalysisSettings;
use crate::payload::{Correlation, CorrelationLabel, Payload, RegionTrend, Trend, TrendDirection, TrendReport};
use crate::types::{NormalizedRow, Scope, YearValue};
use std::collections::BTreeMap;
use tracing::debug;

/// Direction and percent change between the first and last points.
///
/// The percent change is `None` ("undefined") when either endpoint is zero,
/// since a move to or from zero has no meaningful relative size.
pub fn trend_of(series: &[YearValue]) -> Option<Trend> {
    let first = *series.first()?;
    let last = *series.last()?;

    let direction = if last.value > first.value {
        TrendDirection::Increasing
    } else if last.value < first.value {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Flat
    };

    let percent_change = if first.value == 0.0 || last.value == 0.0 {
        None
    } else {
        Some((last.value - first.value) / first.value * 100.0)
    };

    Some(Trend {
        direction,
        first,
        last,
        percent_change,
    })
}

fn correlate(
    production: &BTreeMap<i32, f64>,
    rainfall: &BTreeMap<i32, f64>,
    settings: &AnalysisSettings,
) -> Correlation {
    let (xs, ys): (Vec<f64>, Vec<f64>) = production
        .iter()
        .filter_map(|(year, p)| rainfall.get(year).map(|r| (*p, *r)))
        .unzip();
    let overlap_years = xs.len();

    if overlap_years < settings.min_correlation_points {
        return Correlation {
            coefficient: None,
            overlap_years,
            label: CorrelationLabel::InsufficientOverlap,
        };
    }

    let coefficient = pearson(&xs, &ys);
    let label = match coefficient {
        Some(r) if r >= settings.correlation_threshold => CorrelationLabel::SameDirection,
        Some(r) if r <= -settings.correlation_threshold => CorrelationLabel::OppositeDirection,
        _ => CorrelationLabel::NoClearRelationship,
    };
    Correlation {
        coefficient,
        overlap_years,
        label,
    }
}

pub(super) fn analyze_trend(ctx: &AnalysisContext<'_>) -> Analysis {
    let entities = ctx.intent.entities();
    let regions = ctx.regions();
    let crop = entities.crops.first().cloned();
    let mut notes = Vec::new();
    let mut citations = CitationLog::new();
    let mut scope = Scope::default();

    let matches_crop = |r: &&NormalizedRow| crop.as_ref().map_or(true, |c| r.crop.as_ref() == Some(c));

    match &crop {
        Some(c) => {
            scope.add_crop(c);
            if entities.crops.len() > 1 {
                notes.push(format!("Several crops named; the trend covers {} only.", c));
            }
        }
        None => notes.push("No crop named; the trend covers total production of all crops.".to_string()),
    }
    if entities.states.is_empty() {
        notes.push("No state named; using national totals.".to_string());
    }

    // An explicit range covers every year between its ends.
    let window: Vec<i32> = match (entities.years.first(), entities.years.last()) {
        (Some(lo), Some(hi)) => (*lo..=*hi).collect(),
        _ => {
            let n = entities.last_n_years.unwrap_or(ctx.settings.trend_window_years);
            if entities.last_n_years.is_none() {
                notes.push(format!("No period given; using the {} most recent years with data.", n));
            }
            let available = years_of(
                regions
                    .iter()
                    .flat_map(|region| ctx.crop_in(region))
                    .filter(matches_crop),
            );
            select_years(&available, &[], n)
        }
    };
    scope.add_years(&window);

    let mut series = Vec::new();
    let mut data_points = 0;
    let crop_label = crop.clone().unwrap_or_else(|| "crop".to_string());

    for region in &regions {
        if region != ALL_STATES {
            scope.add_state(region);
        }

        let production_rows: Vec<&NormalizedRow> = ctx
            .crop_in(region)
            .into_iter()
            .filter(matches_crop)
            .filter(|r| window.contains(&r.year) && r.production.is_some())
            .collect();
        let rain_rows: Vec<&NormalizedRow> = ctx
            .rainfall_in(region)
            .into_iter()
            .filter(|r| window.contains(&r.year) && r.rainfall_mm.is_some())
            .collect();
        data_points += production_rows.len() + rain_rows.len();

        let production = sum_production_by(production_rows.iter().copied(), |r| Some(r.year));
        let rainfall = yearly_mean_rainfall(rain_rows.iter().copied());
        let production_by_year = to_series(&production);
        let rainfall_by_year = to_series(&rainfall);
        let trend = trend_of(&production_by_year);
        let rain_values: Vec<f64> = rainfall.values().copied().collect();
        let mean_rainfall_mm = mean(&rain_values);

        let production_years: Vec<i32> = production.keys().copied().collect();
        let rain_years: Vec<i32> = rainfall.keys().copied().collect();

        if trend.is_some() {
            citations.cite(
                format!("{} production trend in {}", crop_label, region),
                production_rows.iter().copied(),
                Some(coverage_detail(
                    "Production summed by year; first vs last year",
                    &production_years,
                    Some(window.len()),
                    production_rows.len(),
                )),
            );
        } else {
            notes.push(format!(
                "No {} production data for {} in {}.",
                crop_label,
                region,
                describe_years(&window)
            ));
        }

        if mean_rainfall_mm.is_some() {
            citations.cite(
                format!("Annual rainfall in {}", region),
                rain_rows.iter().copied(),
                Some(coverage_detail(
                    "Mean rainfall per year",
                    &rain_years,
                    Some(window.len()),
                    rain_rows.len(),
                )),
            );
        } else {
            notes.push(format!(
                "No rainfall data for {} in {}.",
                region,
                describe_years(&window)
            ));
        }

        let correlation = (trend.is_some() && mean_rainfall_mm.is_some()).then(|| {
            let correlation = correlate(&production, &rainfall, ctx.settings);
            if let Some(r) = correlation.coefficient {
                citations.cite(
                    format!("Production-rainfall correlation in {}", region),
                    production_rows.iter().chain(rain_rows.iter()).copied(),
                    Some(format!(
                        "Pearson r = {:.2} over {} overlapping years",
                        r, correlation.overlap_years
                    )),
                );
            }
            correlation
        });

        debug!(
            region = %region,
            production_years = production_years.len(),
            rain_years = rain_years.len(),
            "Computed trend"
        );

        series.push(RegionTrend {
            region: region.clone(),
            production_by_year,
            trend,
            rainfall_by_year,
            mean_rainfall_mm,
            correlation,
        });
    }

    Analysis {
        scope,
        data_points,
        payload: Payload::TrendAnalysis(TrendReport {
            crop,
            window,
            series,
            notes,
        }),
        citations,
    }
}
