//! Policy arguments for promoting one crop category over its complement.

use super::stats::{mean, rank_desc, select_years, sum_production_by, yearly_mean_rainfall, years_of};
use super::{Analysis, AnalysisContext, ALL_STATES};
use crate::citation::{coverage_detail, describe_years, CitationLog};
use crate::payload::{Argument, CropTotal, Payload, PolicyBrief};
use crate::types::{CropCategory, NormalizedRow, Scope};
use tracing::debug;

const MAX_ARGUMENTS: usize = 3;
const LOW_RAINFALL_MM: f64 = 750.0;
const HIGH_RAINFALL_MM: f64 = 1150.0;

fn rainfall_band(mm: f64) -> &'static str {
    if mm < LOW_RAINFALL_MM {
        "low"
    } else if mm > HIGH_RAINFALL_MM {
        "high"
    } else {
        "moderate"
    }
}

fn totals(rows: &[&NormalizedRow]) -> Vec<CropTotal> {
    rank_desc(sum_production_by(rows.iter().copied(), |r| r.crop.clone()))
        .into_iter()
        .map(|(crop, total_production)| CropTotal {
            crop,
            total_production,
        })
        .collect()
}

fn names(crops: &[CropTotal]) -> String {
    crops
        .iter()
        .map(|c| c.crop.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(super) fn support_policy(ctx: &AnalysisContext<'_>) -> Analysis {
    let entities = ctx.intent.entities();
    let mut notes = Vec::new();
    let mut citations = CitationLog::new();
    let mut scope = Scope::default();

    let category = match entities.crop_category {
        Some(category) => category,
        None => {
            notes.push("No crop category named; arguing for drought-resistant crops.".to_string());
            CropCategory::DroughtResistant
        }
    };
    let complement = category.complement();

    let region = ctx
        .regions()
        .into_iter()
        .next()
        .unwrap_or_else(|| ALL_STATES.to_string());
    if entities.states.is_empty() {
        notes.push("No state named; the brief uses national data.".to_string());
    } else {
        scope.add_state(&region);
        if entities.states.len() > 1 {
            notes.push(format!("Several states named; the brief covers {} only.", region));
        }
    }

    let crop_rows = ctx.crop_in(&region);
    let rain_rows = ctx.rainfall_in(&region);

    let n = entities.last_n_years.unwrap_or(ctx.settings.default_last_n_years);
    if entities.years.is_empty() && entities.last_n_years.is_none() {
        notes.push(format!("No period given; using the {} most recent years with data.", n));
    }
    let mut available = years_of(crop_rows.iter().copied());
    available.extend(years_of(rain_rows.iter().copied()));
    let window = select_years(&available, &entities.years, n);
    scope.add_years(&window);

    let rain_window: Vec<&NormalizedRow> = rain_rows
        .into_iter()
        .filter(|r| window.contains(&r.year))
        .collect();
    let crop_window: Vec<&NormalizedRow> = crop_rows
        .into_iter()
        .filter(|r| window.contains(&r.year) && r.production.is_some())
        .collect();

    let (in_rows, complement_rows): (Vec<&NormalizedRow>, Vec<&NormalizedRow>) = crop_window
        .iter()
        .copied()
        .filter(|r| {
            r.crop
                .as_deref()
                .and_then(|c| ctx.vocab.category_of(c))
                .is_some()
        })
        .partition(|r| {
            r.crop.as_deref().and_then(|c| ctx.vocab.category_of(c)) == Some(category)
        });

    let in_category_crops = totals(&in_rows);
    let complement_crops = totals(&complement_rows);
    for crop in &in_category_crops {
        scope.add_crop(&crop.crop);
    }

    let mut arguments = Vec::new();

    // Climate: how much rain the region actually gets.
    let yearly = yearly_mean_rainfall(rain_window.iter().copied());
    let yearly_values: Vec<f64> = yearly.values().copied().collect();
    if let Some(avg) = mean(&yearly_values) {
        let driest = yearly
            .iter()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(y, v)| (*y, *v));
        let wettest = yearly
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(y, v)| (*y, *v));
        let rain_years: Vec<i32> = yearly.keys().copied().collect();
        let band = rainfall_band(avg);

        let statement = match category {
            CropCategory::DroughtResistant => format!(
                "{} receives {} rainfall, averaging {:.1} mm a year. Crops that tolerate \
                 deficit years reduce exposure to the variability shown below.",
                region, band, avg
            ),
            CropCategory::WaterIntensive => format!(
                "{} receives {} rainfall, averaging {:.1} mm a year, which determines \
                 whether water-intensive crops can be sustained without heavy irrigation.",
                region, band, avg
            ),
        };
        let mut evidence = vec![format!("Mean annual rainfall: {:.1} mm", avg)];
        if let (Some((dy, dv)), Some((wy, wv))) = (driest, wettest) {
            evidence.push(format!("Driest year: {} ({:.1} mm)", dy, dv));
            evidence.push(format!("Wettest year: {} ({:.1} mm)", wy, wv));
        }

        let cited = citations.cite(
            format!("Rainfall profile of {}", region),
            rain_window.iter().copied(),
            Some(coverage_detail(
                "Mean of yearly rainfall",
                &rain_years,
                Some(window.len()),
                rain_window.len(),
            )),
        );
        arguments.push(Argument {
            rank: 0,
            title: "Rainfall profile".to_string(),
            statement,
            evidence,
            citations: cited,
        });
    } else {
        notes.push(format!(
            "No rainfall data for {} in {}; the climate argument is omitted.",
            region,
            describe_years(&window)
        ));
    }

    // Production: the category already has a footprint to build on.
    if in_category_crops.is_empty() {
        notes.push(format!(
            "No {} crops appear in the production data for {} in {}; the production argument is omitted.",
            category.label(),
            region,
            describe_years(&window)
        ));
    } else {
        let total: f64 = in_category_crops.iter().map(|c| c.total_production).sum();
        let years_with_data = years_of(in_rows.iter().copied()).len().max(1);
        let evidence = in_category_crops
            .iter()
            .map(|c| format!("{}: {:.2} tonnes", c.crop, c.total_production))
            .collect();
        let cited = citations.cite(
            format!("Production of {} crops in {}", category.label(), region),
            in_rows.iter().copied(),
            Some(format!(
                "Production summed over {} for {}",
                describe_years(&window),
                names(&in_category_crops)
            )),
        );
        arguments.push(Argument {
            rank: 0,
            title: format!("Existing {} production", category.label()),
            statement: format!(
                "{} already produces {:.2} tonnes of {} crops ({:.2} tonnes a year on average), \
                 so support can scale an established base.",
                region,
                total,
                category.label(),
                total / years_with_data as f64
            ),
            evidence,
            citations: cited,
        });
    }

    // Share: how the category weighs against its complement.
    if !in_category_crops.is_empty() && !complement_crops.is_empty() {
        let in_total: f64 = in_category_crops.iter().map(|c| c.total_production).sum();
        let other_total: f64 = complement_crops.iter().map(|c| c.total_production).sum();
        let combined = in_total + other_total;
        if combined > 0.0 {
            let share = in_total / combined * 100.0;
            let cited = citations.cite(
                format!("{} share of categorised production in {}", category.label(), region),
                in_rows.iter().chain(complement_rows.iter()).copied(),
                Some(format!(
                    "{} vs {} production over {}",
                    category.label(),
                    complement.label(),
                    describe_years(&window)
                )),
            );
            arguments.push(Argument {
                rank: 0,
                title: format!("Balance against {} crops", complement.label()),
                statement: format!(
                    "{} crops make up {:.1}% of categorised production in {}, against {:.1}% for {} crops.",
                    category.label(),
                    share,
                    region,
                    100.0 - share,
                    complement.label()
                ),
                evidence: vec![
                    format!("{}: {:.2} tonnes ({})", category.label(), in_total, names(&in_category_crops)),
                    format!("{}: {:.2} tonnes ({})", complement.label(), other_total, names(&complement_crops)),
                ],
                citations: cited,
            });
        } else {
            notes.push("Categorised production totals are zero; the share argument is omitted.".to_string());
        }
    } else if !in_category_crops.is_empty() {
        notes.push(format!(
            "No {} crops in the data to compare against; the share argument is omitted.",
            complement.label()
        ));
    }

    arguments.truncate(MAX_ARGUMENTS);
    for (i, argument) in arguments.iter_mut().enumerate() {
        argument.rank = i + 1;
    }
    if arguments.len() < MAX_ARGUMENTS {
        notes.push(format!(
            "Only {} of {} arguments could be supported by the available data.",
            arguments.len(),
            MAX_ARGUMENTS
        ));
    }

    debug!(region = %region, category = %category, arguments = arguments.len(), "Built policy brief");

    Analysis {
        scope,
        data_points: rain_window.len() + crop_window.len(),
        payload: Payload::PolicySupport(PolicyBrief {
            region,
            category,
            complement,
            window,
            arguments,
            in_category_crops,
            complement_crops,
            notes,
        }),
        citations,
    }
}
