//! Response formatting.
//!
//! Renders a [`ResultBundle`] as Markdown. Section order is fixed: title,
//! resolved scope, data point count, the analysis itself, notes, and finally
//! the numbered source list. The formatter only renders citations already in
//! the bundle.

use crate::citation::describe_years;
use crate::payload::{
    ComparisonTable, DistrictRanking, DistrictTotal, GeneralSummary, Payload, PolicyBrief, ResultBundle,
    StateRanking, Trend, TrendReport,
};
use crate::types::{QueryType, RankingFocus, Scope};

/// Format a quantity with thousands separators and two decimals.
pub fn format_quantity(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Signed percent with two decimals, or "undefined".
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(p) => format!("{:+.2}%", p),
        None => "undefined".to_string(),
    }
}

fn title(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::RainfallComparison => "Rainfall and Crop Production Comparison",
        QueryType::DistrictRanking => "District Production Ranking",
        QueryType::StateRanking => "State Production Ranking",
        QueryType::TrendAnalysis => "Production Trend Analysis",
        QueryType::PolicySupport => "Policy Support Brief",
        QueryType::General => "Agricultural Data Summary",
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn years_or(years: &[i32], fallback: &str) -> String {
    if years.is_empty() {
        fallback.to_string()
    } else {
        describe_years(years)
    }
}

fn list_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

/// `unrecognised` questions name nothing, so an empty list is not "all".
fn write_scope(out: &mut String, scope: &Scope, unrecognised: bool) {
    let widest = if unrecognised { "none recognised" } else { "all" };
    out.push_str(&format!(
        "**Question scope:** states: {}; crops: {}; years: {}\n",
        list_or(&scope.states, widest),
        list_or(&scope.crops, widest),
        years_or(&scope.years, "none resolved")
    ));
}

fn write_comparison(out: &mut String, table: &ComparisonTable) {
    out.push_str(&format!(
        "Comparison over up to {} year{} per state, listing the top {} crop{}.\n\n",
        table.years_requested,
        plural(table.years_requested),
        table.top_m,
        plural(table.top_m)
    ));

    if table.states.is_empty() {
        out.push_str("No states could be compared.\n\n");
        return;
    }

    out.push_str("| State | Years | Mean annual rainfall (mm) |\n|---|---|---|\n");
    for state in &table.states {
        let rainfall = state
            .mean_rainfall_mm
            .map(format_quantity)
            .unwrap_or_else(|| "not available".to_string());
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            state.state,
            describe_years(&state.years),
            rainfall
        ));
    }
    out.push('\n');

    for state in &table.states {
        out.push_str(&format!("### {}\n", state.state));
        if state.top_crops.is_empty() {
            out.push_str("No crop production recorded in this period.\n");
        }
        for (i, crop) in state.top_crops.iter().enumerate() {
            out.push_str(&format!(
                "{}. {}: {} tonnes\n",
                i + 1,
                crop.crop,
                format_quantity(crop.total_production)
            ));
        }
        for note in &state.notes {
            out.push_str(&format!("- _{}_\n", note));
        }
        out.push('\n');
    }
}

fn district_line(label: &str, total: Option<&DistrictTotal>) -> String {
    match total {
        Some(d) => format!(
            "- {}: **{}** ({}) with {} tonnes\n",
            label,
            d.district,
            d.state,
            format_quantity(d.production)
        ),
        None => format!("- {}: not available\n", label),
    }
}

fn write_ranking(out: &mut String, ranking: &DistrictRanking) {
    out.push_str(&format!(
        "District-wise {} production for {}.\n\n",
        ranking.crop.as_deref().unwrap_or("the requested crop"),
        years_or(&ranking.years, "no available year")
    ));

    for group in &ranking.groups {
        out.push_str(&format!("### {}\n", group.region));
        out.push_str(&district_line("Highest", group.highest.as_ref()));
        out.push_str(&district_line("Lowest", group.lowest.as_ref()));
        if group.districts.len() > 2 {
            out.push_str(&format!("- Districts ranked: {}\n", group.districts.len()));
        }
        if let Some(note) = &group.note {
            out.push_str(&format!("- _{}_\n", note));
        }
        out.push('\n');
    }

    if ranking.groups.len() > 1 {
        out.push_str("### Across all regions\n");
        out.push_str(&district_line("Highest", ranking.overall_highest.as_ref()));
        out.push_str(&district_line("Lowest", ranking.overall_lowest.as_ref()));
        out.push('\n');
    }
}

fn write_state_ranking(out: &mut String, ranking: &StateRanking) {
    let order = match ranking.focus {
        RankingFocus::Highest => "highest first",
        RankingFocus::Lowest => "lowest first",
    };
    out.push_str(&format!(
        "State-wise {} production for {}, {}.\n\n",
        ranking.crop.as_deref().unwrap_or("the requested crop"),
        years_or(&ranking.years, "no available years"),
        order
    ));

    if ranking.states.is_empty() {
        out.push_str("No states could be ranked.\n\n");
        return;
    }

    for (i, state) in ranking.states.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}: {} tonnes\n",
            i + 1,
            state.state,
            format_quantity(state.production)
        ));
    }
    if ranking.states_ranked > ranking.states.len() {
        out.push_str(&format!(
            "\nShowing {} of {} states with data.\n",
            ranking.states.len(),
            ranking.states_ranked
        ));
    }
    out.push('\n');
}

fn trend_line(trend: &Trend) -> String {
    format!(
        "{} from {} tonnes in {} to {} tonnes in {} (change: {})",
        trend.direction.as_str(),
        format_quantity(trend.first.value),
        trend.first.year,
        format_quantity(trend.last.value),
        trend.last.year,
        format_percent(trend.percent_change)
    )
}

fn write_trend(out: &mut String, report: &TrendReport) {
    out.push_str(&format!(
        "{} production over {}.\n\n",
        report.crop.as_deref().unwrap_or("Total crop"),
        years_or(&report.window, "no available years")
    ));

    for region in &report.series {
        out.push_str(&format!("### {}\n", region.region));
        match &region.trend {
            Some(trend) => out.push_str(&format!("- Trend: {}\n", trend_line(trend))),
            None => out.push_str("- Trend: not available\n"),
        }
        if let Some(mm) = region.mean_rainfall_mm {
            out.push_str(&format!("- Mean annual rainfall: {} mm\n", format_quantity(mm)));
        }
        if let Some(correlation) = &region.correlation {
            match correlation.coefficient {
                Some(r) => out.push_str(&format!(
                    "- Rainfall relationship: {} (Pearson r = {:.2}, {} years)\n",
                    correlation.label.describe(),
                    r,
                    correlation.overlap_years
                )),
                None => out.push_str(&format!(
                    "- Rainfall relationship: {} ({} overlapping years)\n",
                    correlation.label.describe(),
                    correlation.overlap_years
                )),
            }
        }

        if !region.production_by_year.is_empty() {
            out.push_str("\n| Year | Production (tonnes) | Rainfall (mm) |\n|---|---|---|\n");
            for point in &region.production_by_year {
                let rain = region
                    .rainfall_by_year
                    .iter()
                    .find(|r| r.year == point.year)
                    .map(|r| format_quantity(r.value))
                    .unwrap_or_else(|| "n/a".to_string());
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    point.year,
                    format_quantity(point.value),
                    rain
                ));
            }
        }
        out.push('\n');
    }
}

fn write_policy(out: &mut String, brief: &PolicyBrief) {
    out.push_str(&format!(
        "Arguments for promoting {} crops over {} crops in {} ({}).\n\n",
        brief.category,
        brief.complement,
        brief.region,
        years_or(&brief.window, "no available years")
    ));

    if brief.arguments.is_empty() {
        out.push_str("The available data does not support any argument.\n\n");
    }
    for argument in &brief.arguments {
        let refs: String = argument.citations.iter().map(|c| format!("[{}]", c)).collect();
        out.push_str(&format!("### {}. {} {}\n", argument.rank, argument.title, refs));
        out.push_str(&format!("{}\n", argument.statement));
        for line in &argument.evidence {
            out.push_str(&format!("- {}\n", line));
        }
        out.push('\n');
    }
}

fn write_general(out: &mut String, summary: &GeneralSummary) {
    if let Some(info) = &summary.insufficient {
        let needed: Vec<&str> = info.needed.iter().map(|k| k.as_str()).collect();
        out.push_str(&format!("{}\n\n", info.message));
        out.push_str(&format!("Needed: {}\n\n", needed.join(", ")));
        out.push_str("Try asking:\n");
        for suggestion in &info.suggestions {
            out.push_str(&format!("- {}\n", suggestion));
        }
        out.push('\n');
        return;
    }

    if summary.production.is_empty() && summary.rainfall.is_empty() {
        out.push_str("No matching production or rainfall records were found.\n\n");
        return;
    }

    for p in &summary.production {
        let heading = match (&p.state, &p.crop) {
            (Some(s), Some(c)) => format!("{} in {}", c, s),
            (Some(s), None) => format!("All crops in {}", s),
            (None, Some(c)) => format!("{} across all states", c),
            (None, None) => "All crops".to_string(),
        };
        out.push_str(&format!("### {}\n", heading));
        out.push_str(&format!(
            "- Total production ({}): {} tonnes\n",
            describe_years(&p.years),
            format_quantity(p.total)
        ));
        out.push_str(&format!(
            "- Mean annual production: {} tonnes\n",
            format_quantity(p.mean_annual)
        ));
        if let Some((state, total)) = &p.top_state {
            out.push_str(&format!(
                "- Largest producer: {} ({} tonnes)\n",
                state,
                format_quantity(*total)
            ));
        }
        for point in &p.by_year {
            out.push_str(&format!("  - {}: {} tonnes\n", point.year, format_quantity(point.value)));
        }
        out.push('\n');
    }

    for r in &summary.rainfall {
        out.push_str(&format!("### Rainfall in {}\n", r.state));
        out.push_str(&format!(
            "- Mean annual rainfall ({}): {} mm\n",
            describe_years(&r.years),
            format_quantity(r.mean_mm)
        ));
        for point in &r.by_year {
            out.push_str(&format!("  - {}: {} mm\n", point.year, format_quantity(point.value)));
        }
        out.push('\n');
    }
}

/// Render a bundle as Markdown text.
pub fn format_response(bundle: &ResultBundle) -> String {
    let mut out = String::new();
    out.push_str(&format!("## {}\n\n", title(bundle.query_type)));

    let unrecognised = matches!(&bundle.payload, Payload::General(g) if g.insufficient.is_some());
    write_scope(&mut out, &bundle.scope, unrecognised);
    out.push_str(&format!(
        "**Data points analysed:** {} normalized record{}\n\n",
        bundle.data_points,
        plural(bundle.data_points)
    ));

    match &bundle.payload {
        Payload::RainfallComparison(table) => write_comparison(&mut out, table),
        Payload::DistrictRanking(ranking) => write_ranking(&mut out, ranking),
        Payload::StateRanking(ranking) => write_state_ranking(&mut out, ranking),
        Payload::TrendAnalysis(report) => write_trend(&mut out, report),
        Payload::PolicySupport(brief) => write_policy(&mut out, brief),
        Payload::General(summary) => write_general(&mut out, summary),
    }

    let notes = bundle.payload.notes();
    if !notes.is_empty() {
        out.push_str("**Notes:**\n");
        for note in notes {
            out.push_str(&format!("- {}\n", note));
        }
        out.push('\n');
    }

    out.push_str("---\n### Sources\n");
    if bundle.citations.is_empty() {
        out.push_str("No data sources were used; no figures are reported above.\n");
    }
    for (i, citation) in bundle.citations.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}: {} (dataset ID: `{}`)",
            i + 1,
            citation.claim,
            citation.source_label,
            citation.dataset_id
        ));
        if let Some(detail) = &citation.detail {
            out.push_str(&format!(". {}", detail));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{GeneralSummary, InsufficientInfo, StateTotal};
    use crate::types::{Citation, EntityKind};

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(0.0), "0.00");
        assert_eq!(format_quantity(999.5), "999.50");
        assert_eq!(format_quantity(1234567.891), "1,234,567.89");
        assert_eq!(format_quantity(-1500.0), "-1,500.00");
        assert_eq!(format_quantity(-0.001), "0.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(50.0)), "+50.00%");
        assert_eq!(format_percent(Some(-12.5)), "-12.50%");
        assert_eq!(format_percent(None), "undefined");
    }

    #[test]
    fn test_sections_in_order() {
        let bundle = ResultBundle {
            query_type: QueryType::General,
            scope: Scope {
                states: vec!["Goa".to_string()],
                crops: Vec::new(),
                years: vec![2021, 2022],
            },
            data_points: 2,
            payload: Payload::General(GeneralSummary {
                production: Vec::new(),
                rainfall: Vec::new(),
                insufficient: None,
                notes: vec!["A note.".to_string()],
            }),
            citations: vec![Citation {
                claim: "Annual rainfall in Goa".to_string(),
                source_label: "IMD".to_string(),
                dataset_id: "rain-1".to_string(),
                detail: Some("2021-2022".to_string()),
            }],
        };

        let text = format_response(&bundle);
        let positions: Vec<usize> = [
            "## Agricultural Data Summary",
            "**Question scope:** states: Goa; crops: all; years: 2021-2022",
            "**Data points analysed:** 2 normalized records",
            "**Notes:**",
            "### Sources",
            "1. Annual rainfall in Goa: IMD (dataset ID: `rain-1`). 2021-2022",
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_insufficient_payload_is_explained() {
        let bundle = ResultBundle {
            query_type: QueryType::General,
            scope: Scope::default(),
            data_points: 0,
            payload: Payload::General(GeneralSummary {
                production: Vec::new(),
                rainfall: Vec::new(),
                insufficient: Some(InsufficientInfo {
                    needed: vec![EntityKind::State, EntityKind::Crop],
                    message: "Need more.".to_string(),
                    suggestions: vec!["Ask this".to_string()],
                }),
                notes: Vec::new(),
            }),
            citations: Vec::new(),
        };

        let text = format_response(&bundle);
        assert!(text.contains("Needed: state, crop"));
        assert!(text.contains("- Ask this"));
        assert!(text.contains("states: none recognised; crops: none recognised; years: none resolved"));
        assert!(text.contains("No data sources were used"));
    }

    #[test]
    fn test_state_ranking_lists_states_in_order() {
        let bundle = ResultBundle {
            query_type: QueryType::StateRanking,
            scope: Scope::default(),
            data_points: 3,
            payload: Payload::StateRanking(StateRanking {
                crop: Some("Rice".to_string()),
                focus: RankingFocus::Lowest,
                years: vec![2022],
                states: vec![
                    StateTotal {
                        state: "Bihar".to_string(),
                        production: 100.0,
                    },
                    StateTotal {
                        state: "Haryana".to_string(),
                        production: 500.0,
                    },
                ],
                states_ranked: 3,
                notes: Vec::new(),
            }),
            citations: Vec::new(),
        };

        let text = format_response(&bundle);
        assert!(text.contains("## State Production Ranking"));
        assert!(text.contains("State-wise Rice production for 2022, lowest first."));
        assert!(text.find("1. Bihar: 100.00 tonnes").unwrap() < text.find("2. Haryana: 500.00 tonnes").unwrap());
        assert!(text.contains("Showing 2 of 3 states with data."));
    }
}
