//! Dataset normalization.
//!
//! Rewrites loosely-typed raw batches into [`NormalizedRow`]s: detects which
//! raw column feeds each canonical field, canonicalises state and crop names,
//! and folds fiscal-year strings onto calendar years.

use crate::types::{DatasetKind, NormalizedRow, RawBatch, RawRecord};
use crate::vocabulary::{ColumnVariants, Vocabulary};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

/// Rows produced from one or more batches, plus how many records were dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedBatch {
    pub rows: Vec<NormalizedRow>,
    pub skipped: usize,
}

impl NormalizedBatch {
    fn extend(&mut self, other: NormalizedBatch) {
        self.rows.extend(other.rows);
        self.skipped += other.skipped;
    }
}

/// Raw column names chosen for each canonical field of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub state: Option<String>,
    pub district: Option<String>,
    pub crop: Option<String>,
    pub year: Option<String>,
    pub measure: Option<String>,
}

/// Lower-case a column name and treat `_`, `-` and `/` as spaces.
pub fn normalize_column_name(raw: &str) -> String {
    raw.to_lowercase()
        .replace(['_', '-', '/'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pick the raw column for each canonical field.
///
/// Candidates are the union of all record keys in sorted order; the variant
/// list order is the priority, so the first variant with any matching column
/// wins.
pub fn detect_columns(records: &[RawRecord], kind: DatasetKind, columns: &ColumnVariants) -> ColumnMapping {
    let keys: BTreeSet<&String> = records.iter().flat_map(|r| r.keys()).collect();
    let normalized: Vec<(String, &String)> = keys
        .into_iter()
        .map(|k| (normalize_column_name(k), k))
        .collect();

    let find = |variants: &[String]| -> Option<String> {
        variants.iter().find_map(|variant| {
            normalized
                .iter()
                .find(|(name, _)| name == variant)
                .map(|(_, raw)| (*raw).clone())
        })
    };

    let measure = match kind {
        DatasetKind::Crop => find(&columns.production),
        DatasetKind::Rainfall => find(&columns.rainfall),
    };

    ColumnMapping {
        state: find(&columns.state),
        district: find(&columns.district),
        crop: find(&columns.crop),
        year: find(&columns.year),
        measure,
    }
}

/// Parse a year from a number or a string such as `"2019"`, `"2019-20"`,
/// or `"2019/2020"`.
pub fn normalize_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => {
            let year = n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })?;
            (1000..=9999).contains(&year).then_some(year as i32)
        }
        Value::String(s) => {
            let s = s.trim();
            let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.len() != 4 {
                return None;
            }
            match s[4..].chars().next() {
                None | Some('-') | Some('/') => digits.parse().ok(),
                Some(_) => None,
            }
        }
        _ => None,
    }
}

/// Parse a measure value. Thousands separators are accepted; `NA`, `N/A`,
/// `-`, empty strings and null are treated as absent.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s == "-" || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("n/a") {
                return None;
            }
            s.replace(',', "").parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn text_field(record: &RawRecord, column: Option<&String>) -> Option<String> {
    let value = record.get(column?)?;
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Normalize one batch. Records without a usable state or year are skipped.
pub fn normalize_batch(batch: &RawBatch, vocab: &Vocabulary) -> NormalizedBatch {
    let mapping = detect_columns(&batch.records, batch.kind, &vocab.columns);
    debug!(
        dataset_id = %batch.dataset_id,
        kind = %batch.kind,
        ?mapping,
        "Detected columns"
    );

    let mut out = NormalizedBatch::default();

    for record in &batch.records {
        let state = text_field(record, mapping.state.as_ref()).map(|s| vocab.canonical_state(&s));
        let year = mapping
            .year
            .as_ref()
            .and_then(|col| record.get(col))
            .and_then(normalize_year);

        let (state, year) = match (state, year) {
            (Some(state), Some(year)) => (state, year),
            _ => {
                out.skipped += 1;
                continue;
            }
        };

        let measure = mapping
            .measure
            .as_ref()
            .and_then(|col| record.get(col))
            .and_then(parse_number);

        let (production, rainfall_mm) = match batch.kind {
            DatasetKind::Crop => (measure, None),
            DatasetKind::Rainfall => (None, measure),
        };

        out.rows.push(NormalizedRow {
            state,
            district: text_field(record, mapping.district.as_ref()),
            crop: text_field(record, mapping.crop.as_ref()).map(|c| vocab.canonical_crop(&c)),
            year,
            production,
            rainfall_mm,
            source_label: batch.source_label.clone(),
            dataset_id: batch.dataset_id.clone(),
        });
    }

    if out.skipped > 0 {
        debug!(
            dataset_id = %batch.dataset_id,
            skipped = out.skipped,
            "Skipped records without state or year"
        );
    }

    out
}

/// Normalize several batches into one row set, preserving batch order.
pub fn normalize_batches(batches: &[RawBatch], vocab: &Vocabulary) -> NormalizedBatch {
    let mut all = NormalizedBatch::default();
    for batch in batches {
        all.extend(normalize_batch(batch, vocab));
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_column_name_normalization() {
        assert_eq!(normalize_column_name("Crop_Year"), "crop year");
        assert_eq!(normalize_column_name(" State / UT "), "state ut");
        assert_eq!(normalize_column_name("Annual-Rainfall"), "annual rainfall");
    }

    #[test]
    fn test_detect_columns_priority() {
        let vocab = Vocabulary::default();
        let records = vec![record(json!({
            "State_Name": "Punjab",
            "Crop_Year": 2020,
            "Production": 10,
            "Quantity": 3
        }))];
        let mapping = detect_columns(&records, DatasetKind::Crop, &vocab.columns);
        assert_eq!(mapping.state.as_deref(), Some("State_Name"));
        assert_eq!(mapping.year.as_deref(), Some("Crop_Year"));
        assert_eq!(mapping.measure.as_deref(), Some("Production"));
        assert_eq!(mapping.district, None);
    }

    #[test]
    fn test_normalize_year_forms() {
        assert_eq!(normalize_year(&json!(2019)), Some(2019));
        assert_eq!(normalize_year(&json!("2019")), Some(2019));
        assert_eq!(normalize_year(&json!("2019-20")), Some(2019));
        assert_eq!(normalize_year(&json!("2019/2020")), Some(2019));
        assert_eq!(normalize_year(&json!(2019.0)), Some(2019));
        assert_eq!(normalize_year(&json!("19-20")), None);
        assert_eq!(normalize_year(&json!("20190")), None);
        assert_eq!(normalize_year(&json!(null)), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&json!("1,234.5")), Some(1234.5));
        assert_eq!(parse_number(&json!(12)), Some(12.0));
        assert_eq!(parse_number(&json!("NA")), None);
        assert_eq!(parse_number(&json!("-")), None);
        assert_eq!(parse_number(&json!("")), None);
        assert_eq!(parse_number(&json!(null)), None);
        assert_eq!(parse_number(&json!("abc")), None);
    }

    #[test]
    fn test_normalize_mixed_shapes() {
        let vocab = Vocabulary::default();
        let crop = RawBatch::new(
            DatasetKind::Crop,
            "Crop Production Statistics",
            "crop-1",
            vec![
                record(json!({
                    "state_name": "ORISSA",
                    "district_name": "Cuttack",
                    "crop": "paddy",
                    "crop_year": "2019-20",
                    "production": "1,000"
                })),
                record(json!({ "state_name": "Punjab", "crop": "Wheat" })),
            ],
        );
        let rain = RawBatch::new(
            DatasetKind::Rainfall,
            "IMD Rainfall",
            "rain-1",
            vec![record(json!({ "SUBDIVISION": "orissa", "YEAR": 2019, "ANNUAL": 1450.2 }))],
        );

        let crop_rows = normalize_batch(&crop, &vocab);
        assert_eq!(crop_rows.skipped, 1);
        let row = &crop_rows.rows[0];
        assert_eq!(row.state, "Odisha");
        assert_eq!(row.crop.as_deref(), Some("Rice"));
        assert_eq!(row.district.as_deref(), Some("Cuttack"));
        assert_eq!(row.year, 2019);
        assert_eq!(row.production, Some(1000.0));
        assert_eq!(row.rainfall_mm, None);
        assert_eq!(row.dataset_id, "crop-1");

        let rain_rows = normalize_batch(&rain, &vocab);
        assert_eq!(rain_rows.rows[0].state, "Odisha");
        assert_eq!(rain_rows.rows[0].year, 2019);
        assert_eq!(rain_rows.rows[0].rainfall_mm, Some(1450.2));
        assert_eq!(rain_rows.rows[0].source_label, "IMD Rainfall");
    }

    #[test]
    fn test_unknown_state_passes_through() {
        let vocab = Vocabulary::default();
        let batch = RawBatch::new(
            DatasetKind::Rainfall,
            "x",
            "y",
            vec![record(json!({ "state": "  Atlantis ", "year": 2020, "rainfall": 10 }))],
        );
        let rows = normalize_batch(&batch, &vocab);
        assert_eq!(rows.rows.len(), 1);
        assert_eq!(rows.rows[0].state, "Atlantis");
    }

    #[test]
    fn test_missing_measure_keeps_row() {
        let vocab = Vocabulary::default();
        let batch = RawBatch::new(
            DatasetKind::Crop,
            "x",
            "y",
            vec![record(json!({ "state": "Goa", "year": 2020, "production": "NA" }))],
        );
        let rows = normalize_batch(&batch, &vocab);
        assert_eq!(rows.rows.len(), 1);
        assert_eq!(rows.rows[0].production, None);
    }
}
