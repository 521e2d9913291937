//! Small numeric helpers shared by the processors.
//!
//! Every helper returns `None` (or an empty collection) instead of dividing
//! by zero or indexing into an empty group.

use crate::types::{NormalizedRow, YearValue};
use std::collections::{BTreeMap, BTreeSet};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Pearson correlation. `None` for fewer than two points, mismatched
/// lengths, or a series with zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Choose analysis years.
///
/// Explicit years are used as given. Otherwise the `last_n` most recent
/// years present in `available` are used, which may be fewer than asked.
pub fn select_years(available: &BTreeSet<i32>, explicit: &[i32], last_n: usize) -> Vec<i32> {
    if !explicit.is_empty() {
        let mut years = explicit.to_vec();
        years.sort_unstable();
        years.dedup();
        return years;
    }
    let mut recent: Vec<i32> = available.iter().rev().take(last_n).copied().collect();
    recent.reverse();
    recent
}

pub fn years_of<'a>(rows: impl IntoIterator<Item = &'a NormalizedRow>) -> BTreeSet<i32> {
    rows.into_iter().map(|r| r.year).collect()
}

/// Sum production per key, skipping rows without a production value.
pub fn sum_production_by<'a, K, F>(rows: impl IntoIterator<Item = &'a NormalizedRow>, key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&NormalizedRow) -> Option<K>,
{
    let mut totals = BTreeMap::new();
    for row in rows {
        if let (Some(k), Some(value)) = (key(row), row.production) {
            *totals.entry(k).or_insert(0.0) += value;
        }
    }
    totals
}

/// Mean rainfall per year across all rows of that year.
///
/// Several rows per year occur when a state has multiple meteorological
/// subdivisions, or when a national view spans many states.
pub fn yearly_mean_rainfall<'a>(rows: impl IntoIterator<Item = &'a NormalizedRow>) -> BTreeMap<i32, f64> {
    let mut buckets: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(mm) = row.rainfall_mm {
            buckets.entry(row.year).or_default().push(mm);
        }
    }
    buckets
        .into_iter()
        .filter_map(|(year, values)| mean(&values).map(|m| (year, m)))
        .collect()
}

pub fn to_series(map: &BTreeMap<i32, f64>) -> Vec<YearValue> {
    map.iter()
        .map(|(year, value)| YearValue {
            year: *year,
            value: *value,
        })
        .collect()
}

/// Sort `(name, value)` pairs by value descending, name ascending on ties.
pub fn rank_desc(totals: BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_pearson() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_select_years() {
        let available = BTreeSet::from([2018, 2019, 2020, 2021]);
        assert_eq!(select_years(&available, &[], 2), vec![2020, 2021]);
        assert_eq!(select_years(&available, &[], 10), vec![2018, 2019, 2020, 2021]);
        assert_eq!(select_years(&available, &[2015, 2010], 2), vec![2010, 2015]);
        assert!(select_years(&BTreeSet::new(), &[], 3).is_empty());
    }

    #[test]
    fn test_rank_desc_breaks_ties_by_name() {
        let totals = BTreeMap::from([
            ("Wheat".to_string(), 5.0),
            ("Bajra".to_string(), 5.0),
            ("Rice".to_string(), 9.0),
        ]);
        let ranked = rank_desc(totals);
        let names: Vec<_> = ranked.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Rice", "Bajra", "Wheat"]);
    }
}
