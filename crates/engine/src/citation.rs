//! Citation tracking.
//!
//! Processors thread a [`CitationLog`] through their work and call
//! [`CitationLog::cite`] once per aggregate they compute. The log is returned
//! with the payload, so processors stay pure and the formatter never has to
//! invent provenance.

use crate::types::{Citation, NormalizedRow};

/// Ordered accumulator of citations for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationLog {
    citations: Vec<Citation>,
}

impl CitationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a claim backed by `rows`.
    ///
    /// Adds one citation per distinct `(source_label, dataset_id)` among the
    /// rows, in first-seen order, and returns their 1-based positions. Returns
    /// an empty list when `rows` is empty: no data, no citation.
    pub fn cite<'a, I>(&mut self, claim: impl Into<String>, rows: I, detail: Option<String>) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a NormalizedRow>,
    {
        let claim = claim.into();
        let mut sources: Vec<(&str, &str)> = Vec::new();
        for row in rows {
            let key = (row.source_label.as_str(), row.dataset_id.as_str());
            if !sources.contains(&key) {
                sources.push(key);
            }
        }

        sources
            .into_iter()
            .map(|(source_label, dataset_id)| {
                self.citations.push(Citation {
                    claim: claim.clone(),
                    source_label: source_label.to_string(),
                    dataset_id: dataset_id.to_string(),
                    detail: detail.clone(),
                });
                self.citations.len()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    pub fn into_vec(self) -> Vec<Citation> {
        self.citations
    }
}

/// Render a year list compactly: `2019-2023` when contiguous, else a list.
pub fn describe_years(years: &[i32]) -> String {
    match years {
        [] => "no years".to_string(),
        [only] => only.to_string(),
        [first, .., last] if years.windows(2).all(|w| w[1] == w[0] + 1) => {
            format!("{}-{}", first, last)
        }
        _ => years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Citation detail for an aggregate over a year window.
///
/// Mentions the shortfall when fewer years were available than requested.
pub fn coverage_detail(what: &str, years: &[i32], requested: Option<usize>, rows: usize) -> String {
    let mut detail = format!(
        "{} over {} ({} year{}, {} record{})",
        what,
        describe_years(years),
        years.len(),
        plural(years.len()),
        rows,
        plural(rows)
    );
    if let Some(requested) = requested {
        if years.len() < requested {
            detail.push_str(&format!(
                "; {} year{} requested, only {} available",
                requested,
                plural(requested),
                years.len()
            ));
        }
    }
    detail
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, id: &str) -> NormalizedRow {
        NormalizedRow {
            state: "Punjab".to_string(),
            district: None,
            crop: None,
            year: 2020,
            production: Some(1.0),
            rainfall_mm: None,
            source_label: label.to_string(),
            dataset_id: id.to_string(),
        }
    }

    #[test]
    fn test_cite_dedupes_sources() {
        let rows = vec![row("A", "1"), row("B", "2"), row("A", "1")];
        let mut log = CitationLog::new();
        let ids = log.cite("claim", &rows, None);
        assert_eq!(ids, vec![1, 2]);

        let more = log.cite("other", &rows[2..], Some("detail".to_string()));
        assert_eq!(more, vec![3]);

        let citations = log.into_vec();
        assert_eq!(citations[0].dataset_id, "1");
        assert_eq!(citations[1].dataset_id, "2");
        assert_eq!(citations[2].detail.as_deref(), Some("detail"));
    }

    #[test]
    fn test_cite_without_rows_adds_nothing() {
        let mut log = CitationLog::new();
        assert!(log.cite("nothing", &Vec::<NormalizedRow>::new(), None).is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_describe_years() {
        assert_eq!(describe_years(&[]), "no years");
        assert_eq!(describe_years(&[2020]), "2020");
        assert_eq!(describe_years(&[2019, 2020, 2021]), "2019-2021");
        assert_eq!(describe_years(&[2019, 2021]), "2019, 2021");
    }

    #[test]
    fn test_coverage_detail_notes_shortfall() {
        let detail = coverage_detail("Mean rainfall", &[2022, 2023], Some(5), 2);
        assert!(detail.contains("2022-2023"));
        assert!(detail.contains("5 years requested, only 2 available"));

        let full = coverage_detail("Mean rainfall", &[2023], Some(1), 1);
        assert!(!full.contains("requested"));
    }
}
