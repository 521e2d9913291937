//! Data source abstraction.
//!
//! A source turns a dataset kind plus filters into one [`RawBatch`] carrying
//! its own provenance. The engine never learns which source produced it.

use crate::types::{FetchFilters, FetchedData};
use samarth_core::AppResult;
use samarth_engine::{DatasetKind, QueryIntent, RawBatch};

/// Provider of raw crop and rainfall records.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Short provider name ("synthetic", "file", "datagov").
    fn name(&self) -> &str;

    /// Fetch one dataset.
    ///
    /// The returned batch must have `kind` set to the requested kind and a
    /// non-empty `source_label` and `dataset_id`.
    async fn fetch(&self, kind: DatasetKind, filters: &FetchFilters) -> AppResult<RawBatch>;
}

/// Fetch every dataset the intent needs, concurrently.
///
/// Datasets the query type does not read are left empty.
pub async fn fetch_for_intent(source: &dyn DataSource, intent: &QueryIntent) -> AppResult<FetchedData> {
    let filters = FetchFilters::for_intent(intent);
    tracing::info!(
        source = source.name(),
        query_type = %intent.query_type(),
        "Fetching datasets"
    );
    tracing::debug!("Filters: {:?}", filters);

    let crop = async {
        if intent.needs(DatasetKind::Crop) {
            source.fetch(DatasetKind::Crop, &filters).await.map(|b| vec![b])
        } else {
            Ok(Vec::new())
        }
    };
    let rainfall = async {
        if intent.needs(DatasetKind::Rainfall) {
            source.fetch(DatasetKind::Rainfall, &filters).await.map(|b| vec![b])
        } else {
            Ok(Vec::new())
        }
    };

    let (crop, rainfall) = tokio::try_join!(crop, rainfall)?;
    let data = FetchedData { crop, rainfall };
    tracing::info!(records = data.record_count(), "Fetched datasets");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use samarth_engine::{EntitySet, QueryType, RawRecord};
    use std::sync::Mutex;

    /// Records every request it serves.
    struct RecordingSource {
        calls: Mutex<Vec<(DatasetKind, FetchFilters)>>,
    }

    #[async_trait::async_trait]
    impl DataSource for RecordingSource {
        fn name(&self) -> &str {
            "recording"
        }

        async fn fetch(&self, kind: DatasetKind, filters: &FetchFilters) -> AppResult<RawBatch> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((kind, filters.clone()));
            }
            Ok(RawBatch::new(kind, "test", "test-1", Vec::<RawRecord>::new()))
        }
    }

    fn intent(query_type: QueryType) -> QueryIntent {
        let entities = EntitySet {
            states: vec!["Punjab".to_string()],
            crops: vec!["Rice".to_string()],
            ..EntitySet::default()
        };
        QueryIntent::new(query_type, entities)
    }

    #[tokio::test]
    async fn test_ranking_fetches_crop_only() {
        let source = RecordingSource { calls: Mutex::new(Vec::new()) };
        let data = fetch_for_intent(&source, &intent(QueryType::DistrictRanking)).await.unwrap();

        assert_eq!(data.crop.len(), 1);
        assert!(data.rainfall.is_empty());
        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, DatasetKind::Crop);
        assert_eq!(calls[0].1.crop, Some("Rice".to_string()));
    }

    #[tokio::test]
    async fn test_comparison_fetches_both() {
        let source = RecordingSource { calls: Mutex::new(Vec::new()) };
        let data = fetch_for_intent(&source, &intent(QueryType::RainfallComparison)).await.unwrap();

        assert_eq!(data.crop.len(), 1);
        assert_eq!(data.rainfall.len(), 1);
        assert_eq!(source.calls.lock().unwrap().len(), 2);
    }
}
