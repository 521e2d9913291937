//! The engine entry point.

use crate::analysis::{self, AnalysisContext};
use crate::classify::QueryClassifier;
use crate::config::EngineConfig;
use crate::extract::EntityExtractor;
use crate::format::format_response;
use crate::normalize::{normalize_batches, NormalizedBatch};
use crate::payload::{Answer, ResultBundle};
use crate::types::{DatasetKind, QueryIntent, RawBatch};
use samarth_core::AppResult;
use tracing::{debug, info, warn};

/// Question answering over crop and rainfall batches.
///
/// Built once from an [`EngineConfig`]; holds only read-only tables and
/// compiled patterns, so a shared reference can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    config: EngineConfig,
    classifier: QueryClassifier,
}

impl QueryEngine {
    pub fn new(config: EngineConfig) -> AppResult<Self> {
        let config = EngineConfig {
            vocabulary: config.vocabulary.normalized(),
            ..config
        };
        config.validate()?;
        let extractor = EntityExtractor::new(&config.vocabulary)?;
        Ok(Self {
            classifier: QueryClassifier::new(extractor),
            config,
        })
    }

    /// Engine with the built-in vocabulary and settings.
    pub fn with_defaults() -> AppResult<Self> {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract entities and classify the question without touching data.
    pub fn understand(&self, question: &str) -> QueryIntent {
        self.classifier.intent(question)
    }

    /// Normalize batches with this engine's vocabulary.
    pub fn normalize(&self, batches: &[RawBatch]) -> NormalizedBatch {
        normalize_batches(batches, &self.config.vocabulary)
    }

    /// Answer a question from already-fetched batches.
    ///
    /// Never fails: missing entities and missing data are reported in the
    /// answer text. Only the datasets the question needs are normalized.
    pub fn answer(&self, question: &str, crop_batches: &[RawBatch], rainfall_batches: &[RawBatch]) -> Answer {
        let intent = self.understand(question);
        info!(query_type = %intent.query_type(), "Answering question");
        debug!(entities = ?intent.entities(), "Extracted entities");

        let crop = self.normalize_kind(&intent, DatasetKind::Crop, crop_batches);
        let rainfall = self.normalize_kind(&intent, DatasetKind::Rainfall, rainfall_batches);

        let ctx = AnalysisContext {
            intent: &intent,
            crop_rows: &crop.rows,
            rainfall_rows: &rainfall.rows,
            settings: &self.config.settings,
            vocab: &self.config.vocabulary,
        };
        let analysis = analysis::run(&ctx);

        let bundle = ResultBundle {
            query_type: intent.query_type(),
            scope: analysis.scope,
            data_points: analysis.data_points,
            payload: analysis.payload,
            citations: analysis.citations.into_vec(),
        };
        info!(
            data_points = bundle.data_points,
            citations = bundle.citations.len(),
            "Analysis complete"
        );

        Answer {
            formatted_text: format_response(&bundle),
            bundle,
        }
    }

    fn normalize_kind(&self, intent: &QueryIntent, kind: DatasetKind, batches: &[RawBatch]) -> NormalizedBatch {
        if !intent.needs(kind) {
            return NormalizedBatch::default();
        }

        let matching: Vec<RawBatch> = batches
            .iter()
            .filter(|b| {
                if b.kind != kind {
                    warn!(
                        dataset_id = %b.dataset_id,
                        expected = %kind,
                        found = %b.kind,
                        "Ignoring batch of the wrong kind"
                    );
                }
                b.kind == kind
            })
            .cloned()
            .collect();

        let normalized = self.normalize(&matching);
        debug!(
            kind = %kind,
            rows = normalized.rows.len(),
            skipped = normalized.skipped,
            "Normalized dataset"
        );
        normalized
    }
}
