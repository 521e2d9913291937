//! Normalize command handler.
//!
//! Useful for checking how a new dataset's columns are detected before
//! pointing the file source at it.

use super::build_engine;
use clap::Args;
use samarth_core::{config::AppConfig, AppError, AppResult};
use samarth_data::providers::file::read_batch;
use samarth_engine::DatasetKind;
use std::path::PathBuf;

/// Normalize a raw JSON batch into the shared row schema
#[derive(Args, Debug)]
pub struct NormalizeCommand {
    /// Dataset kind of the file (crop or rainfall)
    #[arg(short, long)]
    pub kind: String,

    /// JSON file: an array of records or {source_label, dataset_id, records}
    pub path: PathBuf,
}

impl NormalizeCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing normalize command");

        let kind: DatasetKind = self.kind.parse().map_err(AppError::Config)?;
        let batch = read_batch(&self.path, kind)?;
        let total = batch.records.len();

        let engine = build_engine(config)?;
        let normalized = engine.normalize(&[batch]);
        tracing::info!(
            records = total,
            rows = normalized.rows.len(),
            skipped = normalized.skipped,
            "Normalized batch"
        );

        println!("{}", serde_json::to_string_pretty(&normalized)?);
        Ok(())
    }
}
