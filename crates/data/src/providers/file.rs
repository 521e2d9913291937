//! Local JSON files.
//!
//! Reads `<dir>/crop.json` and `<dir>/rainfall.json`. Each file is either a
//! bare array of records or an object carrying its own provenance:
//!
//! ```json
//! { "source_label": "IMD Rainfall", "dataset_id": "imd-2023", "records": [ ... ] }
//! ```
//!
//! Filters are not applied; the engine narrows rows itself.

use crate::source::DataSource;
use crate::types::{FetchFilters, ResourceInfo};
use samarth_core::{AppError, AppResult};
use samarth_engine::{DatasetKind, RawBatch, RawRecord};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileContents {
    Records(Vec<RawRecord>),
    Labelled {
        source_label: Option<String>,
        dataset_id: Option<String>,
        records: Vec<RawRecord>,
    },
}

/// Data source backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, kind: DatasetKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.as_str()))
    }
}

/// Parse one batch file, falling back to file-derived provenance.
pub fn read_batch(path: &Path, kind: DatasetKind) -> AppResult<RawBatch> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Data(format!("Failed to read {:?}: {}", path, e)))?;

    let parsed: FileContents = serde_json::from_str(&contents).map_err(|e| {
        AppError::Data(format!(
            "Failed to parse {:?}: expected an array of records or {{source_label, dataset_id, records}}: {}",
            path, e
        ))
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| kind.as_str().to_string());
    let fallback = ResourceInfo::new(format!("Local file {}", file_name), file_name);

    let batch = match parsed {
        FileContents::Records(records) => RawBatch::new(kind, fallback.label, fallback.dataset_id, records),
        FileContents::Labelled {
            source_label,
            dataset_id,
            records,
        } => RawBatch::new(
            kind,
            source_label.unwrap_or(fallback.label),
            dataset_id.unwrap_or(fallback.dataset_id),
            records,
        ),
    };

    Ok(batch)
}

#[async_trait::async_trait]
impl DataSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, kind: DatasetKind, _filters: &FetchFilters) -> AppResult<RawBatch> {
        let path = self.path_for(kind);
        tracing::info!("Reading {} records from {:?}", kind, path);

        if !path.exists() {
            tracing::warn!("{:?} not found; continuing without {} data", path, kind);
            return Ok(RawBatch::new(
                kind,
                format!("Local file {}.json (missing)", kind.as_str()),
                format!("{}.json", kind.as_str()),
                Vec::new(),
            ));
        }

        let batch = read_batch(&path, kind)?;
        tracing::debug!("Read {} records from {:?}", batch.records.len(), path);
        Ok(batch)
    }
}
