//! Query understanding and multi-source synthesis for crop production and
//! rainfall data.
//!
//! A question is turned into a [`QueryIntent`] (entities plus a query type),
//! the raw crop and rainfall batches are normalized into one row schema, the
//! matching analysis runs, and the result is rendered with a numbered list of
//! the datasets every figure came from.
//!
//! The engine is pure and synchronous; fetching data is the caller's job.

pub mod analysis;
pub mod answer;
pub mod citation;
pub mod classify;
pub mod config;
pub mod extract;
pub mod format;
pub mod normalize;
pub mod payload;
pub mod types;
pub mod vocabulary;

pub use answer::QueryEngine;
pub use config::{AnalysisSettings, EngineConfig};
pub use payload::{Answer, Payload, ResultBundle};
pub use types::{
    Citation, CropCategory, DatasetKind, EntityKind, EntitySet, NormalizedRow, QueryIntent, QueryType, RankingFocus,
    RawBatch, RawRecord,
};
pub use vocabulary::Vocabulary;
