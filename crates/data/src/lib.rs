//! Data sources for the Samarth engine.
//!
//! The engine only reasons over batches it is handed. This crate is where
//! those batches come from: a provider-agnostic [`DataSource`] trait and
//! three implementations.
//!
//! # Sources
//! - **synthetic**: deterministic demo data for every state (default)
//! - **file**: `crop.json` / `rainfall.json` from a local directory
//! - **datagov**: the data.gov.in resource API with an on-disk response cache
//!
//! # Example
//! ```no_run
//! use samarth_data::{create_source, fetch_for_intent, SourceOptions};
//! use samarth_engine::QueryEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = QueryEngine::with_defaults()?;
//! let source = create_source("synthetic", &SourceOptions::default())?;
//! let intent = engine.understand("Compare rainfall in Kerala and Goa");
//! let data = fetch_for_intent(source.as_ref(), &intent).await?;
//! let answer = engine.answer("Compare rainfall in Kerala and Goa", &data.crop, &data.rainfall);
//! println!("{}", answer.formatted_text);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod factory;
pub mod providers;
pub mod source;
pub mod types;

// Re-export main types
pub use factory::{create_source, SourceOptions};
pub use providers::{DataGovSource, FileSource, SyntheticSource};
pub use source::{fetch_for_intent, DataSource};
pub use types::{FetchFilters, FetchedData, ResourceInfo};
