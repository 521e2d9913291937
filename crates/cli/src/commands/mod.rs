//! Command handlers for the Samarth CLI.

pub mod ask;
pub mod intent;
pub mod normalize;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use intent::IntentCommand;
pub use normalize::NormalizeCommand;

use samarth_core::{config::AppConfig, AppResult};
use samarth_engine::config::load_config;
use samarth_engine::QueryEngine;

/// Build the engine from the workspace's engine.yaml (defaults when absent).
pub fn build_engine(config: &AppConfig) -> AppResult<QueryEngine> {
    let path = config.engine_path();
    tracing::debug!("Loading engine config from {:?}", path);
    QueryEngine::new(load_config(&path)?)
}
