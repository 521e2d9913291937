//! Intent command handler.

use super::build_engine;
use clap::Args;
use samarth_core::{config::AppConfig, AppResult};

/// Show how a question is understood, without fetching data
#[derive(Args, Debug)]
pub struct IntentCommand {
    /// The question to classify
    pub question: String,
}

impl IntentCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing intent command");

        let engine = build_engine(config)?;
        let intent = engine.understand(&self.question);
        println!("{}", serde_json::to_string_pretty(&intent)?);
        Ok(())
    }
}
