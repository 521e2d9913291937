//! Ask command handler.
//!
//! Classifies the question, fetches the datasets it needs from the
//! configured source and prints the cited answer.

use super::build_engine;
use clap::Args;
use samarth_core::{config::AppConfig, AppError, AppResult};
use samarth_data::{create_source, fetch_for_intent, SourceOptions};
use std::path::PathBuf;

/// Answer a question with cited figures
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Print the result bundle as JSON instead of the formatted answer
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.question()?;
        config.validate()?;

        let engine = build_engine(config)?;
        let intent = engine.understand(&question);
        tracing::info!(query_type = %intent.query_type(), "Classified question");

        let source = create_source(&config.source, &SourceOptions::from_config(config))
            .map_err(AppError::Config)?;
        let data = fetch_for_intent(source.as_ref(), &intent).await?;

        let answer = engine.answer(&question, &data.crop, &data.rainfall);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer.bundle)?);
        } else {
            println!("{}", answer.formatted_text);
        }

        Ok(())
    }

    fn question(&self) -> AppResult<String> {
        let text = match (&self.question, &self.file) {
            (Some(q), _) => q.clone(),
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read question from {:?}: {}", path, e))
            })?,
            (None, None) => return Err(AppError::Config("No question provided".to_string())),
        };
        Ok(text.trim().to_string())
    }
}
