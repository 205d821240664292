//! Ask command handler.
//!
//! Runs one question through the full chat pipeline.

use clap::Args;
use companion_core::{config::AppConfig, AppResult};
use companion_prompt::ChatMessage;

use super::build_chat_service;

/// Ask the companion a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The patient's question
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let service = build_chat_service(config)?;
        let result = service
            .respond(&[ChatMessage::user(self.question.clone())])
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        println!("{}", result.response);

        if !result.sources.is_empty() {
            println!("\nSources: {}", result.sources.join(", "));
        }
        println!("Confidence: {:.2}", result.confidence);

        if result.should_escalate {
            println!("\n{}", service.safety().escalation_response());
        }

        Ok(())
    }
}
