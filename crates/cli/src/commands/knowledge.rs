//! Knowledge command handler.
//!
//! Inspects the loaded knowledge base and what retrieval returns for a query.

use clap::{Args, Subcommand};
use companion_core::{config::AppConfig, AppResult};
use companion_knowledge::Retriever;

use super::load_knowledge;

/// Inspect the knowledge base
#[derive(Args, Debug)]
pub struct KnowledgeCommand {
    #[command(subcommand)]
    pub action: KnowledgeAction,
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeAction {
    /// List the conditions in the knowledge base
    List(KnowledgeListCommand),
    /// Show the context retrieved for a query
    Search(KnowledgeSearchCommand),
}

/// List conditions
#[derive(Args, Debug)]
pub struct KnowledgeListCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeListCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge list command");

        let knowledge = load_knowledge(config)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&knowledge.conditions)?);
            return Ok(());
        }

        println!(
            "{} conditions in {}",
            knowledge.len(),
            config.knowledge_file().display()
        );
        for condition in &knowledge.conditions {
            let risk = condition
                .risk_level
                .map(|r| format!(" [{}]", r.as_str()))
                .unwrap_or_default();
            println!(
                "  {}{} - keywords: {}",
                condition.name,
                risk,
                condition.keywords.join(", ")
            );
        }

        Ok(())
    }
}

/// Run retrieval for a query
#[derive(Args, Debug)]
pub struct KnowledgeSearchCommand {
    /// Query text
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeSearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge search command");

        let retriever = Retriever::new(load_knowledge(config)?);
        let result = retriever.retrieve(&self.query);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        if result.sources.is_empty() {
            println!("No matching conditions");
        } else {
            println!("Matched: {}", result.sources.join(", "));
        }
        println!("\n{}", result.context);

        Ok(())
    }
}

impl KnowledgeCommand {
    /// Execute the knowledge command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            KnowledgeAction::List(cmd) => cmd.execute(config).await,
            KnowledgeAction::Search(cmd) => cmd.execute(config).await,
        }
    }
}
