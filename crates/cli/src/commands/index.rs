//! Index command handler.

use clap::{Args, Subcommand};
use ragdex_core::AppResult;
use ragdex_knowledge::KnowledgeBase;

/// Inspect or remove the configured index
#[derive(Args, Debug)]
pub struct IndexCommand {
    #[command(subcommand)]
    pub action: IndexAction,
}

#[derive(Subcommand, Debug)]
pub enum IndexAction {
    /// Show index statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the index and every document in it
    Drop,
}

impl IndexCommand {
    pub async fn execute(&self, kb: &KnowledgeBase) -> AppResult<()> {
        match &self.action {
            IndexAction::Stats { json } => {
                tracing::info!("Executing index stats command");
                let stats = kb.stats().await?;

                if *json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    println!("Index: {}", stats.name);
                    println!("  Documents: {}", stats.count);
                    println!("  Dimension: {}", stats.dimension);
                    println!("  Metric: {}", stats.metric);
                }
            }
            IndexAction::Drop => {
                tracing::info!("Executing index drop command");
                kb.drop_index().await?;
                println!("Index '{}' dropped", kb.index().name);
            }
        }

        Ok(())
    }
}
