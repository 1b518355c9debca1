//! Search command handler.

use clap::Args;
use ragdex_core::AppResult;
use ragdex_knowledge::{KnowledgeBase, SearchOptions, SearchResult};

/// Longest content excerpt shown per result.
const SNIPPET_CHARS: usize = 160;

/// Search the index with a natural-language query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of results to return
    #[arg(short = 'k', long, default_value_t = 5)]
    pub top_k: usize,

    /// Minimum similarity score
    #[arg(long, default_value_t = 0.0)]
    pub min_score: f32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, kb: &KnowledgeBase) -> AppResult<()> {
        tracing::info!("Executing search command");

        let options = SearchOptions::new()
            .with_top_k(self.top_k)
            .with_min_score(self.min_score);
        let results = kb.search(&self.query, &options).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No results for \"{}\"", self.query);
            return Ok(());
        }

        for (rank, result) in results.iter().enumerate() {
            print_result(rank + 1, result);
        }

        Ok(())
    }
}

fn print_result(rank: usize, result: &SearchResult) {
    println!("{}. {} [{}] score {:.3}", rank, result.title(), result.id, result.score);
    println!("   category: {}", result.category());
    if !result.source().is_empty() {
        println!("   source: {}", result.source());
    }
    let snippet = snippet(result.content());
    if !snippet.is_empty() {
        println!("   {}", snippet);
    }
}

/// First line of `content`, cut at a char boundary.
fn snippet(content: &str) -> String {
    let line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= SNIPPET_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(SNIPPET_CHARS).collect();
    format!("{}...", cut)
}
