//! Seed command handler.
//!
//! Seeds a single file, or every matching file under a directory.

use clap::Args;
use ragdex_core::{config::AppConfig, AppError, AppResult};
use ragdex_knowledge::{KnowledgeBase, Metadata, SeedOptions};
use serde_json::Value;
use std::path::PathBuf;

/// Embed documents and store them in the index
#[derive(Args, Debug)]
pub struct SeedCommand {
    /// File or directory to seed
    pub path: PathBuf,

    /// Document id (defaults to the file name without extension)
    #[arg(long)]
    pub id: Option<String>,

    /// Document title (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Document category (defaults to "general")
    #[arg(long)]
    pub category: Option<String>,

    /// Extra metadata, repeatable
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub meta: Vec<(String, String)>,

    /// Extensions to include when seeding a directory
    #[arg(long = "ext", value_delimiter = ',', default_value = "md,txt")]
    pub extensions: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

impl SeedCommand {
    fn metadata(&self) -> Option<Metadata> {
        let mut metadata = Metadata::new();

        for (key, value) in &self.meta {
            metadata.insert(key.clone(), Value::String(value.clone()));
        }
        if let Some(title) = &self.title {
            metadata.insert("title".to_string(), Value::String(title.clone()));
        }
        if let Some(category) = &self.category {
            metadata.insert("category".to_string(), Value::String(category.clone()));
        }

        if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        }
    }

    pub async fn execute(&self, config: &AppConfig, kb: &KnowledgeBase) -> AppResult<()> {
        let resolved = if self.path.is_absolute() {
            self.path.clone()
        } else {
            config.workspace.join(&self.path)
        };

        if resolved.is_dir() {
            return self.execute_directory(kb).await;
        }

        tracing::info!("Executing seed command for {:?}", self.path);

        let mut options = SeedOptions::new(&self.path);
        options.id = self.id.clone();
        options.metadata = self.metadata();

        let doc = kb.seed(options).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&doc)?);
        } else {
            println!(
                "Seeded '{}' from {} ({} bytes, {} dimensions)",
                doc.id,
                doc.source.display(),
                doc.bytes,
                doc.dimensions
            );
        }

        Ok(())
    }

    async fn execute_directory(&self, kb: &KnowledgeBase) -> AppResult<()> {
        if self.id.is_some() || self.metadata().is_some() {
            return Err(AppError::Other(
                "--id, --title, --category and --meta apply to single files only".to_string(),
            ));
        }

        tracing::info!(
            "Executing seed command for directory {:?} (extensions: {:?})",
            self.path,
            self.extensions
        );

        let stats = kb.seed_directory(&self.path, &self.extensions).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!(
                "Seeded {} documents ({} failed, {} bytes) in {:.2}s",
                stats.seeded, stats.failed, stats.bytes_processed, stats.duration_secs
            );
        }

        Ok(())
    }
}
