//! Seed-then-search behaviour through the knowledge base.

use crate::sqlite_index::SqliteVectorStore;
use crate::types::{DistanceMetric, IndexSettings, Metadata, SeedOptions};
use crate::rag::SearchOptions;
use crate::KnowledgeBase;
use ragdex_llm::TrigramClient;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const DIMENSIONS: usize = 384;

fn knowledge_base(workspace: &Path) -> KnowledgeBase {
    let index = IndexSettings::new("documents", DIMENSIONS, DistanceMetric::Cosine);
    KnowledgeBase::from_parts(
        Arc::new(TrigramClient::new(DIMENSIONS)),
        Arc::new(SqliteVectorStore::in_memory().unwrap()),
        "trigram",
        index,
    )
    .with_base_dir(workspace)
}

fn metadata(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_seed_then_search_finds_document() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sky.md"), "The sky is blue.").unwrap();
    let kb = knowledge_base(temp.path());

    kb.seed(
        SeedOptions::new("sky.md")
            .with_id("doc1")
            .with_metadata(metadata(json!({"title": "Sky"}))),
    )
    .await
    .unwrap();

    let results = kb
        .search("What color is the sky?", &SearchOptions::default().with_top_k(1))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "doc1");
    assert_eq!(results[0].title(), "Sky");
    assert_eq!(results[0].category(), "general");
    assert_eq!(results[0].content(), "The sky is blue.");
    assert!(results[0].score > 0.0);
}

#[tokio::test]
async fn test_identical_text_scores_one() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("rust.md"), "Rust is a systems programming language").unwrap();
    fs::write(temp.path().join("pasta.md"), "Cooking recipes for pasta").unwrap();
    let kb = knowledge_base(temp.path());

    kb.seed(SeedOptions::new("rust.md")).await.unwrap();
    kb.seed(SeedOptions::new("pasta.md")).await.unwrap();

    let results = kb
        .search("Rust is a systems programming language", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(results[0].id, "rust", "Most relevant document should be first");
    assert!(
        (results[0].score - 1.0).abs() < 1e-4,
        "Identical text should score 1.0: {}",
        results[0].score
    );
}

#[tokio::test]
async fn test_threshold_above_one_returns_nothing() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sky.md"), "The sky is blue.").unwrap();
    let kb = knowledge_base(temp.path());
    kb.seed(SeedOptions::new("sky.md")).await.unwrap();

    let results = kb
        .search("The sky is blue.", &SearchOptions::default().with_min_score(1.1))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_unrelated_query_below_threshold_is_empty() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sky.md"), "The sky is blue.").unwrap();
    let kb = knowledge_base(temp.path());
    kb.seed(SeedOptions::new("sky.md")).await.unwrap();

    let results = kb
        .search("pasta recipes cooking", &SearchOptions::default().with_min_score(0.3))
        .await
        .unwrap();
    assert!(results.is_empty(), "Unrelated query should not match: {:?}", results);
}

#[tokio::test]
async fn test_results_respect_top_k_and_order() {
    let temp = TempDir::new().unwrap();
    let topics = [
        ("alpha.md", "vector search ranking"),
        ("beta.md", "vector search"),
        ("gamma.md", "vector databases"),
        ("delta.md", "vector"),
        ("epsilon.md", "garden tomatoes"),
    ];
    for (name, text) in topics {
        fs::write(temp.path().join(name), text).unwrap();
    }
    let kb = knowledge_base(temp.path());
    for (name, _) in topics {
        kb.seed(SeedOptions::new(name)).await.unwrap();
    }

    let options = SearchOptions::default().with_top_k(3).with_min_score(0.05);
    let results = kb.search("vector search", &options).await.unwrap();

    assert!(results.len() <= 3);
    assert_eq!(results[0].id, "beta");
    for pair in results.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "Scores should be ordered: {} >= {}",
            pair[0].score,
            pair[1].score
        );
    }
    assert!(results.iter().all(|r| r.score >= 0.05));
}

#[tokio::test]
async fn test_reseeding_an_id_replaces_it() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("note.md");
    let kb = knowledge_base(temp.path());

    fs::write(&path, "Bananas are yellow.").unwrap();
    kb.seed(SeedOptions::new("note.md").with_id("note")).await.unwrap();

    fs::write(&path, "Grass is green.").unwrap();
    kb.seed(SeedOptions::new("note.md").with_id("note")).await.unwrap();

    assert_eq!(kb.stats().await.unwrap().count, 1);

    let results = kb.search("Grass is green.", &SearchOptions::default()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "note");
    assert_eq!(results[0].content(), "Grass is green.");
}

#[tokio::test]
async fn test_caller_content_is_what_search_returns() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sky.md"), "The sky is blue.").unwrap();
    let kb = knowledge_base(temp.path());

    kb.seed(
        SeedOptions::new("sky.md")
            .with_id("doc1")
            .with_metadata(metadata(json!({"content": "override"}))),
    )
    .await
    .unwrap();

    let results = kb.search("The sky is blue.", &SearchOptions::default()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content(), "override");
    assert!((results[0].score - 1.0).abs() < 1e-4);

    let results = kb.search("override", &SearchOptions::default().with_min_score(0.3)).await.unwrap();
    assert!(results.is_empty(), "Override text must not be embedded: {:?}", results);
}

#[tokio::test]
async fn test_empty_query_is_invalid() {
    let temp = TempDir::new().unwrap();
    let kb = knowledge_base(temp.path());

    let err = kb.search("", &SearchOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), "InvalidInput");
}

#[tokio::test]
async fn test_stats_and_drop() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sky.md"), "The sky is blue.").unwrap();
    let kb = knowledge_base(temp.path());

    let before = kb.stats().await.unwrap();
    assert_eq!(before.count, 0);
    assert_eq!(before.dimension, DIMENSIONS);

    kb.seed(SeedOptions::new("sky.md")).await.unwrap();
    assert_eq!(kb.stats().await.unwrap().count, 1);

    kb.drop_index().await.unwrap();
    assert_eq!(kb.stats().await.unwrap().count, 0);
    assert_eq!(
        kb.search("sky", &SearchOptions::default()).await.unwrap_err().kind(),
        "GenericSearchFailure"
    );
}

#[tokio::test]
async fn test_connect_from_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sky.md"), "The sky is blue.").unwrap();

    let mut config = ragdex_core::AppConfig::default();
    config.workspace = temp.path().to_path_buf();
    config.embedding.provider = "trigram".to_string();
    config.embedding.dimensions = 64;
    config.store_url = Some(format!("sqlite://{}", temp.path().join("index.sqlite").display()));

    let kb = KnowledgeBase::connect(&config).unwrap();
    kb.seed(SeedOptions::new("sky.md")).await.unwrap();
    assert_eq!(kb.stats().await.unwrap().count, 1);
    assert!(temp.path().join("index.sqlite").exists());
}

#[tokio::test]
async fn test_connect_rejects_incomplete_config() {
    let mut config = ragdex_core::AppConfig::default();
    config.embedding.provider = "trigram".to_string();
    config.store_url = None;

    let err = KnowledgeBase::connect(&config).unwrap_err();
    assert!(err.to_string().contains("RAGDEX_STORE_URL"));
}
