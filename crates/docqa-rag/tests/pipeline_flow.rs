use std::sync::Arc;

use async_trait::async_trait;
use docqa_core::config::{ChunkingSettings, Settings};
use docqa_core::traits::GenerationBackend;
use docqa_core::{ChunkingConfig, Error, ProviderError, StrategyKind};
use docqa_embed::HashEmbedder;
use docqa_rag::{AnswerSynthesizer, Index, Pipeline, Retriever};
use docqa_vector::DenseStrategy;

struct Unused;

#[async_trait]
impl GenerationBackend for Unused {
    fn name(&self) -> &str {
        "unused"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Hard("not expected in retrieval tests".into()))
    }
}

fn windows(size: usize, overlap: f64) -> ChunkingSettings {
    ChunkingSettings { sparse: ChunkingConfig::new(size, overlap), dense: ChunkingConfig::new(size, overlap) }
}

fn sparse_pipeline() -> Pipeline {
    Pipeline::new(Retriever::sparse_only(), AnswerSynthesizer::new(Arc::new(Unused))).with_chunking(windows(4, 0.0))
}

fn dense_pipeline() -> Pipeline {
    let dense = DenseStrategy::new(Arc::new(HashEmbedder::new(256)), 2);
    Pipeline::new(Retriever::new(dense), AnswerSynthesizer::new(Arc::new(Unused))).with_chunking(windows(4, 0.0))
}

#[tokio::test]
async fn sky_question_finds_the_sky_chunk() {
    let p = sparse_pipeline();
    let doc = p.process_document("The sky is blue. Water is wet.", StrategyKind::Sparse).await.unwrap();
    assert_eq!(doc.len(), 2);
    assert!(matches!(doc.index(), Index::Sparse(_)));

    let result = p.search("sky color", &doc, 1).await;
    assert_eq!(result.positions(), vec![0]);
    assert_eq!(result.hits[0].chunk.text, "The sky is blue.");
}

#[tokio::test]
async fn results_only_reference_indexed_chunks() {
    let p = sparse_pipeline();
    let text = "solar panels charge batteries at noon wind turbines spin at night \
                batteries store power for cloudy days inverters convert the current";
    let doc = p.process_document(text, StrategyKind::Sparse).await.unwrap();
    let result = p.search("batteries power", &doc, 50).await;
    assert_eq!(result.len(), doc.len(), "k beyond the chunk count returns every chunk");
    for hit in &result.hits {
        assert_eq!(&doc.chunks()[hit.chunk.position], &hit.chunk);
    }
    let again = p.search("batteries power", &doc, 50).await;
    assert_eq!(result, again);
}

#[tokio::test]
async fn dense_documents_rank_by_embedding() {
    let p = dense_pipeline();
    let doc = p
        .process_document("solar panels on roofs. bread needs yeast and flour. panels make solar power", StrategyKind::Dense)
        .await
        .unwrap();
    assert_eq!(doc.kind(), StrategyKind::Dense);
    let result = p.search("solar panels", &doc, 2).await;
    assert_eq!(result.len(), 2);
    assert!(result.hits[0].score >= result.hits[1].score);
    assert!(result.hits[0].chunk.text.contains("solar"));
}

#[tokio::test]
async fn empty_documents_fail_extraction() {
    let p = sparse_pipeline();
    let err = p.process_document("  \n\t ", StrategyKind::Sparse).await.unwrap_err();
    assert!(matches!(err, Error::ExtractionFailed(_)));
}

#[tokio::test]
async fn stop_words_alone_cannot_be_indexed() {
    let p = sparse_pipeline();
    let err = p.process_document("the and of to", StrategyKind::Sparse).await.unwrap_err();
    assert!(matches!(err, Error::IndexBuild(_)));
}

#[tokio::test]
async fn dense_needs_an_embedder() {
    let p = sparse_pipeline();
    let err = p.process_document("some words here", StrategyKind::Dense).await.unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[tokio::test]
async fn files_are_extracted_then_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let p = sparse_pipeline();

    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "The sky is blue. Water is wet.").unwrap();
    let doc = p.process_file(&notes, StrategyKind::Sparse).await.unwrap();
    assert_eq!(doc.len(), 2);

    let blank = dir.path().join("blank.md");
    std::fs::write(&blank, "   ").unwrap();
    assert!(matches!(p.process_file(&blank, StrategyKind::Sparse).await, Err(Error::ExtractionFailed(_))));

    let sheet = dir.path().join("table.xlsx");
    std::fs::write(&sheet, "x").unwrap();
    assert!(matches!(p.process_file(&sheet, StrategyKind::Sparse).await, Err(Error::UnsupportedFormat(_))));

    assert!(matches!(
        p.process_file(&dir.path().join("gone.pdf"), StrategyKind::Sparse).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn default_settings_build_a_working_pipeline() {
    let p = Pipeline::from_settings(&Settings::default()).unwrap();
    let doc = p.process_document("one two three", StrategyKind::Dense).await.unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(p.search("two", &doc, 3).await.len(), 1);
}
