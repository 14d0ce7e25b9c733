use std::path::Path;
use std::sync::Arc;

use docqa_core::chunker::chunk_text;
use docqa_core::config::{ChunkingSettings, Settings};
use docqa_core::traits::TextExtractor;
use docqa_core::types::{RetrievalResult, StrategyKind};
use docqa_core::{CancelToken, Error, Result};
use docqa_embed::get_default_embedder;
use docqa_extract::DocumentExtractor;
use docqa_llm::ChatCompletionsBackend;
use docqa_vector::DenseStrategy;

use crate::answer::{AnswerOutcome, AnswerSynthesizer};
use crate::index::IndexedDocument;
use crate::retriever::Retriever;
use crate::retry::RetryPolicy;

/// Caller-facing facade: turn documents into indexed documents, then ask
/// questions against them.
pub struct Pipeline {
    chunking: ChunkingSettings,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    extractor: Arc<dyn TextExtractor>,
}

impl Pipeline {
    pub fn new(retriever: Retriever, synthesizer: AnswerSynthesizer) -> Self {
        Self {
            chunking: ChunkingSettings::default(),
            retriever,
            synthesizer,
            extractor: Arc::new(DocumentExtractor::new()),
        }
    }

    /// Wire providers from configuration.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = get_default_embedder(&settings.embedding)?;
        let retriever = Retriever::new(DenseStrategy::new(embedder, settings.embedding.batch_size));
        let backend = Arc::new(ChatCompletionsBackend::from_settings(&settings.generation)?);
        let synthesizer = AnswerSynthesizer::new(backend)
            .with_policy(RetryPolicy::from_settings(&settings.generation))
            .with_top_k(settings.retrieval.top_k);
        Ok(Self::new(retriever, synthesizer).with_chunking(settings.chunking.clone()))
    }

    pub fn with_chunking(mut self, chunking: ChunkingSettings) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Chunk `raw_text` and build an index of the requested kind.
    pub async fn process_document(&self, raw_text: &str, strategy: StrategyKind) -> Result<IndexedDocument> {
        let config = self.chunking.for_strategy(strategy);
        let chunks = chunk_text(raw_text, &config);
        if chunks.is_empty() {
            return Err(Error::ExtractionFailed("document contains no text".into()));
        }
        let index = self.retriever.build(&chunks, strategy).await?;
        tracing::info!(%strategy, chunks = chunks.len(), size = config.size, overlap = config.overlap, "document indexed");
        Ok(IndexedDocument::new(index, chunks))
    }

    /// Extract a file's text, then index it.
    pub async fn process_file(&self, path: &Path, strategy: StrategyKind) -> Result<IndexedDocument> {
        let text = self.extractor.extract(path)?;
        if text.trim().is_empty() {
            return Err(Error::ExtractionFailed(format!("no text could be read from {}", path.display())));
        }
        tracing::info!(path = %path.display(), chars = text.len(), "document extracted");
        self.process_document(&text, strategy).await
    }

    pub async fn ask(&self, query: &str, doc: &IndexedDocument) -> AnswerOutcome {
        self.ask_with_cancel(query, doc, &CancelToken::never()).await
    }

    pub async fn ask_with_cancel(&self, query: &str, doc: &IndexedDocument, cancel: &CancelToken) -> AnswerOutcome {
        self.synthesizer.answer(query, doc, &self.retriever, cancel).await
    }

    /// Retrieval only, without generation.
    pub async fn search(&self, query: &str, doc: &IndexedDocument, k: usize) -> RetrievalResult {
        self.retriever.retrieve(query, doc, k, &CancelToken::never()).await
    }
}
