use async_trait::async_trait;
use std::path::Path;

use crate::error::{ProviderError, Result};
use crate::types::{Chunk, EmbedMode, SearchHit, StrategyKind};

/// External embedding capability used by the dense strategy.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `hash:d384`).
    fn embedder_id(&self) -> &str;
    /// Embed a batch of texts. Every returned vector has the same length.
    async fn embed(&self, texts: &[String], mode: EmbedMode) -> std::result::Result<Vec<Vec<f32>>, ProviderError>;
}

/// External text-generation capability used by the answer synthesizer.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
}

/// A scoring strategy: fit an index over a chunk sequence, then rank chunks
/// against free-text queries.
#[async_trait]
pub trait IndexStrategy: Send + Sync {
    type Index: Send + Sync;

    fn kind(&self) -> StrategyKind;
    /// Fails with `Error::IndexBuild` on an empty chunk set or provider failure.
    async fn build(&self, chunks: &[Chunk]) -> Result<Self::Index>;
    /// Top `k` rows by descending similarity, ties by ascending position.
    async fn search(&self, index: &Self::Index, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}

/// Turns an uploaded file into raw document text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}
