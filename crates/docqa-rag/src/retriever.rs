use docqa_core::traits::IndexStrategy;
use docqa_core::types::{Chunk, RetrievalResult, ScoredChunk, SearchHit, StrategyKind};
use docqa_core::{CancelToken, Error, Result};
use docqa_text::SparseStrategy;
use docqa_vector::DenseStrategy;

use crate::index::{Index, IndexedDocument};

/// Builds indices and answers ranked lookups for both strategies.
#[derive(Clone, Default)]
pub struct Retriever {
    sparse: SparseStrategy,
    dense: Option<DenseStrategy>,
}

impl Retriever {
    /// Sparse only; dense builds fail until an embedder is attached.
    pub fn sparse_only() -> Self {
        Self::default()
    }

    pub fn new(dense: DenseStrategy) -> Self {
        Self { sparse: SparseStrategy::new(), dense: Some(dense) }
    }

    fn dense(&self) -> Result<&DenseStrategy> {
        self.dense
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("dense retrieval needs an embedding provider".into()))
    }

    pub async fn build(&self, chunks: &[Chunk], kind: StrategyKind) -> Result<Index> {
        match kind {
            StrategyKind::Sparse => Ok(Index::Sparse(self.sparse.build(chunks).await?)),
            StrategyKind::Dense => Ok(Index::Dense(self.dense()?.build(chunks).await?)),
        }
    }

    /// Top `k` chunks for `query`, best first.
    ///
    /// Never fails: a broken index, a provider outage or cancellation is
    /// logged and comes back as an empty result.
    pub async fn retrieve(&self, query: &str, doc: &IndexedDocument, k: usize, cancel: &CancelToken) -> RetrievalResult {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Operation("retrieval cancelled".into())),
            res = self.try_retrieve(query, doc, k) => res,
        };
        match outcome {
            Ok(result) => {
                tracing::debug!(strategy = %doc.kind(), hits = result.len(), "retrieved");
                result
            }
            Err(e) => {
                tracing::warn!(strategy = %doc.kind(), error = %e, "retrieval degraded to empty result");
                RetrievalResult::empty()
            }
        }
    }

    async fn try_retrieve(&self, query: &str, doc: &IndexedDocument, k: usize) -> Result<RetrievalResult> {
        let k = k.min(doc.len());
        if k == 0 {
            return Ok(RetrievalResult::empty());
        }
        let hits = match doc.index() {
            Index::Sparse(index) => self.sparse.search(index, query, k).await?,
            Index::Dense(index) => self.dense()?.search(index, query, k).await?,
        };
        resolve_hits(hits, doc.chunks())
    }
}

fn resolve_hits(hits: Vec<SearchHit>, chunks: &[Chunk]) -> Result<RetrievalResult> {
    let hits = hits
        .into_iter()
        .map(|hit| {
            chunks
                .get(hit.position)
                .map(|chunk| ScoredChunk { chunk: chunk.clone(), score: hit.score })
                .ok_or_else(|| Error::Operation(format!("index returned unknown chunk {}", hit.position)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RetrievalResult { hits })
}
