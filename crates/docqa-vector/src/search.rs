use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};

use docqa_core::traits::{Embedder, IndexStrategy};
use docqa_core::types::{top_k, Chunk, SearchHit, StrategyKind};
use docqa_core::{EmbedMode, Error, Result};

use crate::index::DenseIndex;

/// Embedding batches requested concurrently while building.
const MAX_IN_FLIGHT: usize = 4;

/// Embedding similarity: chunk vectors from an external provider, ranked by
/// Euclidean distance to the query vector.
#[derive(Clone)]
pub struct DenseStrategy {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl DenseStrategy {
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize) -> Self {
        Self { embedder, batch_size: batch_size.max(1) }
    }

    pub fn embedder_id(&self) -> &str {
        self.embedder.embedder_id()
    }
}

/// Map a distance onto a similarity where smaller distance ranks higher.
fn similarity(squared_distance: f32) -> f32 {
    1.0 / (1.0 + squared_distance.max(0.0).sqrt())
}

#[async_trait]
impl IndexStrategy for DenseStrategy {
    type Index = DenseIndex;

    fn kind(&self) -> StrategyKind {
        StrategyKind::Dense
    }

    async fn build(&self, chunks: &[Chunk]) -> Result<DenseIndex> {
        if chunks.is_empty() {
            return Err(Error::IndexBuild("cannot build a dense index over zero chunks".into()));
        }
        let batches: Vec<Vec<String>> = chunks
            .chunks(self.batch_size)
            .map(|batch| batch.iter().map(|c| c.text.clone()).collect())
            .collect();
        let batch_count = batches.len();
        let embedded: Vec<Vec<Vec<f32>>> = stream::iter(batches)
            .map(|batch| {
                let embedder = Arc::clone(&self.embedder);
                async move { embedder.embed(&batch, EmbedMode::Document).await }
            })
            .buffered(MAX_IN_FLIGHT)
            .try_collect()
            .await
            .map_err(|e| Error::IndexBuild(format!("embedding provider failed: {e}")))?;
        let vectors: Vec<Vec<f32>> = embedded.into_iter().flatten().collect();
        let positions = chunks.iter().map(|c| c.position).collect();
        let index = DenseIndex::from_vectors(positions, vectors, self.embedder.embedder_id())?;
        tracing::info!(
            chunks = index.len(),
            dim = index.dim(),
            batches = batch_count,
            embedder = index.embedder_id(),
            "dense index built"
        );
        Ok(index)
    }

    async fn search(&self, index: &DenseIndex, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let k = k.min(index.len());
        if k == 0 {
            return Ok(Vec::new());
        }
        if index.embedder_id() != self.embedder.embedder_id() {
            return Err(Error::Operation(format!(
                "index was built with '{}' but queried with '{}'",
                index.embedder_id(),
                self.embedder.embedder_id()
            )));
        }
        let mut embedded = self.embedder.embed(&[query.to_string()], EmbedMode::Query).await?;
        let query_vec = embedded
            .pop()
            .ok_or_else(|| Error::Operation("provider returned no query embedding".into()))?;
        if query_vec.iter().any(|x| !x.is_finite()) {
            return Err(Error::Operation("provider returned non-finite query embedding".into()));
        }
        let distances = index
            .squared_distances(&query_vec)
            .map_err(|e| Error::Operation(e.to_string()))?;
        let scores = index.positions().iter().copied().zip(distances.into_iter().map(similarity));
        Ok(top_k(scores, k, StrategyKind::Dense))
    }
}
