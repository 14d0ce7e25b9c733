use async_trait::async_trait;

use docqa_core::traits::IndexStrategy;
use docqa_core::types::{top_k, Chunk, SearchHit, StrategyKind};
use docqa_core::Result;

use crate::index::SparseIndex;

/// Lexical scoring: TF-IDF rows ranked by cosine similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseStrategy;

impl SparseStrategy {
	pub fn new() -> Self { Self }
}

#[async_trait]
impl IndexStrategy for SparseStrategy {
	type Index = SparseIndex;

	fn kind(&self) -> StrategyKind { StrategyKind::Sparse }

	async fn build(&self, chunks: &[Chunk]) -> Result<SparseIndex> { SparseIndex::build(chunks) }

	async fn search(&self, index: &SparseIndex, query: &str, k: usize) -> Result<Vec<SearchHit>> {
		let k = k.min(index.len());
		if k == 0 { return Ok(Vec::new()); }
		Ok(top_k(index.scores(query)?, k, StrategyKind::Sparse))
	}
}
