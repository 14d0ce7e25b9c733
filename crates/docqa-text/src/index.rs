use docqa_core::types::{Chunk, ChunkPosition};
use docqa_core::{Error, Result};

use crate::tfidf::{SparseVector, TfidfVectorizer};

/// Fitted TF-IDF model plus one weight row per chunk.
///
/// Immutable once built; `rows[i]` scores the chunk at `positions[i]`.
#[derive(Debug, Clone)]
pub struct SparseIndex {
	vectorizer: TfidfVectorizer,
	rows: Vec<SparseVector>,
	positions: Vec<ChunkPosition>,
}

impl SparseIndex {
	pub fn build(chunks: &[Chunk]) -> Result<Self> {
		if chunks.is_empty() { return Err(Error::IndexBuild("cannot build a sparse index over zero chunks".into())); }
		let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
		let (vectorizer, rows) = TfidfVectorizer::fit_transform(&texts).map_err(Error::index_build)?;
		let positions = chunks.iter().map(|c| c.position).collect();
		tracing::info!(chunks = chunks.len(), vocabulary = vectorizer.vocabulary_len(), "sparse index built");
		Ok(Self { vectorizer, rows, positions })
	}

	pub fn len(&self) -> usize { self.rows.len() }

	pub fn is_empty(&self) -> bool { self.rows.is_empty() }

	pub fn vocabulary_len(&self) -> usize { self.vectorizer.vocabulary_len() }

	/// Cosine similarity of `query` against every row, in row order.
	pub fn scores(&self, query: &str) -> Result<Vec<(ChunkPosition, f32)>> {
		if self.rows.len() != self.positions.len() {
			return Err(Error::Operation(format!("sparse index has {} rows for {} chunks", self.rows.len(), self.positions.len())));
		}
		let q = self.vectorizer.transform(query);
		Ok(self.positions.iter().copied().zip(self.rows.iter().map(|row| q.dot(row))).collect())
	}
}
