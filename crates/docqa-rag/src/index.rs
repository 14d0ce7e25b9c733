use docqa_core::types::{Chunk, StrategyKind};
use docqa_text::SparseIndex;
use docqa_vector::DenseIndex;

/// A built index of either strategy. Queries dispatch on the variant, so a
/// sparse query path never touches a dense index.
#[derive(Debug, Clone)]
pub enum Index {
    Sparse(SparseIndex),
    Dense(DenseIndex),
}

impl Index {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Sparse(_) => StrategyKind::Sparse,
            Self::Dense(_) => StrategyKind::Dense,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Sparse(i) => i.len(),
            Self::Dense(i) => i.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An index together with the chunk sequence it was built from.
///
/// Row `i` of the index always describes `chunks[i]`; the pair is only
/// created by the pipeline and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    index: Index,
    chunks: Vec<Chunk>,
}

impl IndexedDocument {
    pub(crate) fn new(index: Index, chunks: Vec<Chunk>) -> Self {
        debug_assert_eq!(index.len(), chunks.len());
        Self { index, chunks }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn kind(&self) -> StrategyKind {
        self.index.kind()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
