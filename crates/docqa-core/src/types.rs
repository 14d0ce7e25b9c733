//! Domain types shared by the sparse and dense engines.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Position of a chunk inside its document's chunk sequence.
pub type ChunkPosition = usize;

/// A passage of the source document that is independently indexed.
///
/// - `position`: index in the chunk sequence, the chunk's identity for the
///   lifetime of one indexed document
/// - `text`: the window's tokens re-joined with single spaces
///
/// Overlapping windows produce repeated text across chunks; identity stays
/// positional, so repeats are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub position: ChunkPosition,
    pub text: String,
}

/// Which scoring strategy produced (or should produce) an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Lexical TF-IDF weighting, no external calls.
    #[default]
    Sparse,
    /// Embedding vectors from an external provider.
    Dense,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sparse => f.write_str("sparse"),
            Self::Dense => f.write_str("dense"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sparse" | "tfidf" | "tf-idf" => Ok(Self::Sparse),
            "dense" | "embedding" | "vector" => Ok(Self::Dense),
            other => Err(crate::error::Error::InvalidConfig(format!(
                "unknown retrieval strategy '{other}' (expected 'sparse' or 'dense')"
            ))),
        }
    }
}

/// Whether a text is embedded as a search query or as an indexed passage.
///
/// Providers that do not distinguish the two treat both the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmbedMode {
    Query,
    Document,
}

/// The minimal surface returned by both engines.
///
/// `position` matches `Chunk::position`. `score` is engine-specific but higher
/// is always better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub position: ChunkPosition,
    pub score: f32,
    pub source: StrategyKind,
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Chunks ranked by descending similarity, at most `k` of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub hits: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn positions(&self) -> Vec<ChunkPosition> {
        self.hits.iter().map(|h| h.chunk.position).collect()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.hits.iter().map(|h| h.chunk.text.as_str())
    }
}

/// Select the `k` best `(position, score)` pairs.
///
/// Ordering is descending score, then ascending position, so equal scores
/// always come out in document order. `k` is clamped to the number of scores.
pub fn top_k<I>(scores: I, k: usize, source: StrategyKind) -> Vec<SearchHit>
where
    I: IntoIterator<Item = (ChunkPosition, f32)>,
{
    let mut ranked: Vec<(ChunkPosition, f32)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| compare_ranked(*a, *b));
    ranked.truncate(k);
    ranked
        .into_iter()
        .map(|(position, score)| SearchHit { position, score, source })
        .collect()
}

fn compare_ranked(a: (ChunkPosition, f32), b: (ChunkPosition, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
