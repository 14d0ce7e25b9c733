use anyhow::Context;
use candle_core::{Device, Tensor};

use docqa_core::types::ChunkPosition;
use docqa_core::{Error, Result};

/// Exact nearest-neighbour structure over one vector per chunk.
///
/// Vectors live in a `[chunks, dim]` CPU tensor; `dim` is fixed by the first
/// embedding the provider returned and every query must match it.
#[derive(Debug, Clone)]
pub struct DenseIndex {
    vectors: Tensor,
    dim: usize,
    positions: Vec<ChunkPosition>,
    embedder_id: String,
}

impl DenseIndex {
    /// Assemble the index, rejecting empty, ragged or non-finite input.
    pub fn from_vectors(positions: Vec<ChunkPosition>, vectors: Vec<Vec<f32>>, embedder_id: &str) -> Result<Self> {
        if vectors.is_empty() {
            return Err(Error::IndexBuild("cannot build a dense index over zero vectors".into()));
        }
        if vectors.len() != positions.len() {
            return Err(Error::IndexBuild(format!(
                "provider returned {} vectors for {} chunks",
                vectors.len(),
                positions.len()
            )));
        }
        let dim = vectors[0].len();
        if dim == 0 {
            return Err(Error::IndexBuild("provider returned zero-dimension vectors".into()));
        }
        if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(Error::IndexBuild(format!("vector {i} has dimension {}, expected {dim}", v.len())));
        }
        if vectors.iter().flatten().any(|x| !x.is_finite()) {
            return Err(Error::IndexBuild("provider returned non-finite vector components".into()));
        }
        let rows = vectors.len();
        let flat: Vec<f32> = vectors.into_iter().flatten().collect();
        let vectors = Tensor::from_vec(flat, (rows, dim), &Device::Cpu).map_err(Error::index_build)?;
        Ok(Self { vectors, dim, positions, embedder_id: embedder_id.to_string() })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embedder_id(&self) -> &str {
        &self.embedder_id
    }

    pub fn positions(&self) -> &[ChunkPosition] {
        &self.positions
    }

    /// Squared Euclidean distance from `query` to every row, in row order.
    pub fn squared_distances(&self, query: &[f32]) -> anyhow::Result<Vec<f32>> {
        anyhow::ensure!(
            query.len() == self.dim,
            "query vector has dimension {}, index expects {}",
            query.len(),
            self.dim
        );
        let q = Tensor::from_slice(query, (1, self.dim), &Device::Cpu)?;
        let distances = self
            .vectors
            .broadcast_sub(&q)?
            .sqr()?
            .sum(1)?
            .to_vec1::<f32>()
            .context("reading distances")?;
        Ok(distances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_follow_geometry() {
        let index = DenseIndex::from_vectors(vec![0, 1, 2], vec![vec![0.0, 0.0], vec![3.0, 4.0], vec![1.0, 0.0]], "test")
            .expect("index");
        let d = index.squared_distances(&[0.0, 0.0]).expect("distances");
        assert_eq!(d, vec![0.0, 25.0, 1.0]);
        assert_eq!(index.dim(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn ragged_or_empty_input_is_rejected() {
        assert!(DenseIndex::from_vectors(vec![], vec![], "t").is_err());
        assert!(DenseIndex::from_vectors(vec![0, 1], vec![vec![1.0, 0.0], vec![1.0]], "t").is_err());
        assert!(DenseIndex::from_vectors(vec![0], vec![vec![]], "t").is_err());
        assert!(DenseIndex::from_vectors(vec![0, 1], vec![vec![1.0]], "t").is_err());
        assert!(DenseIndex::from_vectors(vec![0], vec![vec![f32::NAN]], "t").is_err());
    }

    #[test]
    fn query_dimension_must_match() {
        let index = DenseIndex::from_vectors(vec![0], vec![vec![1.0, 0.0]], "t").expect("index");
        assert!(index.squared_distances(&[1.0, 0.0, 0.0]).is_err());
    }
}
