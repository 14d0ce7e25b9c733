//! Embedding providers for the dense strategy.
//!
//! `HashEmbedder` is a deterministic, offline feature-hashing embedder used for
//! development and tests; `OpenAiEmbedder` talks to any OpenAI-compatible
//! `/embeddings` endpoint. `APP_USE_FAKE_EMBEDDINGS=1` forces the hash
//! embedder regardless of configuration.

use std::hash::Hasher;
use std::sync::Arc;

use async_trait::async_trait;
use twox_hash::XxHash64;

use docqa_core::config::{EmbeddingProviderKind, EmbeddingSettings};
use docqa_core::traits::Embedder;
use docqa_core::{EmbedMode, Error, ProviderError, Result};

pub mod normalize;
pub mod remote;

pub use normalize::l2_normalize;
pub use remote::OpenAiEmbedder;

/// Signed feature hashing over lower-cased alphanumeric tokens.
///
/// Texts sharing vocabulary land close together, which is enough to exercise
/// the dense pipeline end to end without a model. Query and document modes
/// embed identically.
pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hash:d{dim}") }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.to_lowercase().as_bytes());
            let h = hasher.finish();
            #[allow(clippy::cast_possible_truncation)]
            let idx = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    async fn embed(&self, texts: &[String], _mode: EmbedMode) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Build the configured embedding provider.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    if use_fake_embeddings() {
        tracing::info!(dim = settings.dimension, "using hash embedder (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Arc::new(HashEmbedder::new(settings.dimension)));
    }
    match settings.provider {
        EmbeddingProviderKind::Hash => {
            if settings.dimension == 0 {
                return Err(Error::InvalidConfig("embedding.dimension must be > 0".into()));
            }
            tracing::info!(dim = settings.dimension, "using hash embedder");
            Ok(Arc::new(HashEmbedder::new(settings.dimension)))
        }
        EmbeddingProviderKind::Http => {
            tracing::info!(model = %settings.model, url = %settings.base_url, "using remote embedder");
            Ok(Arc::new(OpenAiEmbedder::from_settings(settings)?))
        }
    }
}
