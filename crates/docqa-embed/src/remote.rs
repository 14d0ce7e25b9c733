//! OpenAI-compatible `/embeddings` client.
//!
//! Query vs document mode is expressed through optional text prefixes, for
//! models trained with instructions such as `search_query: ` /
//! `search_document: `.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use docqa_core::config::EmbeddingSettings;
use docqa_core::traits::Embedder;
use docqa_core::{EmbedMode, Error, ProviderError, Result};

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    query_prefix: String,
    document_prefix: String,
    id: String,
}

impl OpenAiEmbedder {
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("embedding HTTP client: {e}")))?;
        let api_key = settings.resolve_api_key();
        if api_key.is_none() {
            tracing::warn!(env = %settings.api_key_env, "no embedding API key configured; sending unauthenticated requests");
        }
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            api_key,
            query_prefix: settings.query_prefix.clone(),
            document_prefix: settings.document_prefix.clone(),
            id: format!("http:{}", settings.model),
        })
    }

    fn prefixed(&self, texts: &[String], mode: EmbedMode) -> Vec<String> {
        let prefix = match mode {
            EmbedMode::Query => &self.query_prefix,
            EmbedMode::Document => &self.document_prefix,
        };
        texts.iter().map(|t| format!("{prefix}{t}")).collect()
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    async fn embed(&self, texts: &[String], mode: EmbedMode) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = json!({ "model": self.model, "input": self.prefixed(texts, mode) });
        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::Hard(format!("embedding request failed: {e}")))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ProviderError::Hard(format!("embedding response unreadable: {e}")))?;
        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), &text));
        }
        let vectors = parse_embeddings(&text, texts.len())?;
        tracing::debug!(count = vectors.len(), model = %self.model, "embedded batch");
        Ok(vectors)
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Decode an `/embeddings` response, restoring input order from `index`.
pub fn parse_embeddings(body: &str, expected: usize) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
    let mut resp: EmbeddingResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(format!("embedding payload: {e}")))?;
    if resp.data.len() != expected {
        return Err(ProviderError::Malformed(format!(
            "expected {expected} embeddings, got {}",
            resp.data.len()
        )));
    }
    resp.data.sort_by_key(|d| d.index);
    let dim = resp.data.first().map_or(0, |d| d.embedding.len());
    if dim == 0 {
        return Err(ProviderError::Malformed("provider returned empty vectors".into()));
    }
    if let Some(bad) = resp.data.iter().find(|d| d.embedding.len() != dim) {
        return Err(ProviderError::Malformed(format!(
            "embedding {} has dimension {}, expected {dim}",
            bad.index,
            bad.embedding.len()
        )));
    }
    Ok(resp.data.into_iter().map(|d| d.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_input_order() {
        let body = r#"{"object":"list","data":[
            {"object":"embedding","index":1,"embedding":[0.0,1.0]},
            {"object":"embedding","index":0,"embedding":[1.0,0.0]}
        ],"model":"m"}"#;
        let vectors = parse_embeddings(body, 2).expect("parse");
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn rejects_count_and_dimension_mismatches() {
        let short = r#"{"data":[{"index":0,"embedding":[1.0]}]}"#;
        assert!(matches!(parse_embeddings(short, 2), Err(ProviderError::Malformed(_))));
        let ragged = r#"{"data":[{"index":0,"embedding":[1.0,2.0]},{"index":1,"embedding":[1.0]}]}"#;
        assert!(matches!(parse_embeddings(ragged, 2), Err(ProviderError::Malformed(_))));
        assert!(matches!(parse_embeddings("not json", 1), Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn mode_selects_prefix() {
        let settings = EmbeddingSettings {
            query_prefix: "search_query: ".into(),
            document_prefix: "search_document: ".into(),
            api_key: Some("k".into()),
            ..EmbeddingSettings::default()
        };
        let embedder = OpenAiEmbedder::from_settings(&settings).expect("client");
        let texts = vec!["sky".to_string()];
        assert_eq!(embedder.prefixed(&texts, EmbedMode::Query), vec!["search_query: sky"]);
        assert_eq!(embedder.prefixed(&texts, EmbedMode::Document), vec!["search_document: sky"]);
        assert_eq!(embedder.embedder_id(), "http:text-embedding-3-small");
    }
}
