//! Text generation over OpenAI-compatible `/chat/completions` endpoints.
//!
//! Groq is the default host. Failures are classified from the HTTP status and
//! the structured error body so the synthesizer can tell rate limits apart
//! from hard failures.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docqa_core::config::GenerationSettings;
use docqa_core::traits::GenerationBackend;
use docqa_core::{Error, ProviderError, Result};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatCompletionsBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl ChatCompletionsBackend {
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("generation HTTP client: {e}")))?;
        let api_key = settings.resolve_api_key();
        if api_key.is_none() {
            tracing::warn!(env = %settings.api_key_env, "no generation API key configured");
        }
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        let mut req = self.client.post(&self.endpoint).json(&self.request_body(prompt));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::Hard(format!("generation request failed: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Hard(format!("generation response unreadable: {e}")))?;
        if !status.is_success() {
            let err = ProviderError::from_status(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), transient = err.is_transient(), "generation call rejected");
            return Err(err);
        }
        parse_completion(&body)
    }
}

/// Text of the first choice. A missing `content` decodes as empty text; the
/// synthesizer decides what an empty answer means.
pub fn parse_completion(body: &str) -> std::result::Result<String, ProviderError> {
    let resp: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(format!("completion payload: {e}")))?;
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("completion has no choices".into()))?;
    Ok(choice.message.content.unwrap_or_default())
}
