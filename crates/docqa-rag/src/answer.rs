use std::fmt;
use std::sync::Arc;

use docqa_core::traits::GenerationBackend;
use docqa_core::{CancelToken, ProviderError};

use crate::index::IndexedDocument;
use crate::prompt::build_prompt;
use crate::retriever::Retriever;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

/// Reply shown when the document has nothing relevant to say.
pub const NO_CONTEXT_REPLY: &str = "I cannot answer this question based on the provided document.";

/// Terminal result of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Retrieval found nothing; the backend was not called.
    NoContext,
    Answered(String),
    /// Every attempt hit a rate limit or quota; carries the last diagnostic.
    RateLimited(String),
    GenerationFailed(String),
}

impl AnswerOutcome {
    /// True when the service, not the document, is to blame.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::GenerationFailed(_))
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Answered(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContext => f.write_str(NO_CONTEXT_REPLY),
            Self::Answered(text) => f.write_str(text),
            Self::RateLimited(diag) => {
                write!(f, "The answer service is rate limited, please try again in a moment ({diag}).")
            }
            Self::GenerationFailed(diag) => write!(f, "The answer service is unavailable: {diag}"),
        }
    }
}

/// Retrieves context, prompts the backend and classifies what came back.
pub struct AnswerSynthesizer {
    backend: Arc<dyn GenerationBackend>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    top_k: usize,
}

impl AnswerSynthesizer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend, sleeper: Arc::new(TokioSleeper), policy: RetryPolicy::default(), top_k: 3 }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn answer(
        &self,
        query: &str,
        doc: &IndexedDocument,
        retriever: &Retriever,
        cancel: &CancelToken,
    ) -> AnswerOutcome {
        let context = retriever.retrieve(query, doc, self.top_k, cancel).await;
        if cancel.is_cancelled() {
            return AnswerOutcome::GenerationFailed(ProviderError::Cancelled.to_string());
        }
        if context.is_empty() {
            tracing::info!("no context retrieved; skipping generation");
            return AnswerOutcome::NoContext;
        }
        let prompt = build_prompt(query, &context);
        self.generate(&prompt, cancel).await
    }

    /// Bounded retry loop around the backend.
    ///
    /// Only transient failures are retried, and never after the last attempt.
    /// Both the call and the backoff race `cancel`.
    pub async fn generate(&self, prompt: &str, cancel: &CancelToken) -> AnswerOutcome {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_diagnostic = String::new();

        for attempt in 0..attempts {
            tracing::debug!(attempt = attempt + 1, of = attempts, backend = self.backend.name(), "generating");
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ProviderError::Cancelled),
                res = self.backend.complete(prompt) => res,
            };
            match result {
                Ok(text) if text.trim().is_empty() => {
                    return AnswerOutcome::GenerationFailed("empty response from generation backend".into());
                }
                Ok(text) => return AnswerOutcome::Answered(text.trim().to_string()),
                Err(e) if e.is_transient() => {
                    last_diagnostic = e.to_string();
                    if attempt + 1 == attempts {
                        break;
                    }
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, error = %e, "transient generation failure, backing off");
                    let cancelled = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => true,
                        _ = self.sleeper.sleep(delay) => false,
                    };
                    if cancelled {
                        return AnswerOutcome::GenerationFailed(ProviderError::Cancelled.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "generation failed");
                    return AnswerOutcome::GenerationFailed(e.to_string());
                }
            }
        }

        tracing::warn!(attempts, "generation retries exhausted");
        AnswerOutcome::RateLimited(last_diagnostic)
    }
}
