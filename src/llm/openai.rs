//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{CompletionModel, LlmError};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::{LlmConfig, RecoveryConfig};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat completions client with timeout, retry and circuit breaker protection
pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
    circuit_breaker: CircuitBreaker,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.recovery.operation_timeout_secs))
            .build()?;
        let circuit_breaker = CircuitBreaker::new(config.recovery.clone());

        Ok(Self {
            http,
            config,
            circuit_breaker,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn request_once(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if self.circuit_breaker.is_open() {
            warn!("Completion skipped, circuit breaker is open");
            return Err(LlmError::CircuitOpen);
        }

        let recovery = &self.config.recovery;
        let mut attempt = 0;
        loop {
            match self.request_once(prompt).await {
                Ok(text) => {
                    debug!(attempt, chars = text.len(), "Completion succeeded");
                    self.circuit_breaker.record_success();
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < recovery.max_retries => {
                    let delay = backoff_delay(recovery, attempt) + jitter(recovery);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = recovery.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient completion failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(attempt, error = %e, "Completion request failed");
                    self.circuit_breaker.record_failure();
                    return Err(e);
                }
            }
        }
    }
}

/// Exponential backoff for the given zero-based retry attempt, capped at the maximum
pub fn backoff_delay(config: &RecoveryConfig, attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let delay_ms = config
        .base_retry_delay_ms
        .saturating_mul(factor)
        .min(config.max_retry_delay_ms);
    Duration::from_millis(delay_ms)
}

// Up to half the base delay, so simultaneous retries spread out
fn jitter(config: &RecoveryConfig) -> Duration {
    let max_jitter = config.base_retry_delay_ms / 2;
    if max_jitter == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter))
}
