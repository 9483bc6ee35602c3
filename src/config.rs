//! # Configuration Module
//!
//! This module defines configuration structures for the bot, the webhook
//! endpoint and the language model client, including recovery settings
//! for outbound completion calls.
//!
//! Values are read from the process environment (a `.env` file is loaded
//! by `main` before [`BotConfig::from_env`] runs).

use std::env;
use std::net::SocketAddr;

use url::Url;

// Constants for configuration defaults
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const MAX_SECRET_TOKEN_LEN: usize = 256; // Telegram's limit for setWebhook secret_token

/// Errors raised while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Recovery configuration for language model calls
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single completion request in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000,  // 1 second
            max_retry_delay_ms: 10000,  // 10 seconds
            operation_timeout_secs: 60, // completions can be slow
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// OpenAI-compatible completion API settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub recovery: RecoveryConfig,
}

impl LlmConfig {
    /// Build a config with default model settings for the given key and endpoint
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            recovery: RecoveryConfig::default(),
        }
    }
}

/// Webhook endpoint settings
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// Shared secret Telegram sends in `X-Telegram-Bot-Api-Secret-Token`
    pub secret_token: String,
    /// Public URL registered with Telegram on start-up, if any
    pub public_url: Option<Url>,
}

/// Top-level configuration for the service
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub webhook: WebhookConfig,
    pub llm: LlmConfig,
}

impl BotConfig {
    /// Read the whole configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let telegram_token = required("TELEGRAM_BOT_TOKEN")?;

        let secret_token = required("WEBHOOK_SECRET_TOKEN")?;
        validate_secret_token(&secret_token)?;

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let public_url = optional("WEBHOOK_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    name: "WEBHOOK_URL",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let mut llm = LlmConfig::new(
            required("OPENAI_API_KEY")?,
            optional("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        );
        if let Some(model) = optional("OPENAI_MODEL") {
            llm.model = model;
        }
        if let Some(temperature) = parse_optional::<f32>("OPENAI_TEMPERATURE")? {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Invalid {
                    name: "OPENAI_TEMPERATURE",
                    reason: format!("{temperature} is outside 0.0..=2.0"),
                });
            }
            llm.temperature = temperature;
        }
        if let Some(max_retries) = parse_optional::<u32>("LLM_MAX_RETRIES")? {
            llm.recovery.max_retries = max_retries;
        }
        if let Some(timeout) = parse_optional::<u64>("LLM_TIMEOUT_SECS")? {
            if timeout == 0 {
                return Err(ConfigError::Invalid {
                    name: "LLM_TIMEOUT_SECS",
                    reason: "must be greater than zero".to_string(),
                });
            }
            llm.recovery.operation_timeout_secs = timeout;
        }

        Ok(Self {
            telegram_token,
            webhook: WebhookConfig {
                bind_addr,
                secret_token,
                public_url,
            },
            llm,
        })
    }
}

/// Telegram accepts 1-256 characters from `A-Z`, `a-z`, `0-9`, `_` and `-`
pub fn validate_secret_token(token: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: "WEBHOOK_SECRET_TOKEN",
        reason: reason.to_string(),
    };

    if token.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if token.len() > MAX_SECRET_TOKEN_LEN {
        return Err(invalid("must be at most 256 characters"));
    }
    if !token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid("only A-Z, a-z, 0-9, '_' and '-' are allowed"));
    }
    Ok(())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

// Unset and blank variables are treated the same
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_optional<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_token_validation() {
        assert!(validate_secret_token("abc_DEF-123").is_ok());
        assert!(validate_secret_token(&"a".repeat(256)).is_ok());

        assert!(validate_secret_token("").is_err());
        assert!(validate_secret_token(&"a".repeat(257)).is_err());
        assert!(validate_secret_token("has space").is_err());
        assert!(validate_secret_token("semi;colon").is_err());
    }

    #[test]
    fn test_recovery_defaults_are_reasonable() {
        let config = RecoveryConfig::default();
        assert!(config.max_retries <= 10);
        assert!(config.base_retry_delay_ms <= config.max_retry_delay_ms);
        assert!(config.operation_timeout_secs > 0);
        assert!(config.circuit_breaker_threshold > 0);
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::new("key", "http://localhost");
        assert_eq!(config.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.base_url, "http://localhost");
    }
}
