//! Language model access
//!
//! - `prompt`: builds the project idea prompt from a career profile
//! - `openai`: OpenAI-compatible chat completions client with retries

pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::dialogue::CareerProfile;
use crate::project_ideas::{parse_project_ideas, ParseError};

pub use openai::OpenAiClient;
pub use prompt::build_project_prompt;

/// Errors from completion requests and their post-processing
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion API returned no text")]
    EmptyResponse,
    #[error("circuit breaker is open, completion requests are paused")]
    CircuitOpen,
    #[error("could not parse project ideas: {0}")]
    Parse(#[from] ParseError),
}

impl LlmError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            LlmError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A text completion backend
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Ask the model for project ideas matching a career profile
pub async fn generate_project_ideas(
    model: &dyn CompletionModel,
    profile: &CareerProfile,
) -> Result<Vec<String>, LlmError> {
    let prompt = build_project_prompt(profile);
    debug!(prompt_chars = prompt.len(), "Requesting project ideas");

    let output = model.complete(&prompt).await?;
    let ideas = parse_project_ideas(&output)?;

    info!(
        job_title = %profile.job_title,
        ideas_count = ideas.len(),
        "Generated project ideas"
    );
    Ok(ideas)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedModel(&'static str);

    #[async_trait]
    impl CompletionModel for CannedModel {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    fn profile() -> CareerProfile {
        CareerProfile {
            job_title: "Data Analyst".to_string(),
            level: "Junior".to_string(),
            industry: "Retail".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_parses_model_output() {
        let model = CannedModel(r#"{"project_ideas": ["Sales dashboard, Basket analysis"]}"#);
        let ideas = generate_project_ideas(&model, &profile()).await.unwrap();
        assert_eq!(ideas, vec!["Sales dashboard", "Basket analysis"]);
    }

    #[tokio::test]
    async fn test_generate_reports_parse_failure() {
        let model = CannedModel(r#"{"project_ideas": []}"#);
        let err = generate_project_ideas(&model, &profile()).await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(ParseError::Empty)));
    }

    #[test]
    fn test_transient_classification() {
        let throttled = LlmError::Status { status: 429, body: String::new() };
        let unavailable = LlmError::Status { status: 503, body: String::new() };
        let unauthorized = LlmError::Status { status: 401, body: String::new() };

        assert!(throttled.is_transient());
        assert!(unavailable.is_transient());
        assert!(!unauthorized.is_transient());
        assert!(!LlmError::EmptyResponse.is_transient());
        assert!(!LlmError::CircuitOpen.is_transient());
    }
}
