//! Career profile dialogue module for handling conversation state with users.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Job titles the bot generates projects for
pub const ALLOWED_JOB_TITLES: &[&str] = &[
    "Data Analyst",
    "Data Scientist",
    "Data Engineer",
    "Machine Learning Engineer",
    "Business Intelligence Analyst",
    "Analytics Engineer",
    "Data Architect",
    "AI Engineer",
];

/// Levels offered on the keyboard; any other text is accepted too
pub const SUGGESTED_LEVELS: &[&str] = &["Intern", "Junior", "Mid-level", "Senior", "Lead", "Principal"];

/// Longest accepted level or industry answer, in characters
pub const MAX_ANSWER_LENGTH: usize = 100;

/// Represents the conversation state for the career profile dialogue
///
/// Exiting the dialogue removes the stored state, which is the end of the
/// conversation; the next `/start` begins again from [`CareerDialogueState::Start`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CareerDialogueState {
    #[default]
    Start,
    ReceiveJobTitle,
    ReceiveLevel {
        job_title: String,
    },
    ReceiveIndustry {
        job_title: String,
        level: String,
    },
}

/// Type alias for our career dialogue
pub type CareerDialogue = Dialogue<CareerDialogueState, InMemStorage<CareerDialogueState>>;

/// Everything collected by the dialogue, ready for prompting
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CareerProfile {
    pub job_title: String,
    pub level: String,
    pub industry: String,
}

/// Why a free-text answer was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerError {
    Empty,
    TooLong,
}

/// Validates a job title against the allow-list, ignoring case and surrounding whitespace
///
/// Returns the canonical spelling from [`ALLOWED_JOB_TITLES`].
pub fn validate_job_title(input: &str) -> Option<&'static str> {
    let trimmed = input.trim();
    ALLOWED_JOB_TITLES
        .iter()
        .copied()
        .find(|title| title.eq_ignore_ascii_case(trimmed))
}

/// Validates a level or industry answer
pub fn validate_answer(input: &str) -> Result<String, AnswerError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(AnswerError::Empty);
    }

    if trimmed.chars().count() > MAX_ANSWER_LENGTH {
        return Err(AnswerError::TooLong);
    }

    Ok(trimmed.to_string())
}

/// Outcome of feeding one answer to the dialogue
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueStep {
    /// Answer accepted, continue in the given state
    Advance(CareerDialogueState),
    /// Last answer accepted; the dialogue ends with this profile
    Complete(CareerProfile),
    /// Answer rejected, the state is unchanged
    Reject(Rejection),
    /// No question is pending
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnknownJobTitle,
    Answer(AnswerError),
}

/// Compute the next step for an answer given in `state`
pub fn advance(state: &CareerDialogueState, answer: &str) -> DialogueStep {
    match state {
        CareerDialogueState::Start => DialogueStep::Idle,
        CareerDialogueState::ReceiveJobTitle => match validate_job_title(answer) {
            Some(job_title) => DialogueStep::Advance(CareerDialogueState::ReceiveLevel {
                job_title: job_title.to_string(),
            }),
            None => DialogueStep::Reject(Rejection::UnknownJobTitle),
        },
        CareerDialogueState::ReceiveLevel { job_title } => match validate_answer(answer) {
            Ok(level) => DialogueStep::Advance(CareerDialogueState::ReceiveIndustry {
                job_title: job_title.clone(),
                level,
            }),
            Err(e) => DialogueStep::Reject(Rejection::Answer(e)),
        },
        CareerDialogueState::ReceiveIndustry { job_title, level } => match validate_answer(answer) {
            Ok(industry) => DialogueStep::Complete(CareerProfile {
                job_title: job_title.clone(),
                level: level.clone(),
                industry,
            }),
            Err(e) => DialogueStep::Reject(Rejection::Answer(e)),
        },
    }
}
