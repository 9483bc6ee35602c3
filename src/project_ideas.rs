//! # Project Ideas Parser
//!
//! Turns free-text language model output into a list of project ideas.
//!
//! The model is asked for a JSON object of the form
//! `{"project_ideas": ["...", "...", "...", "...", "..."]}`. Replies are
//! rarely that clean, so parsing is layered:
//!
//! 1. Newlines are removed and the outermost `{ ... }` span is parsed as
//!    JSON. Exactly five entries are returned as-is.
//! 2. Any other entry count means the model packed its list into the first
//!    entry, so that entry is split on commas.
//! 3. Output with no usable JSON object is read as a numbered list
//!    (`1. Idea,` / `2) Idea.`).

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

/// Number of ideas the prompt asks for
pub const EXPECTED_IDEAS: usize = 5;

// Longest snippet of raw output carried in an error
const ERROR_SNIPPET_CHARS: usize = 120;

lazy_static! {
    static ref NUMBERED_ITEM: Regex =
        Regex::new(r"^\s*\d{1,2}\s*[.)]\s*(.+)$").expect("Numbered item pattern should be valid");
}

/// Structured object the model is instructed to produce
#[derive(Debug, Deserialize)]
struct ProjectIdeas {
    project_ideas: Vec<String>,
}

/// Errors produced when model output holds no usable ideas
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("model output contained no project ideas")]
    Empty,
    #[error("unrecognized model output: {0}")]
    Unrecognized(String),
}

/// Parse language model output into a list of project ideas
///
/// ```rust
/// use data_alchemist::project_ideas::parse_project_ideas;
///
/// let ideas = parse_project_ideas(r#"{"project_ideas": ["A, B, C"]}"#).unwrap();
/// assert_eq!(ideas, vec!["A", "B", "C"]);
/// ```
pub fn parse_project_ideas(llm_output: &str) -> Result<Vec<String>, ParseError> {
    let flattened = llm_output.replace('\n', "");

    match parse_structured(&flattened) {
        Some(parsed) => {
            debug!(entries = parsed.project_ideas.len(), "Parsed structured model output");
            ideas_from_structured(parsed.project_ideas)
        }
        None => {
            warn!("Model output has no JSON object, falling back to numbered list");
            parse_numbered_list(llm_output)
        }
    }
}

fn parse_structured(text: &str) -> Option<ProjectIdeas> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn ideas_from_structured(entries: Vec<String>) -> Result<Vec<String>, ParseError> {
    let entries: Vec<String> = entries
        .into_iter()
        .map(|idea| idea.trim().to_string())
        .filter(|idea| !idea.is_empty())
        .collect();

    if entries.len() == EXPECTED_IDEAS {
        return Ok(entries);
    }

    let first = entries.into_iter().next().ok_or(ParseError::Empty)?;
    let ideas = split_comma_list(&first);
    if ideas.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(ideas)
}

/// Split a comma-separated list, trimming pieces and dropping blanks
pub fn split_comma_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|idea| !idea.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_numbered_list(text: &str) -> Result<Vec<String>, ParseError> {
    let ideas: Vec<String> = text
        .lines()
        .filter_map(|line| NUMBERED_ITEM.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .trim()
                .trim_end_matches([',', '.'])
                .trim()
                .to_string()
        })
        .filter(|idea| !idea.is_empty())
        .collect();

    if ideas.is_empty() {
        let snippet: String = text.trim().chars().take(ERROR_SNIPPET_CHARS).collect();
        if snippet.is_empty() {
            return Err(ParseError::Empty);
        }
        return Err(ParseError::Unrecognized(snippet));
    }
    Ok(ideas)
}

/// Format ideas as a numbered list for a chat message
pub fn format_project_ideas(ideas: &[String]) -> String {
    ideas
        .iter()
        .enumerate()
        .map(|(i, idea)| format!("{}. {}", i + 1, idea))
        .collect::<Vec<_>>()
        .join("\n")
}
