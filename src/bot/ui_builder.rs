//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import dialogue types
use crate::dialogue::{CareerProfile, ALLOWED_JOB_TITLES, SUGGESTED_LEVELS};

// Import the ideas formatter
use crate::project_ideas::format_project_ideas;

pub const JOB_TITLE_CALLBACK_PREFIX: &str = "title_";
pub const LEVEL_CALLBACK_PREFIX: &str = "level_";

// Buttons per keyboard row
const BUTTONS_PER_ROW: usize = 2;

/// A choice picked from one of the inline keyboards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardChoice {
    JobTitle(&'static str),
    Level(&'static str),
}

impl KeyboardChoice {
    pub fn text(self) -> &'static str {
        match self {
            KeyboardChoice::JobTitle(text) | KeyboardChoice::Level(text) => text,
        }
    }
}

fn options_keyboard(options: &[&str], prefix: &str) -> InlineKeyboardMarkup {
    let buttons: Vec<Vec<InlineKeyboardButton>> = options
        .chunks(BUTTONS_PER_ROW)
        .enumerate()
        .map(|(row, chunk)| {
            chunk
                .iter()
                .enumerate()
                .map(|(col, option)| {
                    let index = row * BUTTONS_PER_ROW + col;
                    InlineKeyboardButton::callback(option.to_string(), format!("{prefix}{index}"))
                })
                .collect()
        })
        .collect();

    InlineKeyboardMarkup::new(buttons)
}

/// Create inline keyboard listing the allowed job titles
pub fn create_job_title_keyboard() -> InlineKeyboardMarkup {
    options_keyboard(ALLOWED_JOB_TITLES, JOB_TITLE_CALLBACK_PREFIX)
}

/// Create inline keyboard with the suggested levels
pub fn create_level_keyboard() -> InlineKeyboardMarkup {
    options_keyboard(SUGGESTED_LEVELS, LEVEL_CALLBACK_PREFIX)
}

/// Decode callback data produced by the keyboards above
pub fn parse_keyboard_choice(data: &str) -> Option<KeyboardChoice> {
    if let Some(index) = data.strip_prefix(JOB_TITLE_CALLBACK_PREFIX) {
        let index: usize = index.parse().ok()?;
        return ALLOWED_JOB_TITLES.get(index).copied().map(KeyboardChoice::JobTitle);
    }
    if let Some(index) = data.strip_prefix(LEVEL_CALLBACK_PREFIX) {
        let index: usize = index.parse().ok()?;
        return SUGGESTED_LEVELS.get(index).copied().map(KeyboardChoice::Level);
    }
    None
}

/// Format the final reply carrying the generated project ideas
pub fn format_ideas_message(
    profile: &CareerProfile,
    ideas: &[String],
    language_code: Option<&str>,
) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        t_args_lang(
            "ideas-title",
            &[
                ("job_title", profile.job_title.as_str()),
                ("level", profile.level.as_str()),
                ("industry", profile.industry.as_str()),
            ],
            language_code,
        ),
        format_project_ideas(ideas),
        t_lang("ideas-footer", language_code)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_title_keyboard_covers_allow_list() {
        let keyboard = create_job_title_keyboard();
        let buttons: usize = keyboard.inline_keyboard.iter().map(Vec::len).sum();
        assert_eq!(buttons, ALLOWED_JOB_TITLES.len());
        assert!(keyboard.inline_keyboard.iter().all(|row| row.len() <= BUTTONS_PER_ROW));
    }

    #[test]
    fn test_parse_keyboard_choice() {
        assert_eq!(
            parse_keyboard_choice("title_0"),
            Some(KeyboardChoice::JobTitle(ALLOWED_JOB_TITLES[0]))
        );
        assert_eq!(
            parse_keyboard_choice("level_3"),
            Some(KeyboardChoice::Level(SUGGESTED_LEVELS[3]))
        );
        assert_eq!(parse_keyboard_choice("title_99"), None);
        assert_eq!(parse_keyboard_choice("level_x"), None);
        assert_eq!(parse_keyboard_choice("confirm"), None);
    }

    #[test]
    fn test_format_ideas_message() {
        let profile = CareerProfile {
            job_title: "Data Engineer".to_string(),
            level: "Senior".to_string(),
            industry: "Finance".to_string(),
        };
        let ideas = vec!["Streaming pipeline".to_string(), "Data contracts".to_string()];
        let message = format_ideas_message(&profile, &ideas, Some("en"));

        assert!(message.contains("Data Engineer, Senior, Finance"));
        assert!(message.contains("1. Streaming pipeline\n2. Data contracts"));
    }
}
