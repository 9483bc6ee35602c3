//! Dialogue Manager module for handling dialogue state transitions

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use tracing::{debug, error, info, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import dialogue types
use crate::dialogue::{
    advance, AnswerError, CareerDialogue, CareerDialogueState, CareerProfile, DialogueStep,
    Rejection, ALLOWED_JOB_TITLES, MAX_ANSWER_LENGTH,
};

// Import language model access
use crate::llm::{generate_project_ideas, CompletionModel, LlmError};

// Import UI builder functions
use super::ui_builder::{create_job_title_keyboard, create_level_keyboard, format_ideas_message};

use super::SharedModel;

/// Send the question that belongs to `state`
pub async fn ask_for(
    bot: &Bot,
    chat_id: ChatId,
    state: &CareerDialogueState,
    language_code: Option<&str>,
) -> Result<()> {
    match state {
        CareerDialogueState::Start => {}
        CareerDialogueState::ReceiveJobTitle => {
            bot.send_message(chat_id, t_lang("ask-job-title", language_code))
                .reply_markup(create_job_title_keyboard())
                .await?;
        }
        CareerDialogueState::ReceiveLevel { job_title } => {
            bot.send_message(
                chat_id,
                t_args_lang("ask-level", &[("job_title", job_title.as_str())], language_code),
            )
            .reply_markup(create_level_keyboard())
            .await?;
        }
        CareerDialogueState::ReceiveIndustry { .. } => {
            bot.send_message(chat_id, t_lang("ask-industry", language_code))
                .await?;
        }
    }
    Ok(())
}

/// Apply one answer, typed or picked from a keyboard, to the dialogue
pub async fn handle_answer(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: CareerDialogue,
    state: CareerDialogueState,
    answer: &str,
    model: SharedModel,
    language_code: Option<&str>,
) -> Result<()> {
    match advance(&state, answer) {
        DialogueStep::Advance(next) => {
            debug!(user_id = %chat_id, state = ?next, "Dialogue advanced");
            ask_for(bot, chat_id, &next, language_code).await?;
            dialogue.update(next).await?;
        }
        DialogueStep::Complete(profile) => {
            info!(
                user_id = %chat_id,
                job_title = %profile.job_title,
                level = %profile.level,
                industry = %profile.industry,
                "Career profile complete"
            );
            // Exit first so messages sent while the model works start fresh
            dialogue.exit().await?;
            send_project_ideas(bot, chat_id, &profile, model.as_ref(), language_code).await?;
        }
        DialogueStep::Reject(rejection) => {
            debug!(user_id = %chat_id, ?rejection, "Answer rejected");
            send_rejection(bot, chat_id, rejection, language_code).await?;
        }
        DialogueStep::Idle => {
            bot.send_message(chat_id, t_lang("start-hint", language_code))
                .await?;
        }
    }
    Ok(())
}

async fn send_rejection(
    bot: &Bot,
    chat_id: ChatId,
    rejection: Rejection,
    language_code: Option<&str>,
) -> Result<()> {
    match rejection {
        Rejection::UnknownJobTitle => {
            let titles = ALLOWED_JOB_TITLES.join(", ");
            bot.send_message(
                chat_id,
                t_args_lang("job-title-invalid", &[("titles", titles.as_str())], language_code),
            )
            .reply_markup(create_job_title_keyboard())
            .await?;
        }
        Rejection::Answer(AnswerError::Empty) => {
            bot.send_message(chat_id, t_lang("answer-empty", language_code))
                .await?;
        }
        Rejection::Answer(AnswerError::TooLong) => {
            let max = MAX_ANSWER_LENGTH.to_string();
            bot.send_message(
                chat_id,
                t_args_lang("answer-too-long", &[("max", max.as_str())], language_code),
            )
            .await?;
        }
    }
    Ok(())
}

/// Generate project ideas for a finished profile and send them to the user
pub async fn send_project_ideas(
    bot: &Bot,
    chat_id: ChatId,
    profile: &CareerProfile,
    model: &dyn CompletionModel,
    language_code: Option<&str>,
) -> Result<()> {
    bot.send_message(
        chat_id,
        t_args_lang(
            "generating",
            &[
                ("job_title", profile.job_title.as_str()),
                ("level", profile.level.as_str()),
                ("industry", profile.industry.as_str()),
            ],
            language_code,
        ),
    )
    .await?;

    if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
        warn!(user_id = %chat_id, error = %e, "Failed to send typing action");
    }

    match generate_project_ideas(model, profile).await {
        Ok(ideas) => {
            bot.send_message(chat_id, format_ideas_message(profile, &ideas, language_code))
                .await?;
            info!(user_id = %chat_id, ideas_count = ideas.len(), "Project ideas sent");
        }
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Project idea generation failed");
            let key = match e {
                LlmError::CircuitOpen => "error-busy",
                _ => "error-generation",
            };
            bot.send_message(chat_id, t_lang(key, language_code))
                .await?;
        }
    }
    Ok(())
}
