//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::debug;

// Import dialogue types
use crate::dialogue::{CareerDialogue, CareerDialogueState};

// Import dialogue manager functions
use super::dialogue_manager::handle_answer;

// Import UI builder functions
use super::ui_builder::{parse_keyboard_choice, KeyboardChoice};

use super::SharedModel;

/// Whether a keyboard choice answers the question pending in `state`
///
/// Buttons on older messages stay clickable, so a title button pressed while
/// the level is pending must be ignored rather than taken as the level.
pub fn choice_matches_state(choice: KeyboardChoice, state: &CareerDialogueState) -> bool {
    matches!(
        (choice, state),
        (KeyboardChoice::JobTitle(_), CareerDialogueState::ReceiveJobTitle)
            | (KeyboardChoice::Level(_), CareerDialogueState::ReceiveLevel { .. })
    )
}

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: CareerDialogue,
    state: CareerDialogueState,
    model: SharedModel,
) -> Result<()> {
    debug!(user_id = %q.from.id, dialogue_state = ?state, "Received callback query from user");

    // Answer first to remove the loading state; generation can take a while
    bot.answer_callback_query(q.id.clone()).await?;

    let choice = q.data.as_deref().and_then(parse_keyboard_choice);
    let language_code = q.from.language_code.as_deref();

    match (choice, &q.message) {
        (Some(choice), Some(message)) if choice_matches_state(choice, &state) => {
            let chat_id = message.chat().id;
            handle_answer(&bot, chat_id, dialogue, state, choice.text(), model, language_code).await?;
        }
        _ => {
            debug!(user_id = %q.from.id, data = ?q.data, "Ignoring stale or unknown callback");
        }
    }

    Ok(())
}
