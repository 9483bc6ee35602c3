//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{debug, info};

// Import localization
use crate::localization::t_lang;

// Import dialogue types
use crate::dialogue::{CareerDialogue, CareerDialogueState};

// Import dialogue manager functions
use super::dialogue_manager::{ask_for, handle_answer};

use super::SharedModel;

fn language_code(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_deref())
}

/// `/start`: greet the user and ask for the job title, from any state
pub async fn start(bot: Bot, dialogue: CareerDialogue, msg: Message) -> Result<()> {
    let language_code = language_code(&msg);
    info!(user_id = %msg.chat.id, "Starting career profile dialogue");

    bot.send_message(msg.chat.id, t_lang("welcome", language_code))
        .await?;

    let next = CareerDialogueState::ReceiveJobTitle;
    ask_for(&bot, msg.chat.id, &next, language_code).await?;
    dialogue.update(next).await?;
    Ok(())
}

/// `/cancel`: end the conversation, from any state
pub async fn cancel(bot: Bot, dialogue: CareerDialogue, msg: Message) -> Result<()> {
    info!(user_id = %msg.chat.id, "Dialogue cancelled by user");
    bot.send_message(msg.chat.id, t_lang("cancelled", language_code(&msg)))
        .await?;
    dialogue.exit().await?;
    Ok(())
}

/// `/help`: list commands without touching the dialogue
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, t_lang("help-commands", language_code(&msg)))
        .await?;
    Ok(())
}

/// Any message while no conversation is running
pub async fn start_hint(bot: Bot, msg: Message) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Message outside of a dialogue");
    bot.send_message(msg.chat.id, t_lang("start-hint", language_code(&msg)))
        .await?;
    Ok(())
}

/// Answer to the pending question in an active dialogue
pub async fn message_handler(
    bot: Bot,
    dialogue: CareerDialogue,
    state: CareerDialogueState,
    msg: Message,
    model: SharedModel,
) -> Result<()> {
    let language_code = language_code(&msg);

    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, t_lang("text-only", language_code))
            .await?;
        return Ok(());
    };

    debug!(user_id = %msg.chat.id, state = ?state, "Received dialogue answer");
    handle_answer(&bot, msg.chat.id, dialogue, state, text, model, language_code).await
}
