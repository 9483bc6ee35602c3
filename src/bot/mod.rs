//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles commands and text answers
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and formats messages
//! - `dialogue_manager`: Manages dialogue state transitions and idea generation

pub mod callback_handler;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

use std::sync::Arc;

use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::dialogue::CareerDialogueState;
use crate::llm::CompletionModel;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

/// Completion backend shared by every handler
pub type SharedModel = Arc<dyn CompletionModel>;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "begin a new career profile")]
    Start,
    #[command(description = "stop the current conversation")]
    Cancel,
    #[command(description = "show this message")]
    Help,
}

/// Build the update handler tree
///
/// Commands are matched before dialogue states, so `/start` and `/cancel`
/// work from any position in the conversation.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(message_handler::start))
        .branch(case![Command::Cancel].endpoint(message_handler::cancel))
        .branch(case![Command::Help].endpoint(message_handler::help));

    let message_branch = Update::filter_message()
        .branch(command_handler)
        .branch(case![CareerDialogueState::Start].endpoint(message_handler::start_hint))
        .branch(dptree::endpoint(message_handler));

    let callback_query_handler = Update::filter_callback_query().endpoint(callback_handler);

    dialogue::enter::<Update, InMemStorage<CareerDialogueState>, CareerDialogueState, _>()
        .branch(message_branch)
        .branch(callback_query_handler)
}
