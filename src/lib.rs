//! # Data Alchemist Telegram Bot
//!
//! A Telegram bot that walks users through a short career profile (job
//! title, level, industry) and answers with project ideas for career growth,
//! generated by a language model. Updates arrive over a webhook.

pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod dialogue;
pub mod llm;
pub mod localization;
pub mod project_ideas;
pub mod webhook;
