use anyhow::Result;
use std::env;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use data_alchemist::bot::{schema, SharedModel};
use data_alchemist::config::BotConfig;
use data_alchemist::dialogue::CareerDialogueState;
use data_alchemist::llm::OpenAiClient;
use data_alchemist::localization::init_localization;
use data_alchemist::webhook;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file before RUST_LOG is read
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Data Alchemist Telegram Bot");

    let config = BotConfig::from_env()?;
    init_localization()?;

    let model: SharedModel = Arc::new(OpenAiClient::new(config.llm.clone())?);
    info!(model = %config.llm.model, "Language model client ready");

    let bot = Bot::new(&config.telegram_token);

    let (listener, stop_flag, app) = webhook::webhook(&config.webhook.secret_token);

    let tcp_listener = webhook::bind_and_register(&bot, &config.webhook).await?;

    let server = tokio::spawn(async move {
        axum::serve(tcp_listener, app)
            .with_graceful_shutdown(stop_flag)
            .await
    });

    Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![InMemStorage::<CareerDialogueState>::new(), model])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    server.await??;

    if config.webhook.public_url.is_some() {
        if let Err(e) = bot.delete_webhook().await {
            warn!(error = %e, "Failed to remove webhook registration");
        }
    }

    info!("Bot stopped");
    Ok(())
}
